// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use rolodex_app::validation::NAME_MESSAGE;
use rolodex_app::{
    ContactError, ContactField, ContactForm, ContactId, ContactTable, NewContact, RowState,
    TableCommand, TableEvent, UniqueField,
};
use rolodex_db::Store;
use rolodex_testkit::{CallKind, ContactFaker, GatewayCall, MemoryGateway, sample_import_csv};

fn loaded(count: usize) -> Result<(ContactTable, MemoryGateway)> {
    let mut faker = ContactFaker::new(17);
    let mut gateway = MemoryGateway::seeded(&faker.contacts(count))?;
    let mut table = ContactTable::default();
    table.reload(&mut gateway)?;
    gateway.clear_calls();
    Ok((table, gateway))
}

fn first_id(table: &ContactTable) -> ContactId {
    table.visible_ids()[0].clone()
}

fn start_edit(table: &mut ContactTable, id: &ContactId) -> Result<()> {
    table.dispatch(TableCommand::ToggleSelect(id.clone()))?;
    table.dispatch(TableCommand::BeginEdit(id.clone()))?;
    Ok(())
}

fn set(table: &mut ContactTable, id: &ContactId, field: ContactField, value: &str) -> Result<()> {
    table.dispatch(TableCommand::EditField {
        id: id.clone(),
        field,
        value: value.to_owned(),
    })?;
    Ok(())
}

#[test]
fn reload_installs_fetched_records() -> Result<()> {
    let (table, _gateway) = loaded(4)?;
    assert!(!table.source().is_imported());
    assert_eq!(table.rows().len(), 4);
    assert_eq!(table.status_line(), Some("4 contacts"));
    Ok(())
}

#[test]
fn successful_save_reloads_and_clears_session() -> Result<()> {
    let (mut table, mut gateway) = loaded(3)?;
    let id = first_id(&table);
    table.dispatch(TableCommand::Search("a".to_owned()))?;
    start_edit(&mut table, &id)?;
    set(&mut table, &id, ContactField::Address, "9 Bay St")?;

    let events = table.save_edit(&mut gateway, &id)?;
    assert_eq!(events[0], TableEvent::Saved(id.clone()));
    assert!(events.contains(&TableEvent::Reloaded(3)));
    assert_eq!(
        gateway.calls().iter().map(GatewayCall::kind).collect::<Vec<_>>(),
        vec![CallKind::Update, CallKind::List]
    );

    assert_eq!(table.session().selected_count(), 0);
    assert_eq!(table.session().search_term, "");
    let saved = table.source().find(&id).expect("saved row");
    assert_eq!(saved.address, "9 Bay St");
    Ok(())
}

#[test]
fn invalid_name_never_reaches_gateway() -> Result<()> {
    let (mut table, mut gateway) = loaded(2)?;
    let id = first_id(&table);
    start_edit(&mut table, &id)?;
    set(&mut table, &id, ContactField::Name, "INVALID123")?;

    let error = table
        .save_edit(&mut gateway, &id)
        .expect_err("validation should fail");
    assert_eq!(error.to_string(), NAME_MESSAGE);
    assert!(gateway.calls().is_empty());

    let state = table.session().row_state(&id).expect("row state");
    assert_eq!(state.label(), "editing");
    assert_eq!(
        state.draft().and_then(|draft| draft.name.as_deref()),
        Some("INVALID123")
    );
    assert_eq!(state.error().and_then(ContactError::field), Some(ContactField::Name));
    Ok(())
}

#[test]
fn failed_save_keeps_draft_and_skips_reload() -> Result<()> {
    let (mut table, mut gateway) = loaded(2)?;
    let id = first_id(&table);
    start_edit(&mut table, &id)?;
    set(&mut table, &id, ContactField::Email, "moved@example.com")?;
    gateway.fail_next(CallKind::Update, ContactError::Transport("timed out".to_owned()));

    let error = table
        .save_edit(&mut gateway, &id)
        .expect_err("update should fail");
    assert!(matches!(error, ContactError::Transport(_)));
    assert_eq!(gateway.count_calls(CallKind::List), 0);

    let state = table.session().row_state(&id).expect("row state");
    assert_eq!(
        state.draft().and_then(|draft| draft.email.as_deref()),
        Some("moved@example.com")
    );
    assert_eq!(state.error(), Some(&error));
    Ok(())
}

#[test]
fn duplicate_on_save_is_attached_to_row() -> Result<()> {
    let (mut table, mut gateway) = loaded(2)?;
    let ids = table.visible_ids();
    let other_phone = table
        .source()
        .find(&ids[1])
        .expect("second row")
        .phone_number
        .clone();
    start_edit(&mut table, &ids[0])?;
    set(&mut table, &ids[0], ContactField::PhoneNumber, &other_phone)?;

    let error = table
        .save_edit(&mut gateway, &ids[0])
        .expect_err("duplicate phone");
    assert_eq!(error, ContactError::DuplicateField(UniqueField::PhoneNumber));
    assert_eq!(error.to_string(), "Duplicate phone number");
    Ok(())
}

#[test]
fn second_save_while_in_flight_is_rejected() -> Result<()> {
    let (mut table, mut gateway) = loaded(1)?;
    let id = first_id(&table);
    start_edit(&mut table, &id)?;

    let draft = table.begin_save(&id)?;
    assert_eq!(
        table.begin_save(&id),
        Err(ContactError::RequestInFlight(id.clone()))
    );
    assert_eq!(
        table.dispatch(TableCommand::ToggleSelect(id.clone())),
        Err(ContactError::RequestInFlight(id.clone()))
    );

    let outcome = rolodex_app::ContactGateway::update(&mut gateway, &id, &draft);
    table.finish_save(&mut gateway, &id, outcome)?;
    assert_eq!(table.session().row_state(&id), None);
    Ok(())
}

#[test]
fn delete_requires_plain_selection() -> Result<()> {
    let (mut table, mut gateway) = loaded(3)?;
    let id = first_id(&table);
    assert!(matches!(
        table.delete_selected(&mut gateway, &id),
        Err(ContactError::InvalidTransition { action: "delete", .. })
    ));

    start_edit(&mut table, &id)?;
    assert!(table.delete_selected(&mut gateway, &id).is_err());
    assert!(gateway.calls().is_empty());

    table.dispatch(TableCommand::CancelEdit(id.clone()))?;
    let events = table.delete_selected(&mut gateway, &id)?;
    assert_eq!(events[0], TableEvent::Deleted(id.clone()));
    assert_eq!(table.rows().len(), 2);
    assert!(table.source().find(&id).is_none());
    Ok(())
}

#[test]
fn failed_delete_returns_row_to_selected() -> Result<()> {
    let (mut table, mut gateway) = loaded(2)?;
    let id = first_id(&table);
    table.dispatch(TableCommand::ToggleSelect(id.clone()))?;
    gateway.fail_next(CallKind::Remove, ContactError::Transport("reset".to_owned()));

    assert!(table.delete_selected(&mut gateway, &id).is_err());
    assert_eq!(table.session().row_state(&id), Some(&RowState::Selected));
    assert_eq!(table.rows().len(), 2);
    Ok(())
}

#[test]
fn select_all_with_two_of_five_selected_selects_all() -> Result<()> {
    let (mut table, _gateway) = loaded(5)?;
    let ids = table.visible_ids();
    table.dispatch(TableCommand::ToggleSelect(ids[1].clone()))?;
    table.dispatch(TableCommand::ToggleSelect(ids[3].clone()))?;
    assert!(!table.all_selected());

    table.dispatch(TableCommand::ToggleSelectAll)?;
    assert!(table.all_selected());
    assert_eq!(table.session().selected_count(), 5);

    table.dispatch(TableCommand::ToggleSelectAll)?;
    assert_eq!(table.session().selected_count(), 0);
    Ok(())
}

#[test]
fn form_submit_creates_and_reloads() -> Result<()> {
    let (mut table, mut gateway) = loaded(1)?;
    let mut form = ContactForm::default();
    form.set_field(ContactField::Name, "Grace Hopper");
    form.set_field(ContactField::PhoneNumber, "2025550199");
    form.set_field(ContactField::Email, "grace@navy.mil");

    let events = table.create(&mut gateway, &mut form)?;
    assert!(matches!(events[0], TableEvent::Created(_)));
    assert_eq!(table.rows().len(), 2);
    assert_eq!(form, ContactForm::default());
    Ok(())
}

#[test]
fn form_validation_failure_skips_gateway() -> Result<()> {
    let (mut table, mut gateway) = loaded(1)?;
    let mut form = ContactForm::new(NewContact {
        name: "Grace".to_owned(),
        phone_number: "555".to_owned(),
        email: "nope".to_owned(),
        address: String::new(),
    });

    let error = table
        .create(&mut gateway, &mut form)
        .expect_err("phone is invalid");
    assert_eq!(error.field(), Some(ContactField::PhoneNumber));
    assert!(form.field_error(ContactField::PhoneNumber).is_some());
    assert_eq!(form.field_error(ContactField::Email), None);
    assert!(gateway.calls().is_empty());
    Ok(())
}

#[test]
fn form_duplicate_sets_form_message_and_keeps_input() -> Result<()> {
    let (mut table, mut gateway) = loaded(1)?;
    let existing = gateway.records()[0].clone();
    let mut form = ContactForm::new(NewContact {
        name: "Someone Else".to_owned(),
        phone_number: existing.phone_number.clone(),
        email: existing.email.clone(),
        address: String::new(),
    });

    let error = table
        .create(&mut gateway, &mut form)
        .expect_err("duplicate phone");
    assert_eq!(error, ContactError::DuplicateField(UniqueField::PhoneNumber));
    assert_eq!(form.error_message(), Some("Duplicate phone number"));
    assert_eq!(form.value(ContactField::Name), "Someone Else");
    assert_eq!(gateway.count_calls(CallKind::List), 0);
    Ok(())
}

#[test]
fn editing_imported_row_surfaces_not_found() -> Result<()> {
    let (mut table, mut gateway) = loaded(2)?;
    table.import_csv(sample_import_csv())?;
    assert!(table.source().is_imported());
    assert_eq!(
        table.visible_ids(),
        vec![ContactId::imported(0), ContactId::imported(1)]
    );

    let id = ContactId::imported(0);
    start_edit(&mut table, &id)?;
    set(&mut table, &id, ContactField::Address, "Somewhere")?;
    assert_eq!(
        table.save_edit(&mut gateway, &id),
        Err(ContactError::NotFound)
    );
    let state = table.session().row_state(&id).expect("row state");
    assert_eq!(
        state.draft().and_then(|draft| draft.address.as_deref()),
        Some("Somewhere")
    );

    let other = ContactId::imported(1);
    table.dispatch(TableCommand::ToggleSelect(other.clone()))?;
    assert_eq!(
        table.delete_selected(&mut gateway, &other),
        Err(ContactError::NotFound)
    );
    assert_eq!(table.session().row_state(&other), Some(&RowState::Selected));
    assert!(gateway.calls().is_empty());

    table.reload(&mut gateway)?;
    assert!(!table.source().is_imported());
    assert_eq!(table.rows().len(), 2);
    Ok(())
}

#[test]
fn failed_reload_clears_session_and_keeps_rows() -> Result<()> {
    let (mut table, mut gateway) = loaded(3)?;
    let id = first_id(&table);
    table.dispatch(TableCommand::ToggleSelect(id))?;
    gateway.fail_next(CallKind::List, ContactError::Transport("refused".to_owned()));

    assert!(table.reload(&mut gateway).is_err());
    assert_eq!(table.session().selected_count(), 0);
    assert_eq!(table.rows().len(), 3);
    Ok(())
}

#[test]
fn save_stands_when_follow_up_reload_fails() -> Result<()> {
    let (mut table, mut gateway) = loaded(3)?;
    let id = first_id(&table);
    start_edit(&mut table, &id)?;
    set(&mut table, &id, ContactField::Address, "9 Bay St")?;
    let refused = ContactError::Transport("refused".to_owned());
    gateway.fail_next(CallKind::List, refused.clone());

    let events = table.save_edit(&mut gateway, &id)?;
    assert_eq!(
        events,
        vec![
            TableEvent::Saved(id.clone()),
            TableEvent::ReloadFailed(refused.clone()),
        ]
    );
    assert_eq!(table.status_line(), Some(refused.to_string().as_str()));
    let stored = gateway
        .records()
        .iter()
        .find(|record| record.id == id)
        .expect("stored row");
    assert_eq!(stored.address, "9 Bay St");

    table.reload(&mut gateway)?;
    let shown = table.source().find(&id).expect("reloaded row");
    assert_eq!(shown.address, "9 Bay St");
    Ok(())
}

#[test]
fn delete_stands_when_follow_up_reload_fails() -> Result<()> {
    let (mut table, mut gateway) = loaded(2)?;
    let id = first_id(&table);
    table.dispatch(TableCommand::ToggleSelect(id.clone()))?;
    gateway.fail_next(CallKind::List, ContactError::Transport("refused".to_owned()));

    let events = table.delete_selected(&mut gateway, &id)?;
    assert_eq!(events[0], TableEvent::Deleted(id.clone()));
    assert!(matches!(events[1], TableEvent::ReloadFailed(ContactError::Transport(_))));
    assert_eq!(gateway.records().len(), 1);
    assert_eq!(table.session().selected_count(), 0);
    Ok(())
}

#[test]
fn create_stands_when_follow_up_reload_fails() -> Result<()> {
    let (mut table, mut gateway) = loaded(1)?;
    let mut form = ContactForm::new(NewContact {
        name: "Grace Hopper".to_owned(),
        phone_number: "2025550199".to_owned(),
        email: "grace@navy.mil".to_owned(),
        address: String::new(),
    });
    gateway.fail_next(CallKind::List, ContactError::Transport("refused".to_owned()));

    let events = table.create(&mut gateway, &mut form)?;
    assert!(matches!(events[0], TableEvent::Created(_)));
    assert!(matches!(events[1], TableEvent::ReloadFailed(_)));
    assert_eq!(gateway.records().len(), 2);
    assert_eq!(form, ContactForm::default());
    Ok(())
}

#[test]
fn table_runs_against_sqlite_store() -> Result<()> {
    let mut store = Store::open_memory()?;
    store.bootstrap()?;
    let mut table = ContactTable::default();

    let mut form = ContactForm::new(ContactFaker::new(23).contact());
    table.create(&mut store, &mut form)?;
    let id = first_id(&table);

    start_edit(&mut table, &id)?;
    set(&mut table, &id, ContactField::Name, "Renamed Person")?;
    table.save_edit(&mut store, &id)?;
    assert_eq!(
        table.source().find(&id).map(|record| record.name.as_str()),
        Some("Renamed Person")
    );

    table.dispatch(TableCommand::ToggleSelect(id.clone()))?;
    table.delete_selected(&mut store, &id)?;
    assert!(table.rows().is_empty());
    Ok(())
}
