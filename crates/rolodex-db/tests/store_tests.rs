// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use rolodex_app::{
    ContactDraft, ContactError, ContactGateway, ContactId, NewContact, UniqueField,
};
use rolodex_db::{Store, validate_db_path};
use rolodex_testkit::{ContactFaker, temp_db_path};

fn bootstrapped() -> Result<Store> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    Ok(store)
}

#[test]
fn validate_db_path_rejects_uri_forms() {
    assert!(validate_db_path("file:test.db").is_err());
    assert!(validate_db_path("https://example.com/db.sqlite").is_err());
    assert!(validate_db_path("db.sqlite?mode=ro").is_err());
    assert!(validate_db_path("").is_err());
    assert!(validate_db_path(":memory:").is_ok());
    assert!(validate_db_path("/tmp/rolodex.db").is_ok());
}

#[test]
fn bootstrap_is_idempotent() -> Result<()> {
    let store = bootstrapped()?;
    store.bootstrap()?;
    assert!(store.list_contacts()?.is_empty());
    Ok(())
}

#[test]
fn bootstrap_rejects_schema_missing_required_column() -> Result<()> {
    let store = Store::open_memory()?;
    store.raw_connection().execute_batch(
        "
        CREATE TABLE contacts (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL,
          phone_number TEXT NOT NULL,
          created_date TEXT NOT NULL
        );
        ",
    )?;

    let err = store
        .bootstrap()
        .expect_err("schema validation should fail");
    let message = err.to_string();
    assert!(message.contains("table `contacts` is missing required columns"));
    assert!(message.contains("email"));
    assert!(message.contains("address"));
    Ok(())
}

#[test]
fn create_then_list_round_trips_fields() -> Result<()> {
    let mut store = bootstrapped()?;
    let mut faker = ContactFaker::new(1);
    let contacts = faker.contacts(3);
    for contact in &contacts {
        store.create(contact)?;
    }

    let listed = store.list()?;
    assert_eq!(listed.len(), 3);
    for (stored, input) in listed.iter().zip(&contacts) {
        assert_eq!(stored.name, input.name);
        assert_eq!(stored.phone_number, input.phone_number);
        assert_eq!(stored.email, input.email);
        assert_eq!(stored.address, input.address);
    }
    assert!(listed[0].created_date <= listed[2].created_date);
    Ok(())
}

#[test]
fn created_record_matches_stored_record() -> Result<()> {
    let mut store = bootstrapped()?;
    let created = store.create(&ContactFaker::new(2).contact())?;
    let fetched = store.get(&created.id)?;
    assert_eq!(fetched, created);
    Ok(())
}

#[test]
fn duplicate_phone_wins_over_duplicate_email() -> Result<()> {
    let mut store = bootstrapped()?;
    let original = ContactFaker::new(3).contact();
    store.create(&original)?;

    assert_eq!(
        store.create(&original),
        Err(ContactError::DuplicateField(UniqueField::PhoneNumber))
    );

    let email_only = NewContact {
        phone_number: "5550001111".to_owned(),
        ..original.clone()
    };
    assert_eq!(
        store.create(&email_only),
        Err(ContactError::DuplicateField(UniqueField::Email))
    );
    assert_eq!(store.list()?.len(), 1);
    Ok(())
}

#[test]
fn blank_required_field_is_rejected() -> Result<()> {
    let mut store = bootstrapped()?;
    let contact = NewContact {
        name: "  ".to_owned(),
        ..ContactFaker::new(4).contact()
    };
    assert_eq!(
        store.create(&contact),
        Err(ContactError::Rejected("name is required".to_owned()))
    );
    Ok(())
}

#[test]
fn update_applies_present_fields_only() -> Result<()> {
    let mut store = bootstrapped()?;
    let created = store.create(&ContactFaker::new(5).contact())?;

    let draft = ContactDraft {
        address: Some("42 Harbor Rd".to_owned()),
        ..ContactDraft::default()
    };
    let updated = store.update(&created.id, &draft)?;
    assert_eq!(updated.address, "42 Harbor Rd");
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.created_date, created.created_date);
    assert_eq!(store.get(&created.id)?, updated);
    Ok(())
}

#[test]
fn update_conflicts_with_other_rows_only() -> Result<()> {
    let mut store = bootstrapped()?;
    let mut faker = ContactFaker::new(6);
    let contacts = faker.contacts(2);
    let first = store.create(&contacts[0])?;
    store.create(&contacts[1])?;

    let own_phone = ContactDraft {
        phone_number: Some(first.phone_number.clone()),
        ..ContactDraft::default()
    };
    assert!(store.update(&first.id, &own_phone).is_ok());

    let taken = ContactDraft {
        phone_number: Some(contacts[1].phone_number.clone()),
        ..ContactDraft::default()
    };
    assert_eq!(
        store.update(&first.id, &taken),
        Err(ContactError::DuplicateField(UniqueField::PhoneNumber))
    );
    Ok(())
}

#[test]
fn missing_and_imported_ids_are_not_found() -> Result<()> {
    let mut store = bootstrapped()?;
    let draft = ContactDraft {
        name: Some("Nobody".to_owned()),
        ..ContactDraft::default()
    };
    assert_eq!(store.get(&ContactId::from(99)), Err(ContactError::NotFound));
    assert_eq!(
        store.update(&ContactId::imported(0), &draft),
        Err(ContactError::NotFound)
    );
    assert_eq!(store.remove(&ContactId::from(99)), Err(ContactError::NotFound));
    Ok(())
}

#[test]
fn remove_deletes_row() -> Result<()> {
    let mut store = bootstrapped()?;
    let created = store.create(&ContactFaker::new(7).contact())?;
    store.remove(&created.id)?;
    assert!(store.list()?.is_empty());
    assert_eq!(store.remove(&created.id), Err(ContactError::NotFound));
    Ok(())
}

#[test]
fn file_database_persists_across_opens() -> Result<()> {
    let (_dir, path) = temp_db_path()?;
    let contact = ContactFaker::new(8).contact();
    {
        let mut store = Store::open(&path)?;
        store.bootstrap()?;
        store.create(&contact)?;
    }

    let mut reopened = Store::open(&path)?;
    reopened.bootstrap()?;
    let listed = reopened.list()?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].email, contact.email);
    assert!(reopened.describe().contains("rolodex.db"));
    Ok(())
}
