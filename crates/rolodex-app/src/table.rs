// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::csv;
use crate::forms::ContactForm;
use crate::session::{RowState, Session};
use crate::view::{RecordSource, visible_records};
use crate::{
    ContactDraft, ContactError, ContactField, ContactGateway, ContactId, ContactRecord, SortKey,
    SortOrder,
};

/// Local interactions. Remote operations are methods that take the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    Search(String),
    CycleSort(SortKey),
    ToggleSelect(ContactId),
    ToggleSelectAll,
    BeginEdit(ContactId),
    EditField {
        id: ContactId,
        field: ContactField,
        value: String,
    },
    CancelEdit(ContactId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    SearchChanged(String),
    SortChanged(SortOrder),
    SelectionChanged { id: ContactId, selected: bool },
    AllSelectionChanged(bool),
    EditStarted(ContactId),
    DraftUpdated { id: ContactId, field: ContactField },
    EditCancelled(ContactId),
    Saved(ContactId),
    Deleted(ContactId),
    Created(ContactId),
    Imported(usize),
    Reloaded(usize),
    /// A confirmed mutation whose follow-up reload failed. The rows shown
    /// are stale until the next successful reload.
    ReloadFailed(ContactError),
    StatusUpdated(String),
}

/// One displayed row. Editing rows show their draft values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRow<'a> {
    pub record: &'a ContactRecord,
    pub state: Option<&'a RowState>,
}

impl TableRow<'_> {
    pub fn value(&self, field: ContactField) -> &str {
        self.state
            .and_then(RowState::draft)
            .and_then(|draft| draft.get(field))
            .map_or_else(|| self.record.field(field), String::as_str)
    }

    pub fn is_selected(&self) -> bool {
        self.state.is_some()
    }
}

/// A contact table session: the working set plus display state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactTable {
    source: RecordSource,
    session: Session,
    status_line: Option<String>,
}

impl ContactTable {
    pub fn source(&self) -> &RecordSource {
        &self.source
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    pub fn rows(&self) -> Vec<TableRow<'_>> {
        visible_records(
            self.source.records(),
            &self.session.search_term,
            self.session.sort,
        )
        .into_iter()
        .map(|record| TableRow {
            record,
            state: self.session.row_state(&record.id),
        })
        .collect()
    }

    pub fn visible_ids(&self) -> Vec<ContactId> {
        self.rows().into_iter().map(|row| row.record.id.clone()).collect()
    }

    /// Header checkbox state.
    pub fn all_selected(&self) -> bool {
        self.session.all_selected(&self.visible_ids())
    }

    pub fn dispatch(&mut self, command: TableCommand) -> Result<Vec<TableEvent>, ContactError> {
        tracing::debug!(?command, "table command");
        match command {
            TableCommand::Search(term) => {
                self.session.search_term = term.clone();
                Ok(vec![TableEvent::SearchChanged(term)])
            }
            TableCommand::CycleSort(key) => {
                self.session.sort.cycle(key);
                Ok(vec![TableEvent::SortChanged(self.session.sort)])
            }
            TableCommand::ToggleSelect(id) => {
                self.require_record(&id)?;
                let selected = self.session.toggle_select(&id)?;
                Ok(vec![TableEvent::SelectionChanged { id, selected }])
            }
            TableCommand::ToggleSelectAll => {
                let visible = self.visible_ids();
                let selected = self.session.toggle_select_all(&visible);
                Ok(vec![TableEvent::AllSelectionChanged(selected)])
            }
            TableCommand::BeginEdit(id) => {
                let record = self.require_record(&id)?.clone();
                self.session.begin_edit(&record)?;
                Ok(vec![TableEvent::EditStarted(id)])
            }
            TableCommand::EditField { id, field, value } => {
                self.session.edit_field(&id, field, value)?;
                Ok(vec![TableEvent::DraftUpdated { id, field }])
            }
            TableCommand::CancelEdit(id) => {
                self.session.cancel_edit(&id)?;
                Ok(vec![TableEvent::EditCancelled(id)])
            }
        }
    }

    /// Fetches the collection and starts a fresh session over it. The
    /// session is reset even when the fetch fails; the old rows stay.
    pub fn reload<G>(&mut self, gateway: &mut G) -> Result<Vec<TableEvent>, ContactError>
    where
        G: ContactGateway + ?Sized,
    {
        self.session = Session::default();
        match gateway.list() {
            Ok(records) => {
                let count = records.len();
                tracing::info!(count, gateway = %gateway.describe(), "reloaded contacts");
                self.source = RecordSource::Fetched(records);
                Ok(vec![
                    TableEvent::Reloaded(count),
                    self.set_status(format!("{count} contacts")),
                ])
            }
            Err(error) => {
                tracing::warn!(%error, "reload failed");
                self.status_line = Some(error.to_string());
                Err(error)
            }
        }
    }

    pub fn save_edit<G>(
        &mut self,
        gateway: &mut G,
        id: &ContactId,
    ) -> Result<Vec<TableEvent>, ContactError>
    where
        G: ContactGateway + ?Sized,
    {
        let draft = self.begin_save(id)?;
        // synthetic ids name nothing remotely
        let outcome = if id.is_imported() {
            Err(ContactError::NotFound)
        } else {
            gateway.update(id, &draft)
        };
        self.finish_save(gateway, id, outcome)
    }

    /// First half of a save: validates the draft and marks the row in
    /// flight. Validation failures never reach the gateway.
    pub fn begin_save(&mut self, id: &ContactId) -> Result<ContactDraft, ContactError> {
        self.session.begin_save(id).inspect_err(|error| {
            tracing::debug!(%id, %error, "save not started");
        })
    }

    /// Second half of a save. Success reloads the collection; a failed
    /// reload is reported as an event and does not undo the save.
    pub fn finish_save<G>(
        &mut self,
        gateway: &mut G,
        id: &ContactId,
        outcome: Result<ContactRecord, ContactError>,
    ) -> Result<Vec<TableEvent>, ContactError>
    where
        G: ContactGateway + ?Sized,
    {
        if let Err(error) = &outcome {
            tracing::warn!(%id, %error, "save failed");
        }
        let record = self.session.finish_save(id, outcome)?;
        tracing::info!(id = %record.id, "saved contact");
        let mut events = vec![TableEvent::Saved(record.id)];
        events.extend(self.reload_after_mutation(gateway));
        Ok(events)
    }

    pub fn delete_selected<G>(
        &mut self,
        gateway: &mut G,
        id: &ContactId,
    ) -> Result<Vec<TableEvent>, ContactError>
    where
        G: ContactGateway + ?Sized,
    {
        self.session.begin_delete(id)?;
        let outcome = if id.is_imported() {
            Err(ContactError::NotFound)
        } else {
            gateway.remove(id)
        };
        if let Err(error) = &outcome {
            tracing::warn!(%id, %error, "delete failed");
        }
        self.session.finish_delete(id, outcome)?;
        tracing::info!(%id, "deleted contact");
        let mut events = vec![TableEvent::Deleted(id.clone())];
        events.extend(self.reload_after_mutation(gateway));
        Ok(events)
    }

    /// Submits the form and reloads on success.
    pub fn create<G>(
        &mut self,
        gateway: &mut G,
        form: &mut ContactForm,
    ) -> Result<Vec<TableEvent>, ContactError>
    where
        G: ContactGateway + ?Sized,
    {
        let record = form.submit(gateway)?;
        let mut events = vec![TableEvent::Created(record.id)];
        events.extend(self.reload_after_mutation(gateway));
        Ok(events)
    }

    /// Replaces the working set with the decoded rows. An empty file leaves
    /// the table as it was.
    pub fn import_csv(&mut self, text: &str) -> Result<Vec<TableEvent>, ContactError> {
        let records = csv::decode(text)?;
        let count = records.len();
        if !self.source.import(records) {
            tracing::info!("import contained no rows");
            return Ok(vec![self.set_status("nothing to import".to_owned())]);
        }
        self.session.clear_rows();
        tracing::info!(count, "imported contacts");
        Ok(vec![
            TableEvent::Imported(count),
            self.set_status(format!("{count} contacts imported")),
        ])
    }

    /// Encodes the whole working set, ignoring search and sort.
    pub fn export_csv(&self) -> String {
        csv::encode(self.source.records())
    }

    fn reload_after_mutation<G>(&mut self, gateway: &mut G) -> Vec<TableEvent>
    where
        G: ContactGateway + ?Sized,
    {
        self.reload(gateway)
            .unwrap_or_else(|error| vec![TableEvent::ReloadFailed(error)])
    }

    fn require_record(&self, id: &ContactId) -> Result<&ContactRecord, ContactError> {
        self.source.find(id).ok_or(ContactError::NotFound)
    }

    fn set_status(&mut self, message: String) -> TableEvent {
        self.status_line = Some(message.clone());
        TableEvent::StatusUpdated(message)
    }
}
