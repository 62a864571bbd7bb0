// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::validation::validate_draft;
use crate::{ContactDraft, ContactError, ContactField, ContactId, ContactRecord, SortOrder};

/// Per-row lifecycle. A row with no entry is unselected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowState {
    Selected,
    Editing {
        draft: ContactDraft,
        error: Option<ContactError>,
    },
    Saving {
        draft: ContactDraft,
    },
    Deleting,
}

impl RowState {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Selected => "selected",
            Self::Editing { .. } => "editing",
            Self::Saving { .. } => "saving",
            Self::Deleting => "deleting",
        }
    }

    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::Saving { .. } | Self::Deleting)
    }

    pub fn draft(&self) -> Option<&ContactDraft> {
        match self {
            Self::Editing { draft, .. } | Self::Saving { draft } => Some(draft),
            Self::Selected | Self::Deleting => None,
        }
    }

    pub fn error(&self) -> Option<&ContactError> {
        match self {
            Self::Editing { error, .. } => error.as_ref(),
            _ => None,
        }
    }
}

const UNSELECTED: &str = "unselected";

/// Display state for one viewing of the table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub search_term: String,
    pub sort: SortOrder,
    rows: BTreeMap<ContactId, RowState>,
}

impl Session {
    pub fn row_state(&self, id: &ContactId) -> Option<&RowState> {
        self.rows.get(id)
    }

    pub fn is_selected(&self, id: &ContactId) -> bool {
        self.rows.contains_key(id)
    }

    pub fn selected_count(&self) -> usize {
        self.rows.len()
    }

    /// Derived state of the header checkbox.
    pub fn all_selected(&self, visible: &[ContactId]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.rows.contains_key(id))
    }

    /// Drops every row state, keeping search and sort.
    pub fn clear_rows(&mut self) {
        self.rows.clear();
    }

    /// Returns whether the row is selected afterwards. Deselecting an
    /// editing row discards its draft.
    pub fn toggle_select(&mut self, id: &ContactId) -> Result<bool, ContactError> {
        match self.rows.get(id) {
            None => {
                self.rows.insert(id.clone(), RowState::Selected);
                Ok(true)
            }
            Some(state) if state.is_in_flight() => Err(ContactError::RequestInFlight(id.clone())),
            Some(_) => {
                self.rows.remove(id);
                Ok(false)
            }
        }
    }

    /// Selects every visible row, or clears them when all are already
    /// selected. Rows outside `visible` and in-flight rows are untouched.
    pub fn toggle_select_all(&mut self, visible: &[ContactId]) -> bool {
        if self.all_selected(visible) {
            for id in visible {
                if self.rows.get(id).is_some_and(|state| !state.is_in_flight()) {
                    self.rows.remove(id);
                }
            }
            false
        } else {
            for id in visible {
                self.rows.entry(id.clone()).or_insert(RowState::Selected);
            }
            true
        }
    }

    pub fn begin_edit(&mut self, record: &ContactRecord) -> Result<(), ContactError> {
        let state = self.require(&record.id, "edit")?;
        if !matches!(state, RowState::Selected) {
            return Err(self.invalid(&record.id, "edit"));
        }
        self.rows.insert(
            record.id.clone(),
            RowState::Editing {
                draft: ContactDraft::from_record(record),
                error: None,
            },
        );
        Ok(())
    }

    /// Shallow merge of one field into the draft.
    pub fn edit_field(
        &mut self,
        id: &ContactId,
        field: ContactField,
        value: impl Into<String>,
    ) -> Result<(), ContactError> {
        match self.rows.get_mut(id) {
            Some(RowState::Editing { draft, error }) => {
                draft.set(field, value);
                *error = None;
                Ok(())
            }
            _ => Err(self.invalid(id, "edit a field of")),
        }
    }

    pub fn cancel_edit(&mut self, id: &ContactId) -> Result<(), ContactError> {
        match self.rows.get(id) {
            Some(RowState::Editing { .. }) => {
                self.rows.insert(id.clone(), RowState::Selected);
                Ok(())
            }
            _ => Err(self.invalid(id, "cancel the edit of")),
        }
    }

    /// Validates the draft and marks the row in flight. The returned draft
    /// is what should be sent to the gateway.
    pub fn begin_save(&mut self, id: &ContactId) -> Result<ContactDraft, ContactError> {
        let Some(RowState::Editing { draft, error }) = self.rows.get_mut(id) else {
            if self.rows.get(id).is_some_and(RowState::is_in_flight) {
                return Err(ContactError::RequestInFlight(id.clone()));
            }
            return Err(self.invalid(id, "save"));
        };

        if let Err(field_error) = validate_draft(draft) {
            let failure = ContactError::Validation(field_error);
            *error = Some(failure.clone());
            return Err(failure);
        }

        let draft = draft.clone();
        self.rows.insert(
            id.clone(),
            RowState::Saving {
                draft: draft.clone(),
            },
        );
        Ok(draft)
    }

    /// Settles a save started with [`Session::begin_save`]. A failure puts
    /// the row back into editing with the draft and the error attached.
    pub fn finish_save<T>(
        &mut self,
        id: &ContactId,
        outcome: Result<T, ContactError>,
    ) -> Result<T, ContactError> {
        if !matches!(self.rows.get(id), Some(RowState::Saving { .. })) {
            return Err(self.invalid(id, "finish saving"));
        }
        let Some(RowState::Saving { draft }) = self.rows.remove(id) else {
            return Err(self.invalid(id, "finish saving"));
        };
        match outcome {
            Ok(value) => {
                self.rows.insert(id.clone(), RowState::Selected);
                Ok(value)
            }
            Err(error) => {
                self.rows.insert(
                    id.clone(),
                    RowState::Editing {
                        draft,
                        error: Some(error.clone()),
                    },
                );
                Err(error)
            }
        }
    }

    pub fn begin_delete(&mut self, id: &ContactId) -> Result<(), ContactError> {
        match self.rows.get(id) {
            Some(RowState::Selected) => {
                self.rows.insert(id.clone(), RowState::Deleting);
                Ok(())
            }
            Some(state) if state.is_in_flight() => Err(ContactError::RequestInFlight(id.clone())),
            _ => Err(self.invalid(id, "delete")),
        }
    }

    /// Settles a delete. A failure leaves the row selected.
    pub fn finish_delete(
        &mut self,
        id: &ContactId,
        outcome: Result<(), ContactError>,
    ) -> Result<(), ContactError> {
        if !matches!(self.rows.get(id), Some(RowState::Deleting)) {
            return Err(self.invalid(id, "finish deleting"));
        }
        match outcome {
            Ok(()) => {
                self.rows.remove(id);
                Ok(())
            }
            Err(error) => {
                self.rows.insert(id.clone(), RowState::Selected);
                Err(error)
            }
        }
    }

    fn require(&self, id: &ContactId, action: &'static str) -> Result<&RowState, ContactError> {
        self.rows.get(id).ok_or_else(|| self.invalid(id, action))
    }

    fn invalid(&self, id: &ContactId, action: &'static str) -> ContactError {
        let state = self.rows.get(id).map_or(UNSELECTED, RowState::label);
        ContactError::InvalidTransition {
            id: id.clone(),
            action,
            state,
        }
    }
}
