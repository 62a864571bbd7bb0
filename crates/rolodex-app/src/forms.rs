// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::validation::validate_new_contact;
use crate::{ContactError, ContactField, ContactGateway, ContactRecord, NewContact};

pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to add contact. Please try again.";

/// Input for a new contact, with the errors from the last submit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactForm {
    pub input: NewContact,
    field_errors: BTreeMap<ContactField, String>,
    error_message: Option<String>,
}

impl ContactForm {
    pub fn new(input: NewContact) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    pub fn value(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.input.name,
            ContactField::PhoneNumber => &self.input.phone_number,
            ContactField::Email => &self.input.email,
            ContactField::Address => &self.input.address,
        }
    }

    /// Updates one field and clears its error.
    pub fn set_field(&mut self, field: ContactField, value: impl Into<String>) {
        let slot = match field {
            ContactField::Name => &mut self.input.name,
            ContactField::PhoneNumber => &mut self.input.phone_number,
            ContactField::Email => &mut self.input.email,
            ContactField::Address => &mut self.input.address,
        };
        *slot = value.into();
        self.field_errors.remove(&field);
    }

    pub fn field_error(&self, field: ContactField) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Validates and creates the contact. The form is cleared on success;
    /// on failure the input is kept and the error is recorded on the form.
    pub fn submit<G>(&mut self, gateway: &mut G) -> Result<ContactRecord, ContactError>
    where
        G: ContactGateway + ?Sized,
    {
        self.error_message = None;
        if let Err(error) = validate_new_contact(&self.input) {
            self.field_errors.insert(error.field, error.message.clone());
            return Err(error.into());
        }

        match gateway.create(&self.input) {
            Ok(record) => {
                tracing::info!(id = %record.id, "created contact");
                *self = Self::default();
                Ok(record)
            }
            Err(error) => {
                tracing::warn!(%error, "create contact failed");
                self.error_message = Some(form_message(&error));
                Err(error)
            }
        }
    }
}

fn form_message(error: &ContactError) -> String {
    match error {
        ContactError::DuplicateField(unique) => unique.duplicate_message().to_owned(),
        ContactError::Rejected(message) if !message.trim().is_empty() => message.clone(),
        _ => SUBMIT_FAILED_MESSAGE.to_owned(),
    }
}
