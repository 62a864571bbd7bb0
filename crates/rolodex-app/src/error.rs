// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ContactField, ContactId, FieldError};

/// The two fields the backend keeps unique across the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UniqueField {
    PhoneNumber,
    Email,
}

impl UniqueField {
    pub const fn field(self) -> ContactField {
        match self {
            Self::PhoneNumber => ContactField::PhoneNumber,
            Self::Email => ContactField::Email,
        }
    }

    pub const fn duplicate_message(self) -> &'static str {
        match self {
            Self::PhoneNumber => "Duplicate phone number",
            Self::Email => "Duplicate email address",
        }
    }

    pub fn from_duplicate_message(message: &str) -> Option<Self> {
        match message.trim() {
            "Duplicate phone number" => Some(Self::PhoneNumber),
            "Duplicate email address" => Some(Self::Email),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] FieldError),
    #[error("{}", .0.duplicate_message())]
    DuplicateField(UniqueField),
    #[error("Contact not found")]
    NotFound,
    #[error("{0}")]
    Rejected(String),
    #[error("request failed ({0}) -- check the connection and try again")]
    Transport(String),
    #[error("malformed CSV at line {line}: {reason} -- fix the file and import again")]
    MalformedImport { line: usize, reason: String },
    #[error("cannot {action} contact {id} while it is {state}")]
    InvalidTransition {
        id: ContactId,
        action: &'static str,
        state: &'static str,
    },
    #[error("contact {0} already has a request in flight -- wait for it to finish")]
    RequestInFlight(ContactId),
}

impl ContactError {
    /// The field a message belongs to, for errors that are field-scoped.
    pub fn field(&self) -> Option<ContactField> {
        match self {
            Self::Validation(error) => Some(error.field),
            Self::DuplicateField(unique) => Some(unique.field()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContactError, UniqueField};
    use crate::{ContactField, ContactId};

    #[test]
    fn duplicate_messages_round_trip() {
        for unique in [UniqueField::PhoneNumber, UniqueField::Email] {
            assert_eq!(
                UniqueField::from_duplicate_message(unique.duplicate_message()),
                Some(unique)
            );
        }
        assert_eq!(UniqueField::from_duplicate_message("boom"), None);
    }

    #[test]
    fn duplicate_error_is_scoped_to_its_field() {
        let error = ContactError::DuplicateField(UniqueField::PhoneNumber);
        assert_eq!(error.field(), Some(ContactField::PhoneNumber));
        assert_eq!(error.to_string(), "Duplicate phone number");
    }

    #[test]
    fn transition_errors_name_the_row() {
        let error = ContactError::InvalidTransition {
            id: ContactId::new("abc"),
            action: "edit",
            state: "unselected",
        };
        assert_eq!(error.to_string(), "cannot edit contact abc while it is unselected");
        assert_eq!(error.field(), None);
    }
}
