// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::{ContactDraft, ContactField, NewContact};

pub const NAME_MESSAGE: &str = "Name should contain only English alphabets and spaces";
pub const PHONE_MESSAGE: &str =
    "Phone number should be exactly 10 digits with no other characters";
pub const EMAIL_MESSAGE: &str = "Invalid email address";

const PHONE_DIGITS: usize = 10;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FieldError {
    pub field: ContactField,
    pub message: String,
}

impl FieldError {
    pub fn new(field: ContactField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub type FieldResult = Result<(), FieldError>;

pub fn validate_name(value: &str) -> FieldResult {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphabetic() || ch.is_whitespace());
    if valid {
        Ok(())
    } else {
        Err(FieldError::new(ContactField::Name, NAME_MESSAGE))
    }
}

pub fn validate_phone(value: &str) -> FieldResult {
    if value.len() == PHONE_DIGITS && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(FieldError::new(ContactField::PhoneNumber, PHONE_MESSAGE))
    }
}

pub fn validate_email(value: &str) -> FieldResult {
    if EMAIL_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(FieldError::new(ContactField::Email, EMAIL_MESSAGE))
    }
}

/// Runs the checks for `field`. Address is free-form.
pub fn validate_field(field: ContactField, value: &str) -> FieldResult {
    match field {
        ContactField::Name => validate_name(value),
        ContactField::PhoneNumber => validate_phone(value),
        ContactField::Email => validate_email(value),
        ContactField::Address => Ok(()),
    }
}

pub fn validate_new_contact(contact: &NewContact) -> FieldResult {
    validate_name(&contact.name)?;
    validate_phone(&contact.phone_number)?;
    validate_email(&contact.email)
}

/// Checks every field present in the draft, in column order.
pub fn validate_draft(draft: &ContactDraft) -> FieldResult {
    for field in ContactField::ALL {
        if let Some(value) = draft.get(field) {
            validate_field(field, value)?;
        }
    }
    Ok(())
}
