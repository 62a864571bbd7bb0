// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::ids::ContactId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: ContactId,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
}

impl ContactRecord {
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::PhoneNumber => &self.phone_number,
            ContactField::Email => &self.email,
            ContactField::Address => &self.address,
        }
    }

    /// Creation date as `yyyy/mm/dd`.
    pub fn display_date(&self) -> String {
        self.created_date
            .date()
            .format(&format_description!("[year]/[month]/[day]"))
            .unwrap_or_default()
    }

    /// The record as it would look with `draft` applied.
    pub fn with_draft(&self, draft: &ContactDraft) -> Self {
        let mut merged = self.clone();
        for field in ContactField::ALL {
            if let Some(value) = draft.get(field) {
                let slot = match field {
                    ContactField::Name => &mut merged.name,
                    ContactField::PhoneNumber => &mut merged.phone_number,
                    ContactField::Email => &mut merged.email,
                    ContactField::Address => &mut merged.address,
                };
                value.clone_into(slot);
            }
        }
        merged
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    #[serde(default)]
    pub address: String,
}

/// Uncommitted edit of a record. Only the fields that are present are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ContactDraft {
    pub fn from_record(record: &ContactRecord) -> Self {
        Self {
            name: Some(record.name.clone()),
            phone_number: Some(record.phone_number.clone()),
            email: Some(record.email.clone()),
            address: Some(record.address.clone()),
        }
    }

    pub fn get(&self, field: ContactField) -> Option<&String> {
        match field {
            ContactField::Name => self.name.as_ref(),
            ContactField::PhoneNumber => self.phone_number.as_ref(),
            ContactField::Email => self.email.as_ref(),
            ContactField::Address => self.address.as_ref(),
        }
    }

    pub fn set(&mut self, field: ContactField, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            ContactField::Name => self.name = value,
            ContactField::PhoneNumber => self.phone_number = value,
            ContactField::Email => self.email = value,
            ContactField::Address => self.address = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        ContactField::ALL
            .iter()
            .all(|field| self.get(*field).is_none())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContactField {
    Name,
    PhoneNumber,
    Email,
    Address,
}

impl ContactField {
    pub const ALL: [Self; 4] = [Self::Name, Self::PhoneNumber, Self::Email, Self::Address];

    /// Wire name of the field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PhoneNumber => "phoneNumber",
            Self::Email => "email",
            Self::Address => "address",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PhoneNumber => "phone number",
            Self::Email => "email",
            Self::Address => "address",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "phone" | "phonenumber" | "phone_number" => Some(Self::PhoneNumber),
            "email" => Some(Self::Email),
            "address" => Some(Self::Address),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Name,
    PhoneNumber,
    Email,
    Address,
    CreatedDate,
}

impl SortKey {
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::PhoneNumber,
        Self::Email,
        Self::Address,
        Self::CreatedDate,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PhoneNumber => "phoneNumber",
            Self::Email => "email",
            Self::Address => "address",
            Self::CreatedDate => "createdDate",
        }
    }

    /// Column header, shared by the table and the CSV header row.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::PhoneNumber => "Phone Number",
            Self::Email => "Email",
            Self::Address => "Address",
            Self::CreatedDate => "Created Date",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "phone" | "phonenumber" | "phone_number" => Some(Self::PhoneNumber),
            "email" => Some(Self::Email),
            "address" => Some(Self::Address),
            "created" | "createddate" | "created_date" | "date" => Some(Self::CreatedDate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Active sort column, if any, and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SortOrder {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortOrder {
    pub const fn by(key: SortKey, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }

    /// Same column flips direction; a new column starts ascending.
    pub fn cycle(&mut self, key: SortKey) {
        if self.key == Some(key) {
            self.direction = self.direction.toggled();
        } else {
            self.key = Some(key);
            self.direction = SortDirection::Asc;
        }
    }
}
