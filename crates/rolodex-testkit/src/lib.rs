// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use rolodex_app::{
    ContactDraft, ContactError, ContactField, ContactGateway, ContactId, ContactRecord,
    NewContact, UniqueField,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];
const STREET_NAMES: [&str; 12] = [
    "Cedar", "Maple", "Oak", "Pine", "Willow", "Elm", "Birch", "Juniper", "Sunset", "Ridge",
    "Valley", "Meadow",
];
const CITIES: [&str; 8] = [
    "Austin", "Seattle", "Denver", "Madison", "Raleigh", "Portland", "Boise", "Omaha",
];
const DOMAINS: [&str; 4] = ["example.com", "mail.test", "contacts.io", "post.org"];

const SAMPLE_IMPORT: &str = "Name,Phone Number,Email,Address,Created Date\n\
                             Alice,1234567890,a@x.com,,01/02/2023\n\
                             Bob,0987654321,b@x.com,,15/03/2023";

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of valid contacts.
#[derive(Debug, Clone)]
pub struct ContactFaker {
    rng: DeterministicRng,
}

impl ContactFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn contact(&mut self) -> NewContact {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let domain = self.pick(&DOMAINS);
        let address = if self.rng.bool() {
            format!(
                "{} {} St {}",
                100 + self.rng.int_n(9_900),
                self.pick(&STREET_NAMES),
                self.pick(&CITIES)
            )
        } else {
            String::new()
        };
        NewContact {
            name: format!("{first} {last}"),
            phone_number: format!(
                "{}{:03}{:04}",
                200 + self.rng.int_n(800),
                self.rng.int_n(1_000),
                self.rng.int_n(10_000),
            ),
            email: format!(
                "{}.{}{}@{domain}",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase(),
                self.rng.int_n(1_000)
            ),
            address,
        }
    }

    /// `count` contacts with pairwise distinct phone numbers and emails.
    pub fn contacts(&mut self, count: usize) -> Vec<NewContact> {
        let mut phones = BTreeSet::new();
        let mut emails = BTreeSet::new();
        let mut contacts = Vec::with_capacity(count);
        while contacts.len() < count {
            let contact = self.contact();
            if phones.contains(&contact.phone_number) || emails.contains(&contact.email) {
                continue;
            }
            phones.insert(contact.phone_number.clone());
            emails.insert(contact.email.clone());
            contacts.push(contact);
        }
        contacts
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CallKind {
    List,
    Get,
    Create,
    Update,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    List,
    Get(ContactId),
    Create(NewContact),
    Update(ContactId, ContactDraft),
    Remove(ContactId),
}

impl GatewayCall {
    pub const fn kind(&self) -> CallKind {
        match self {
            Self::List => CallKind::List,
            Self::Get(_) => CallKind::Get,
            Self::Create(_) => CallKind::Create,
            Self::Update(..) => CallKind::Update,
            Self::Remove(_) => CallKind::Remove,
        }
    }
}

/// In-memory collection with the backend's uniqueness rules, a call log,
/// and scripted failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    records: Vec<ContactRecord>,
    next_id: u64,
    calls: Vec<GatewayCall>,
    failures: Vec<(CallKind, ContactError)>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway pre-filled with `contacts`, created in order.
    pub fn seeded(contacts: &[NewContact]) -> Result<Self> {
        let mut gateway = Self::new();
        for contact in contacts {
            gateway
                .create(contact)
                .with_context(|| format!("seed contact {}", contact.name))?;
        }
        gateway.calls.clear();
        Ok(gateway)
    }

    pub fn records(&self) -> &[ContactRecord] {
        &self.records
    }

    pub fn calls(&self) -> &[GatewayCall] {
        &self.calls
    }

    pub fn count_calls(&self, kind: CallKind) -> usize {
        self.calls.iter().filter(|call| call.kind() == kind).count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// The next call of `kind` fails with `error`.
    pub fn fail_next(&mut self, kind: CallKind, error: ContactError) {
        self.failures.push((kind, error));
    }

    fn record_call(&mut self, call: GatewayCall) -> Result<(), ContactError> {
        let kind = call.kind();
        self.calls.push(call);
        match self.failures.iter().position(|(failing, _)| *failing == kind) {
            Some(index) => Err(self.failures.remove(index).1),
            None => Ok(()),
        }
    }

    fn position(&self, id: &ContactId) -> Result<usize, ContactError> {
        self.records
            .iter()
            .position(|record| &record.id == id)
            .ok_or(ContactError::NotFound)
    }

    fn conflict(
        &self,
        phone_number: Option<&str>,
        email: Option<&str>,
        exclude: Option<&ContactId>,
    ) -> Option<UniqueField> {
        let others = || {
            self.records
                .iter()
                .filter(move |record| Some(&record.id) != exclude)
        };
        if let Some(phone) = phone_number
            && others().any(|record| record.phone_number == phone)
        {
            return Some(UniqueField::PhoneNumber);
        }
        if let Some(email) = email
            && others().any(|record| record.email == email)
        {
            return Some(UniqueField::Email);
        }
        None
    }
}

impl ContactGateway for MemoryGateway {
    fn describe(&self) -> String {
        "in-memory contacts".to_owned()
    }

    fn list(&mut self) -> Result<Vec<ContactRecord>, ContactError> {
        self.record_call(GatewayCall::List)?;
        Ok(self.records.clone())
    }

    fn get(&mut self, id: &ContactId) -> Result<ContactRecord, ContactError> {
        self.record_call(GatewayCall::Get(id.clone()))?;
        let index = self.position(id)?;
        Ok(self.records[index].clone())
    }

    fn create(&mut self, contact: &NewContact) -> Result<ContactRecord, ContactError> {
        self.record_call(GatewayCall::Create(contact.clone()))?;
        for field in [ContactField::Name, ContactField::PhoneNumber, ContactField::Email] {
            let value = match field {
                ContactField::Name => &contact.name,
                ContactField::PhoneNumber => &contact.phone_number,
                _ => &contact.email,
            };
            if value.trim().is_empty() {
                return Err(ContactError::Rejected(format!("{} is required", field.label())));
            }
        }
        if let Some(unique) =
            self.conflict(Some(&contact.phone_number), Some(&contact.email), None)
        {
            return Err(ContactError::DuplicateField(unique));
        }

        self.next_id += 1;
        let record = ContactRecord {
            id: ContactId::new(format!("{:024x}", self.next_id)),
            name: contact.name.clone(),
            phone_number: contact.phone_number.clone(),
            email: contact.email.clone(),
            address: contact.address.clone(),
            created_date: fixture_timestamp() + Duration::minutes(self.next_id as i64),
        };
        self.records.push(record.clone());
        Ok(record)
    }

    fn update(
        &mut self,
        id: &ContactId,
        draft: &ContactDraft,
    ) -> Result<ContactRecord, ContactError> {
        self.record_call(GatewayCall::Update(id.clone(), draft.clone()))?;
        let index = self.position(id)?;
        if let Some(unique) = self.conflict(
            draft.phone_number.as_deref(),
            draft.email.as_deref(),
            Some(id),
        ) {
            return Err(ContactError::DuplicateField(unique));
        }
        let updated = self.records[index].with_draft(draft);
        self.records[index] = updated.clone();
        Ok(updated)
    }

    fn remove(&mut self, id: &ContactId) -> Result<(), ContactError> {
        self.record_call(GatewayCall::Remove(id.clone()))?;
        let index = self.position(id)?;
        self.records.remove(index);
        Ok(())
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("rolodex.db");
    Ok((dir, db_path))
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}

pub fn fixture_timestamp() -> OffsetDateTime {
    OffsetDateTime::parse(fixture_datetime(), &Rfc3339).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Two-row export in the shape the table writes.
pub fn sample_import_csv() -> &'static str {
    SAMPLE_IMPORT
}
