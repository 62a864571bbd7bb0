// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Plain comma-joined CSV for contact export/import.
//!
//! Fields are neither quoted nor escaped. A value containing a comma shifts
//! every later column of its row on decode; that limitation is accepted.

use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

use crate::{ContactError, ContactId, ContactRecord, SortKey};

pub const EXPORT_FILE_NAME: &str = "contacts.csv";

const COLUMN_COUNT: usize = 5;

pub fn header_row() -> String {
    SortKey::ALL
        .iter()
        .map(|key| key.label())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn encode(records: &[ContactRecord]) -> String {
    let rows = records.iter().map(encode_row).collect::<Vec<_>>();
    format!("{}\n{}", header_row(), rows.join("\n"))
}

fn encode_row(record: &ContactRecord) -> String {
    [
        record.name.as_str(),
        record.phone_number.as_str(),
        record.email.as_str(),
        record.address.as_str(),
        &format_csv_date(record.created_date.date()),
    ]
    .join(",")
}

/// Decodes an exported file. The first malformed row rejects the whole file.
/// Empty lines are skipped; a line holding only spaces is a short row.
pub fn decode(text: &str) -> Result<Vec<ContactRecord>, ContactError> {
    let mut records = Vec::new();
    for (index, raw) in text.split('\n').skip(1).enumerate() {
        let row = raw.strip_suffix('\r').unwrap_or(raw);
        if row.is_empty() {
            continue;
        }
        // header is line 1
        let line = index + 2;
        records.push(decode_row(index, line, row)?);
    }
    tracing::debug!(rows = records.len(), "decoded csv import");
    Ok(records)
}

fn decode_row(index: usize, line: usize, row: &str) -> Result<ContactRecord, ContactError> {
    let fields = row.split(',').collect::<Vec<_>>();
    if fields.len() < COLUMN_COUNT {
        return Err(ContactError::MalformedImport {
            line,
            reason: format!(
                "expected {COLUMN_COUNT} comma-separated fields, found {}",
                fields.len()
            ),
        });
    }

    let date = parse_csv_date(fields[4]).ok_or_else(|| ContactError::MalformedImport {
        line,
        reason: format!("created date {:?} is not dd/mm/yyyy", fields[4]),
    })?;

    Ok(ContactRecord {
        id: ContactId::imported(index),
        name: fields[0].to_owned(),
        phone_number: fields[1].to_owned(),
        email: fields[2].to_owned(),
        address: fields[3].to_owned(),
        created_date: OffsetDateTime::new_utc(date, Time::MIDNIGHT),
    })
}

pub fn format_csv_date(date: Date) -> String {
    date.format(&format_description!("[day]/[month]/[year]"))
        .unwrap_or_default()
}

pub fn parse_csv_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), &format_description!("[day]/[month]/[year]")).ok()
}
