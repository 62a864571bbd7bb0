// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rolodex_app::{
    ContactDraft, ContactError, ContactField, ContactGateway, ContactId, ContactRecord,
    NewContact, UniqueField,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const APP_NAME: &str = "rolodex";

const MEMORY_LOCATION: &str = ":memory:";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "name",
    "phone_number",
    "email",
    "address",
    "created_date",
];

struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_contacts_phone_number",
        create_sql: "CREATE UNIQUE INDEX IF NOT EXISTS idx_contacts_phone_number ON contacts (phone_number);",
    },
    RequiredIndex {
        name: "idx_contacts_email",
        create_sql: "CREATE UNIQUE INDEX IF NOT EXISTS idx_contacts_email ON contacts (email);",
    },
];

const SELECT_CONTACT: &str = "
    SELECT id, name, phone_number, email, address, created_date
    FROM contacts
";

pub struct Store {
    conn: Connection,
    location: String,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self {
            conn,
            location: printable,
        })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self {
            conn,
            location: MEMORY_LOCATION.to_owned(),
        })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn bootstrap(&self) -> Result<()> {
        if table_exists(&self.conn, "contacts")? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }
        ensure_required_indexes(&self.conn)
    }

    pub fn list_contacts(&self) -> Result<Vec<ContactRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_CONTACT} ORDER BY id ASC"))
            .context("prepare contacts query")?;
        let rows = stmt
            .query_map([], contact_from_row)
            .context("query contacts")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect contacts")
    }

    pub fn get_contact(&self, contact_id: i64) -> Result<Option<ContactRecord>> {
        self.conn
            .query_row(
                &format!("{SELECT_CONTACT} WHERE id = ?"),
                params![contact_id],
                contact_from_row,
            )
            .optional()
            .with_context(|| format!("load contact {contact_id}"))
    }

    /// Which unique field `phone_number`/`email` would collide on, checking
    /// phone first. `exclude` skips the row being updated.
    pub fn find_conflict(
        &self,
        phone_number: Option<&str>,
        email: Option<&str>,
        exclude: Option<i64>,
    ) -> Result<Option<UniqueField>> {
        let checks = [
            (UniqueField::PhoneNumber, "phone_number", phone_number),
            (UniqueField::Email, "email", email),
        ];
        for (unique, column, value) in checks {
            let Some(value) = value else {
                continue;
            };
            let taken = self
                .conn
                .query_row(
                    &format!(
                        "SELECT EXISTS(SELECT 1 FROM contacts WHERE {column} = ? AND id IS NOT ?)"
                    ),
                    params![value, exclude],
                    |row| row.get::<_, i64>(0),
                )
                .with_context(|| format!("check existing {column}"))?;
            if taken == 1 {
                return Ok(Some(unique));
            }
        }
        Ok(None)
    }

    pub fn insert_contact(&self, contact: &NewContact) -> Result<ContactRecord> {
        let now = OffsetDateTime::now_utc();
        let created_date = now.format(&Rfc3339).context("format current timestamp")?;
        self.conn
            .execute(
                "
                INSERT INTO contacts (name, phone_number, email, address, created_date)
                VALUES (?, ?, ?, ?, ?)
                ",
                params![
                    contact.name,
                    contact.phone_number,
                    contact.email,
                    contact.address,
                    created_date,
                ],
            )
            .context("insert contact")?;
        Ok(ContactRecord {
            id: ContactId::from(self.conn.last_insert_rowid()),
            name: contact.name.clone(),
            phone_number: contact.phone_number.clone(),
            email: contact.email.clone(),
            address: contact.address.clone(),
            created_date: now,
        })
    }

    /// Writes the fields present in `draft`. Returns `None` when no row has
    /// that id.
    pub fn update_contact(
        &self,
        contact_id: i64,
        draft: &ContactDraft,
    ) -> Result<Option<ContactRecord>> {
        let Some(current) = self.get_contact(contact_id)? else {
            return Ok(None);
        };
        let merged = current.with_draft(draft);
        self.conn
            .execute(
                "
                UPDATE contacts
                SET
                  name = ?,
                  phone_number = ?,
                  email = ?,
                  address = ?
                WHERE id = ?
                ",
                params![
                    merged.name,
                    merged.phone_number,
                    merged.email,
                    merged.address,
                    contact_id,
                ],
            )
            .with_context(|| format!("update contact {contact_id}"))?;
        Ok(Some(merged))
    }

    /// Returns false when no row has that id.
    pub fn delete_contact(&self, contact_id: i64) -> Result<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?", params![contact_id])
            .with_context(|| format!("delete contact {contact_id}"))?;
        Ok(rows_affected > 0)
    }
}

impl ContactGateway for Store {
    fn describe(&self) -> String {
        format!("sqlite database {}", self.location)
    }

    fn list(&mut self) -> Result<Vec<ContactRecord>, ContactError> {
        self.list_contacts().map_err(storage_failure)
    }

    fn get(&mut self, id: &ContactId) -> Result<ContactRecord, ContactError> {
        let contact_id = row_id(id)?;
        self.get_contact(contact_id)
            .map_err(storage_failure)?
            .ok_or(ContactError::NotFound)
    }

    fn create(&mut self, contact: &NewContact) -> Result<ContactRecord, ContactError> {
        for field in [ContactField::Name, ContactField::PhoneNumber, ContactField::Email] {
            require_present(field, contact_value(contact, field))?;
        }
        let conflict = self
            .find_conflict(Some(&contact.phone_number), Some(&contact.email), None)
            .map_err(storage_failure)?;
        if let Some(unique) = conflict {
            tracing::debug!(field = unique.field().as_str(), "create rejected as duplicate");
            return Err(ContactError::DuplicateField(unique));
        }
        self.insert_contact(contact).map_err(storage_failure)
    }

    fn update(
        &mut self,
        id: &ContactId,
        draft: &ContactDraft,
    ) -> Result<ContactRecord, ContactError> {
        let contact_id = row_id(id)?;
        for field in [ContactField::Name, ContactField::PhoneNumber, ContactField::Email] {
            if let Some(value) = draft.get(field) {
                require_present(field, value)?;
            }
        }
        if self
            .get_contact(contact_id)
            .map_err(storage_failure)?
            .is_none()
        {
            return Err(ContactError::NotFound);
        }
        let conflict = self
            .find_conflict(
                draft.phone_number.as_deref(),
                draft.email.as_deref(),
                Some(contact_id),
            )
            .map_err(storage_failure)?;
        if let Some(unique) = conflict {
            return Err(ContactError::DuplicateField(unique));
        }
        self.update_contact(contact_id, draft)
            .map_err(storage_failure)?
            .ok_or(ContactError::NotFound)
    }

    fn remove(&mut self, id: &ContactId) -> Result<(), ContactError> {
        let contact_id = row_id(id)?;
        if self.delete_contact(contact_id).map_err(storage_failure)? {
            Ok(())
        } else {
            Err(ContactError::NotFound)
        }
    }
}

/// Ids that are not row ids (imported rows, for one) name no stored contact.
fn row_id(id: &ContactId) -> Result<i64, ContactError> {
    id.as_str().parse().map_err(|_| ContactError::NotFound)
}

fn contact_value(contact: &NewContact, field: ContactField) -> &str {
    match field {
        ContactField::Name => &contact.name,
        ContactField::PhoneNumber => &contact.phone_number,
        ContactField::Email => &contact.email,
        ContactField::Address => &contact.address,
    }
}

fn require_present(field: ContactField, value: &str) -> Result<(), ContactError> {
    if value.trim().is_empty() {
        return Err(ContactError::Rejected(format!("{} is required", field.label())));
    }
    Ok(())
}

fn storage_failure(error: anyhow::Error) -> ContactError {
    let message = format!("{error:#}");
    tracing::warn!(%message, "sqlite gateway failure");
    ContactError::Transport(message)
}

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<ContactRecord> {
    let created_raw: String = row.get(5)?;
    Ok(ContactRecord {
        id: ContactId::from(row.get::<_, i64>(0)?),
        name: row.get(1)?,
        phone_number: row.get(2)?,
        email: row.get(3)?,
        address: row.get(4)?,
        created_date: parse_datetime(&created_raw).map_err(to_sql_error)?,
    })
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("ROLODEX_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set ROLODEX_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("rolodex.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == MEMORY_LOCATION {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn validate_schema(conn: &Connection) -> Result<()> {
    let columns = table_columns(conn, "contacts")?;
    let missing = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !columns.contains(*column))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "table `contacts` is missing required columns: {}; point storage.db_path at a rolodex database",
            missing.join(", ")
        );
    }
    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql).with_context(|| {
            format!(
                "ensure required index `{}` -- remove duplicate phone numbers or emails first",
                index.name
            )
        })?;
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn parse_datetime(raw: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339).with_context(|| format!("parse timestamp {raw:?}"))
}

fn to_sql_error(error: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        5,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            error.to_string(),
        )),
    )
}
