// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::runtime::Runtime;
use anyhow::{Result, anyhow, bail};
use rolodex_app::{ContactField, ContactId, NewContact, SortKey};
use std::io::{BufRead, Write};
use std::path::PathBuf;

const PROMPT: &str = "rolodex> ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Search(String),
    Sort(SortKey),
    Select(ContactId),
    SelectAll,
    Edit(ContactId),
    Set {
        id: ContactId,
        field: ContactField,
        value: String,
    },
    Save(ContactId),
    Cancel(ContactId),
    Delete(ContactId),
    Add(NewContact),
    Import(PathBuf),
    Export(Option<PathBuf>),
    Reload,
    Help,
    Quit,
}

pub const HELP: &[&str] = &[
    "list                              show the table",
    "search [term]                     filter rows; no term clears the filter",
    "sort <column>                     sort by name, phone, email, address, or date; repeat to flip",
    "select <id>                       toggle a row's selection",
    "select-all                        toggle every visible row",
    "edit <id>                         start editing a row",
    "set <id> <field> <value>          change a field in the row's draft",
    "save <id>                         validate and save the draft",
    "cancel <id>                       drop the draft",
    "delete <id>                       delete a selected row",
    "add <name> | <phone> | <email> [| <address>]",
    "import <path>                     load rows from a CSV file",
    "export [path]                     write the rows to a CSV file",
    "reload                            fetch the collection again",
    "quit                              leave",
];

/// Parses one input line. Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>> {
    let line = line.trim();
    let Some((verb, rest)) = next_word(line) else {
        return Ok(None);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "list" | "ls" => ShellCommand::List,
        "search" | "find" => ShellCommand::Search(rest.to_owned()),
        "sort" => {
            let raw = required(rest, "sort needs a column")?;
            let key = SortKey::parse(raw).ok_or_else(|| {
                anyhow!("unknown column {raw:?}; use name, phone, email, address, or date")
            })?;
            ShellCommand::Sort(key)
        }
        "select" => ShellCommand::Select(contact_id(rest, "select")?),
        "select-all" => ShellCommand::SelectAll,
        "edit" => ShellCommand::Edit(contact_id(rest, "edit")?),
        "set" => {
            let (id, rest) = next_word(rest).ok_or_else(|| anyhow!(SET_USAGE))?;
            let (raw_field, value) = next_word(rest).ok_or_else(|| anyhow!(SET_USAGE))?;
            let field = ContactField::parse(raw_field).ok_or_else(|| {
                anyhow!("unknown field {raw_field:?}; use name, phone, email, or address")
            })?;
            ShellCommand::Set {
                id: ContactId::new(id),
                field,
                value: value.to_owned(),
            }
        }
        "save" => ShellCommand::Save(contact_id(rest, "save")?),
        "cancel" => ShellCommand::Cancel(contact_id(rest, "cancel")?),
        "delete" | "rm" => ShellCommand::Delete(contact_id(rest, "delete")?),
        "add" => ShellCommand::Add(parse_new_contact(rest)?),
        "import" => ShellCommand::Import(PathBuf::from(required(rest, "import needs a path")?)),
        "export" => ShellCommand::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "reload" => ShellCommand::Reload,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        unknown => bail!("unknown command {unknown:?}; type `help` for commands"),
    };
    Ok(Some(command))
}

const SET_USAGE: &str = "set needs `set <id> <field> <value>`";

fn next_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim())),
        None => Some((input, "")),
    }
}

fn required<'a>(rest: &'a str, message: &str) -> Result<&'a str> {
    if rest.is_empty() {
        bail!("{message}");
    }
    Ok(rest)
}

fn contact_id(rest: &str, verb: &str) -> Result<ContactId> {
    match next_word(rest) {
        Some((id, "")) => Ok(ContactId::new(id)),
        Some(_) => bail!("{verb} takes a single contact id"),
        None => bail!("{verb} needs a contact id"),
    }
}

fn parse_new_contact(rest: &str) -> Result<NewContact> {
    let parts: Vec<&str> = rest.split('|').map(str::trim).collect();
    if !(3..=4).contains(&parts.len()) {
        bail!("add needs `add <name> | <phone> | <email> [| <address>]`");
    }
    Ok(NewContact {
        name: parts[0].to_owned(),
        phone_number: parts[1].to_owned(),
        email: parts[2].to_owned(),
        address: parts.get(3).copied().unwrap_or_default().to_owned(),
    })
}

/// Reads commands until `quit` or end of input. Command failures are
/// reported and the loop carries on.
pub fn run_shell<R, W>(input: R, mut output: W, runtime: &mut Runtime) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(
        output,
        "rolodex: contacts from {}; type `help` for commands",
        runtime.describe()
    )?;

    let mut lines = input.lines();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let Some(line) = lines.next() else {
            writeln!(output)?;
            return Ok(());
        };
        let line = line?;

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                writeln!(output, "error: {error:#}")?;
                continue;
            }
        };

        match runtime.execute(command) {
            Ok(reply) => {
                for line in &reply.lines {
                    writeln!(output, "{line}")?;
                }
                if reply.quit {
                    return Ok(());
                }
            }
            Err(error) => {
                tracing::debug!(error = %format!("{error:#}"), "command failed");
                writeln!(output, "error: {error:#}")?;
            }
        }
    }
}
