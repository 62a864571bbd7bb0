// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::{Backend, Config};
use crate::shell::{HELP, ShellCommand};
use anyhow::{Context, Result};
use rolodex_api::HttpGateway;
use rolodex_app::{
    ContactError, ContactField, ContactForm, ContactGateway, ContactTable, RowState, SortDirection,
    SortKey, TableCommand, TableEvent, TableRow,
};
use rolodex_db::Store;
use std::fs;
use std::path::PathBuf;

/// What a command printed, and whether the shell should stop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn printed(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }
}

pub struct Runtime {
    gateway: Box<dyn ContactGateway>,
    table: ContactTable,
    export_path: PathBuf,
}

impl Runtime {
    pub fn new(gateway: Box<dyn ContactGateway>, export_path: PathBuf) -> Self {
        Self {
            gateway,
            table: ContactTable::default(),
            export_path,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let gateway: Box<dyn ContactGateway> = match config.backend()? {
            Backend::Http => Box::new(
                HttpGateway::new(config.base_url(), config.timeout()?).context(
                    "invalid [gateway] config; fix base_url/timeout values",
                )?,
            ),
            Backend::Sqlite => {
                let db_path = config.db_path()?;
                let store = Store::open(&db_path).with_context(|| {
                    format!(
                        "open database {} -- if this path is wrong, set [storage].db_path or ROLODEX_DB_PATH",
                        db_path.display()
                    )
                })?;
                store.bootstrap()?;
                Box::new(store)
            }
        };
        tracing::info!(gateway = %gateway.describe(), "contacts gateway ready");
        Ok(Self::new(gateway, config.export_path()))
    }

    pub fn describe(&self) -> String {
        self.gateway.describe()
    }

    pub fn table(&self) -> &ContactTable {
        &self.table
    }

    pub fn reload(&mut self) -> Result<Vec<TableEvent>, ContactError> {
        self.table.reload(self.gateway.as_mut())
    }

    pub fn execute(&mut self, command: ShellCommand) -> Result<Reply> {
        let events = match command {
            ShellCommand::List => return Ok(Reply::printed(render_table(&self.table))),
            ShellCommand::Help => {
                return Ok(Reply::printed(HELP.iter().map(|line| (*line).to_owned()).collect()));
            }
            ShellCommand::Quit => {
                return Ok(Reply {
                    lines: Vec::new(),
                    quit: true,
                });
            }
            ShellCommand::Export(path) => return self.export(path),
            ShellCommand::Search(term) => self.table.dispatch(TableCommand::Search(term))?,
            ShellCommand::Sort(key) => self.table.dispatch(TableCommand::CycleSort(key))?,
            ShellCommand::Select(id) => self.table.dispatch(TableCommand::ToggleSelect(id))?,
            ShellCommand::SelectAll => self.table.dispatch(TableCommand::ToggleSelectAll)?,
            ShellCommand::Edit(id) => {
                let mut events = Vec::new();
                if !self.table.session().is_selected(&id) {
                    events.extend(self.table.dispatch(TableCommand::ToggleSelect(id.clone()))?);
                }
                events.extend(self.table.dispatch(TableCommand::BeginEdit(id))?);
                events
            }
            ShellCommand::Set { id, field, value } => {
                self.table
                    .dispatch(TableCommand::EditField { id, field, value })?
            }
            ShellCommand::Cancel(id) => self.table.dispatch(TableCommand::CancelEdit(id))?,
            ShellCommand::Save(id) => self.table.save_edit(self.gateway.as_mut(), &id)?,
            ShellCommand::Delete(id) => self.table.delete_selected(self.gateway.as_mut(), &id)?,
            ShellCommand::Add(input) => {
                let mut form = ContactForm::new(input);
                match self.table.create(self.gateway.as_mut(), &mut form) {
                    Ok(events) => events,
                    Err(error) => {
                        let message = form.error_message().map(str::to_owned);
                        return Err(match message {
                            Some(message) if message != error.to_string() => {
                                anyhow::Error::new(error).context(message)
                            }
                            _ => error.into(),
                        });
                    }
                }
            }
            ShellCommand::Import(path) => {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("read import file {}", path.display()))?;
                self.table.import_csv(&text)?
            }
            ShellCommand::Reload => self.reload()?,
        };

        let mut lines: Vec<String> = events.iter().filter_map(describe_event).collect();
        if events.iter().any(changes_rows) {
            lines.extend(render_table(&self.table));
        }
        Ok(Reply::printed(lines))
    }

    fn export(&self, path: Option<PathBuf>) -> Result<Reply> {
        let path = path.unwrap_or_else(|| self.export_path.clone());
        let text = self.table.export_csv();
        fs::write(&path, text).with_context(|| format!("write export file {}", path.display()))?;
        let count = self.table.source().records().len();
        tracing::info!(count, path = %path.display(), "exported contacts");
        Ok(Reply::printed(vec![format!(
            "exported {count} contacts to {}",
            path.display()
        )]))
    }
}

fn describe_event(event: &TableEvent) -> Option<String> {
    match event {
        TableEvent::SelectionChanged { id, selected } => Some(if *selected {
            format!("selected {id}")
        } else {
            format!("deselected {id}")
        }),
        TableEvent::AllSelectionChanged(selected) => Some(
            if *selected {
                "selected all visible rows"
            } else {
                "cleared selection"
            }
            .to_owned(),
        ),
        TableEvent::EditStarted(id) => Some(format!("editing {id}")),
        TableEvent::DraftUpdated { id, field } => Some(format!("{id}: {} updated", field.label())),
        TableEvent::EditCancelled(id) => Some(format!("discarded changes to {id}")),
        TableEvent::Saved(id) => Some(format!("saved {id}")),
        TableEvent::Deleted(id) => Some(format!("deleted {id}")),
        TableEvent::Created(id) => Some(format!("added {id}")),
        TableEvent::ReloadFailed(error) => {
            Some(format!("reload failed, rows may be stale: {error}"))
        }
        TableEvent::StatusUpdated(message) => Some(message.clone()),
        TableEvent::SearchChanged(_)
        | TableEvent::SortChanged(_)
        | TableEvent::Imported(_)
        | TableEvent::Reloaded(_) => None,
    }
}

fn changes_rows(event: &TableEvent) -> bool {
    matches!(
        event,
        TableEvent::SearchChanged(_)
            | TableEvent::SortChanged(_)
            | TableEvent::AllSelectionChanged(_)
            | TableEvent::Imported(_)
            | TableEvent::Reloaded(_)
    )
}

fn row_marker(state: Option<&RowState>) -> &'static str {
    match state {
        None => "[ ]",
        Some(RowState::Selected) => "[x]",
        Some(RowState::Editing { .. }) => "[e]",
        Some(RowState::Saving { .. }) => "[s]",
        Some(RowState::Deleting) => "[d]",
    }
}

fn row_cells(row: &TableRow<'_>) -> Vec<String> {
    let mut cells = vec![row.record.id.to_string()];
    cells.extend(ContactField::ALL.iter().map(|field| row.value(*field).to_owned()));
    cells.push(row.record.display_date());
    cells
}

fn header_cells(table: &ContactTable) -> Vec<String> {
    let sort = table.session().sort;
    let mut cells = vec!["ID".to_owned()];
    cells.extend(SortKey::ALL.iter().map(|key| {
        if sort.key == Some(*key) {
            let arrow = match sort.direction {
                SortDirection::Asc => '^',
                SortDirection::Desc => 'v',
            };
            format!("{} {arrow}", key.label())
        } else {
            key.label().to_owned()
        }
    }));
    cells
}

/// Plain-text rendering of the visible rows.
pub fn render_table(table: &ContactTable) -> Vec<String> {
    let rows = table.rows();
    let header = header_cells(table);
    let body: Vec<Vec<String>> = rows.iter().map(row_cells).collect();

    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let join = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let all_marker = if table.all_selected() { "[x]" } else { "[ ]" };
    let mut lines = vec![format!("{all_marker} {}", join(&header))];
    for (row, cells) in rows.iter().zip(&body) {
        lines.push(format!("{} {}", row_marker(row.state), join(cells)));
        if let Some(error) = row.state.and_then(RowState::error) {
            lines.push(format!("    ! {error}"));
        }
    }

    let session = table.session();
    let mut footer = format!(
        "{} of {} {} contacts",
        rows.len(),
        table.source().records().len(),
        table.source().label()
    );
    if !session.search_term.is_empty() {
        footer.push_str(&format!(", matching {:?}", session.search_term));
    }
    if session.selected_count() > 0 {
        footer.push_str(&format!(", {} selected", session.selected_count()));
    }
    lines.push(footer);
    lines
}
