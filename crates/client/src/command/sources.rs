// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Subcommand;

use crate::account::SourceKind;
use crate::api::ApiClient;
use crate::error::ClientError;
use crate::schema::{RecordId, SourceDraft, SourceEntry};

#[derive(Subcommand)]
pub enum SourceCommand {
    /// List configured sources
    List,
    /// Add a source
    Add {
        name: String,
        url: String,
        /// Add it switched off
        #[arg(long)]
        disabled: bool,
    },
    /// Replace the source with ID
    Update {
        id: String,
        name: String,
        url: String,
        #[arg(long)]
        disabled: bool,
    },
    /// Delete the source with ID
    Remove { id: String },
}

pub(super) async fn run(
    client: &ApiClient,
    kind: SourceKind,
    action: SourceCommand,
) -> Result<(), ClientError> {
    match action {
        SourceCommand::List => {
            let entries = client.sources(kind).await?;
            if entries.is_empty() {
                println!("No {} sources", kind.as_str());
            } else {
                print_table(&entries);
            }
        }
        SourceCommand::Add { name, url, disabled } => {
            let draft = SourceDraft { name, url, enabled: !disabled };
            client.save_source(kind, None, &draft).await?;
            println!("Added {}", draft.name.trim());
        }
        SourceCommand::Update { id, name, url, disabled } => {
            let draft = SourceDraft { name, url, enabled: !disabled };
            let id = RecordId::from(id);
            client.save_source(kind, Some(&id), &draft).await?;
            println!("Updated {id}");
        }
        SourceCommand::Remove { id } => {
            let id = RecordId::from(id);
            client.delete_source(kind, &id).await?;
            println!("Removed {id}");
        }
    }
    Ok(())
}

fn print_table(entries: &[SourceEntry]) {
    let ids: Vec<String> = entries.iter().map(|e| e.id.to_string()).collect();
    let id_w = ids.iter().map(String::len).max().unwrap_or(0).max(2);
    let name_w = entries.iter().map(|e| e.name.len()).max().unwrap_or(0).max(4);

    println!("{:<id_w$}  {:<name_w$}  {:<7}  URL", "ID", "NAME", "ENABLED");
    for (entry, id) in entries.iter().zip(&ids) {
        let enabled = if entry.enabled { "yes" } else { "no" };
        println!("{:<id_w$}  {:<name_w$}  {:<7}  {}", id, entry.name, enabled, entry.url);
    }
}
