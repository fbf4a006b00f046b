use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use serde_json::{Map, Value, json};
use std::sync::Arc;

use simple_sharepoint::item::{AttributeMap, ListItem, ListItemStore, SaveOutcome};

use super::{CommandContext, parse_object};

#[derive(Args)]
pub struct ItemCommands {
    /// List title
    pub list: String,

    #[command(subcommand)]
    pub command: ItemSubcommands,
}

#[derive(Subcommand)]
pub enum ItemSubcommands {
    /// Insert a new record
    Add {
        /// Field values keyed by SharePoint internal name, as a JSON object
        #[arg(long)]
        data: String,
    },
    /// Update fields of an existing record
    Update {
        /// Item id
        id: i64,
        /// Field values keyed by SharePoint internal name, as a JSON object
        #[arg(long)]
        data: String,
    },
    /// Delete a record
    Delete {
        /// Item id
        id: i64,
    },
}

pub async fn handle_item_command(ctx: &CommandContext, args: ItemCommands) -> Result<()> {
    let list = ctx
        .site
        .list(&args.list)
        .await
        .with_context(|| format!("Failed to open list '{}'", args.list))?;
    let store: Arc<dyn ListItemStore> = Arc::new(list);

    match args.command {
        ItemSubcommands::Add { data } => {
            let item = item_from_fields(parse_object(&data)?, None, store)?;
            match item.save(false).await.context("Failed to add item")? {
                SaveOutcome::Inserted(record) => {
                    eprintln!("✅ Added item to {}", args.list.bright_green());
                    ctx.emit(&record)
                }
                other => anyhow::bail!("Unexpected save outcome for a new item: {:?}", other),
            }
        }
        ItemSubcommands::Update { id, data } => {
            let item = item_from_fields(parse_object(&data)?, Some(id), store)?;
            let outcome = item.save(false).await.context("Failed to update item")?;
            let result = update_result(id, &outcome)?;
            if outcome == SaveOutcome::Updated {
                eprintln!("✅ Updated item {} in {}", id, args.list.bright_green());
            } else {
                eprintln!("ℹ️  No fields to update for item {} in {}", id, args.list.bright_green());
            }
            ctx.emit(&result)
        }
        ItemSubcommands::Delete { id } => {
            let item = item_from_fields(Map::new(), Some(id), store)?;
            item.delete().await.context("Failed to delete item")?;
            eprintln!("🗑️  Deleted item {} from {}", id, args.list.bright_green());
            ctx.emit(&json!({ "Id": id, "deleted": true }))
        }
    }
}

fn update_result(id: i64, outcome: &SaveOutcome) -> Result<Value> {
    match outcome {
        SaveOutcome::Updated => Ok(json!({ "Id": id, "updated": true })),
        SaveOutcome::Unchanged => Ok(json!({ "Id": id, "updated": false })),
        other => anyhow::bail!("Unexpected save outcome for an existing item: {:?}", other),
    }
}

/// Build an unsnapshotted item whose attribute names mirror the given SharePoint fields
fn item_from_fields(
    fields: Map<String, Value>,
    id: Option<i64>,
    store: Arc<dyn ListItemStore>,
) -> Result<ListItem> {
    let attribute_map = fields
        .keys()
        .filter(|name| !name.eq_ignore_ascii_case("id"))
        .map(|name| (name.clone(), name.clone(), true))
        .collect::<AttributeMap>()
        .with("id", "Id", false);

    let mut item = ListItem::from_dict(&fields, Some(store), Some(Arc::new(attribute_map)))?;
    item.set_id(id);
    Ok(item)
}
