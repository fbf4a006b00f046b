use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use serde_json::Value;

use simple_sharepoint::api::constants::DEFAULT_ROW_LIMIT;

use super::CommandContext;

#[derive(Args)]
pub struct ListCommands {
    /// List title
    pub title: String,

    #[command(subcommand)]
    pub command: ListSubcommands,
}

#[derive(Subcommand)]
pub enum ListSubcommands {
    /// Show list details
    Details,
    /// Show the fields of the list
    Fields,
    /// Show a single field by title
    Field {
        /// Field title
        title: String,
    },
    /// Show list records
    Items {
        /// Maximum number of records to fetch
        #[arg(long, default_value_t = DEFAULT_ROW_LIMIT)]
        top: u32,
    },
    /// Add a field to the list
    CreateField {
        /// Field title
        name: String,
        /// FieldTypeKind code (2 = Text, 8 = Boolean, 9 = Number, ...)
        kind: i32,
        #[arg(long)]
        required: bool,
        /// Enforce unique values
        #[arg(long)]
        unique: bool,
        #[arg(long)]
        static_name: Option<String>,
    },
}

pub async fn handle_list_command(ctx: &CommandContext, args: ListCommands) -> Result<()> {
    let list = ctx
        .site
        .list(&args.title)
        .await
        .with_context(|| format!("Failed to open list '{}'", args.title))?;

    let data = match args.command {
        ListSubcommands::Details => list.list_details().await?,
        ListSubcommands::Fields => Value::Array(list.fields().await?),
        ListSubcommands::Field { title } => list.get_field(&title).await?,
        ListSubcommands::Items { top } => Value::Array(list.get_list_records(top).await?),
        ListSubcommands::CreateField {
            name,
            kind,
            required,
            unique,
            static_name,
        } => {
            let field = list
                .create_field_with_code(&name, kind, required, unique, static_name.as_deref())
                .await
                .with_context(|| format!("Failed to create field '{}'", name))?;
            eprintln!("✅ Created field {}", name.bright_green());
            field
        }
    };

    ctx.emit(&data)
}
