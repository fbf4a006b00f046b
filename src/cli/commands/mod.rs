pub mod item;
pub mod list;
pub mod raw;
pub mod site;

use anyhow::{Context, Result};
use colored::*;
use serde_json::Value;
use std::path::PathBuf;

use simple_sharepoint::{SharePointConfig, Site};

use super::Cli;
use super::output::{self, OutputFormat};

pub use item::handle_item_command;
pub use list::handle_list_command;
pub use raw::handle_raw_command;
pub use site::{handle_site_command, handle_user_command};

/// Connected site plus the output options every command shares
pub struct CommandContext {
    pub site: Site,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

impl CommandContext {
    pub async fn connect(cli: &Cli) -> Result<Self> {
        let config = match (&cli.env_file, &cli.config) {
            (Some(path), _) => SharePointConfig::from_env_file(path)?,
            (None, Some(path)) => SharePointConfig::from_toml_file(path)?,
            (None, None) => SharePointConfig::load()?,
        };

        eprintln!("🌍 Using site: {}", config.site_url.bright_green().bold());

        let site = Site::connect(config)
            .await
            .context("Failed to connect to SharePoint")?;

        Ok(Self {
            site,
            format: cli.format,
            output: cli.output.clone(),
        })
    }

    pub fn emit(&self, data: &Value) -> Result<()> {
        output::emit(data, self.format, self.output.as_deref())
    }
}

/// Parse a JSON object given on the command line
pub fn parse_object(data: &str) -> Result<serde_json::Map<String, Value>> {
    match serde_json::from_str::<Value>(data).context("--data is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("--data must be a JSON object, got: {}", other),
    }
}
