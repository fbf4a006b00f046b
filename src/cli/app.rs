use super::commands::item::ItemCommands;
use super::commands::list::ListCommands;
use super::commands::raw::RawCommands;
use super::commands::site::{SiteCommands, UserCommands};
use super::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sharepoint-cli")]
#[command(about = "A CLI tool for interacting with the SharePoint REST API")]
pub struct Cli {
    /// Load credentials from this .env file instead of the environment
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Load settings from this TOML file
    #[arg(long, global = true, conflicts_with = "env_file")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Save results to file
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read site-level resources
    Site(SiteCommands),
    /// Look up site users by id or email
    User(UserCommands),
    /// Inspect a list and its records
    List(ListCommands),
    /// Create, update or delete list items
    Item(ItemCommands),
    /// Send a request to any endpoint under the site
    Raw(RawCommands),
}
