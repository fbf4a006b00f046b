use anyhow::Result;
use clap::Parser;
use log::info;

mod cli;

use cli::commands::{
    CommandContext, handle_item_command, handle_list_command, handle_raw_command,
    handle_site_command, handle_user_command,
};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("sharepoint-cli.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting sharepoint-cli");

    let ctx = CommandContext::connect(&cli).await?;

    match cli.command {
        Commands::Site(args) => handle_site_command(&ctx, args).await,
        Commands::User(args) => handle_user_command(&ctx, args).await,
        Commands::List(args) => handle_list_command(&ctx, args).await,
        Commands::Item(args) => handle_item_command(&ctx, args).await,
        Commands::Raw(args) => handle_raw_command(&ctx, args).await,
    }
}
