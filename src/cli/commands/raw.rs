use anyhow::{Context, Result};
use clap::Args;
use log::info;
use reqwest::Method;
use serde_json::Value;

use super::CommandContext;

#[derive(Args)]
pub struct RawCommands {
    /// Endpoint relative to the site, e.g. `_api/web/lists`
    pub endpoint: String,

    /// HTTP method
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,
}

pub async fn handle_raw_command(ctx: &CommandContext, args: RawCommands) -> Result<()> {
    let method: Method = args
        .method
        .to_uppercase()
        .parse()
        .with_context(|| format!("Invalid HTTP method: {}", args.method))?;

    let body: Option<Value> = args
        .data
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("--data is not valid JSON")?;

    info!("Raw {} {}", method, args.endpoint);
    let data = ctx
        .site
        .client()
        .send_json(method, &args.endpoint, body.as_ref())
        .await?;

    ctx.emit(&data)
}
