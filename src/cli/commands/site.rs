use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::Value;

use super::CommandContext;

#[derive(Args)]
pub struct SiteCommands {
    /// Site resource to read
    pub resource: SiteResource,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SiteResource {
    Info,
    Web,
    ContextInfo,
    ContentTypes,
    EventReceivers,
    Features,
    Fields,
    Lists,
    Users,
    Groups,
    RoleAssignments,
}

#[derive(Args)]
pub struct UserCommands {
    /// SharePoint user id to resolve to an email address
    #[arg(long, conflicts_with = "email", required_unless_present = "email")]
    pub id: Option<i64>,

    /// Email address to resolve to a SharePoint user id
    #[arg(long)]
    pub email: Option<String>,
}

pub async fn handle_site_command(ctx: &CommandContext, args: SiteCommands) -> Result<()> {
    let site = &ctx.site;

    let data = match args.resource {
        SiteResource::Info => site.info().await?,
        SiteResource::Web => site.web().await?,
        SiteResource::ContextInfo => site.context_info().await?,
        SiteResource::ContentTypes => Value::Array(site.content_types().await?),
        SiteResource::EventReceivers => Value::Array(site.event_receivers().await?),
        SiteResource::Features => Value::Array(site.features().await?),
        SiteResource::Fields => Value::Array(site.fields().await?),
        SiteResource::Lists => Value::Array(site.lists().await?),
        SiteResource::Users => Value::Array(site.site_users().await?),
        SiteResource::Groups => Value::Array(site.groups().await?),
        SiteResource::RoleAssignments => Value::Array(site.role_assignments().await?),
    };

    ctx.emit(&data)
}

pub async fn handle_user_command(ctx: &CommandContext, args: UserCommands) -> Result<()> {
    let data = match (args.id, args.email) {
        (Some(id), _) => {
            let email = ctx
                .site
                .email_for_user_id(id)
                .await
                .context("Failed to look up user")?;
            serde_json::json!({ "Id": id, "Email": email })
        }
        (None, Some(email)) => {
            let id = ctx
                .site
                .user_id_for_email(&email)
                .await
                .context("Failed to look up user")?;
            serde_json::json!({ "Id": id, "Email": email })
        }
        (None, None) => anyhow::bail!("Provide either --id or --email"),
    };

    ctx.emit(&data)
}
