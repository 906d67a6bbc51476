use serde::Serialize;
use wsd_core::entities::Finding;
use wsd_core::ids::{PREFIX_FINDING, has_prefix};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::FindingCommands;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct FindingListResponse {
    findings: Vec<Finding>,
}

/// Handle `wsd finding`.
pub async fn handle(
    action: &FindingCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        FindingCommands::List { session, limit } => {
            let limit = effective_limit(*limit, ctx.config.general.default_limit);
            let findings = ctx.store().list_findings(session, limit).await?;
            output(&FindingListResponse { findings }, flags.format)
        }
        FindingCommands::Delete { id } => {
            if !has_prefix(id, PREFIX_FINDING) {
                anyhow::bail!("'{id}' is not a finding ID (expected {PREFIX_FINDING}-xxxxxxxx)");
            }
            let deleted = ctx.store().delete_finding(id).await?;
            output(&deleted, flags.format)
        }
    }
}
