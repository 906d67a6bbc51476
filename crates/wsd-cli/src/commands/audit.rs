use wsd_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

/// Handle `wsd audit`.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = AuditFilter {
        session_id: Some(args.session.clone()),
        limit: Some(effective_limit(args.limit, ctx.config.general.default_limit)),
        ..AuditFilter::default()
    };
    let entries = ctx.store().query_audit(&filter).await?;
    output(&entries, flags.format)
}
