use crate::cli::GlobalFlags;
use crate::cli::root_commands::ReanalyzeArgs;
use crate::commands::shared::holder::holder_token;
use crate::context::AppContext;
use crate::output::output;

/// Handle `wsd reanalyze`.
pub async fn handle(args: &ReanalyzeArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let token = holder_token(ctx.store(), &args.session, &args.holder).await?;
    let outcome = ctx.coordinator.reanalyze_all(&token, &args.session).await?;
    if let Some(notice) = &outcome.truncation {
        tracing::info!(
            dropped_records = notice.dropped_records,
            retained_chars = notice.retained_chars,
            "oldest evidence left out of the reanalysis corpus"
        );
    }
    output(&outcome, flags.format)
}
