use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use wsd_core::entities::EvidenceRecord;
use wsd_core::enums::EvidenceSource;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{EvidenceCommands, SubmitArgs};
use crate::commands::shared::holder::holder_token;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct EvidenceListResponse {
    evidence: Vec<EvidenceRecord>,
}

/// Handle `wsd evidence`.
pub async fn handle(
    action: &EvidenceCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        EvidenceCommands::Submit(args) => submit(args, ctx, flags).await,
        EvidenceCommands::List { session } => {
            let evidence = ctx.store().list_evidence(session).await?;
            output(&EvidenceListResponse { evidence }, flags.format)
        }
    }
}

async fn submit(args: &SubmitArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let source = parse_enum::<EvidenceSource>(&args.source, "source")?;
    let text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(file)) => std::fs::read_to_string(Path::new(file))
            .with_context(|| format!("failed to read evidence file {file}"))?,
        (None, None) => anyhow::bail!("either --text or --file is required"),
    };

    let token = holder_token(ctx.store(), &args.session, &args.holder).await?;
    let outcome = ctx.machine.submit_evidence(&token, &text, source).await?;
    output(&outcome, flags.format)
}
