use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Checklist { action } => commands::checklist::handle(&action, ctx, flags).await,
        Commands::Lock { action } => commands::lock::handle(&action, ctx, flags).await,
        Commands::Evidence { action } => commands::evidence::handle(&action, ctx, flags).await,
        Commands::Reanalyze(args) => commands::reanalyze::handle(&args, ctx, flags).await,
        Commands::Finding { action } => commands::finding::handle(&action, ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
    }
}
