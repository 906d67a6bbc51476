use clap::Subcommand;

/// Findings commands.
#[derive(Clone, Debug, Subcommand)]
pub enum FindingCommands {
    /// List findings in recording order.
    List {
        #[arg(long)]
        session: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Delete a finding by ID.
    Delete { id: String },
}
