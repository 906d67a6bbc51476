use clap::Subcommand;

/// Checklist commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ChecklistCommands {
    /// Replace a session's checklist with the items in a JSON or TOML file.
    Generate {
        #[arg(long)]
        session: String,
        #[arg(long)]
        file: String,
    },
    /// List checklist items.
    List {
        #[arg(long)]
        session: String,
        /// Only items in this status (missing, obtained).
        #[arg(long)]
        status: Option<String>,
    },
}
