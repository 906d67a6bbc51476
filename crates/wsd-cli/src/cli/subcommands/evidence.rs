use clap::{Args, Subcommand};

/// Evidence ledger commands.
#[derive(Clone, Debug, Subcommand)]
pub enum EvidenceCommands {
    /// Record a chunk of evidence and analyze it.
    Submit(SubmitArgs),
    /// List a session's evidence in sequence order.
    List {
        #[arg(long)]
        session: String,
    },
}

#[derive(Clone, Debug, Args)]
pub struct SubmitArgs {
    #[arg(long)]
    pub session: String,
    #[arg(long)]
    pub holder: String,
    /// Evidence text.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub text: Option<String>,
    /// Read the evidence text from a file.
    #[arg(long)]
    pub file: Option<String>,
    /// recording, document or manual
    #[arg(long, default_value = "manual")]
    pub source: String,
}
