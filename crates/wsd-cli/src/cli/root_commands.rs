use clap::{Args, Subcommand};

use crate::cli::subcommands::{ChecklistCommands, EvidenceCommands, FindingCommands, LockCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Discovery checklist of a session.
    Checklist {
        #[command(subcommand)]
        action: ChecklistCommands,
    },
    /// Session access lock.
    Lock {
        #[command(subcommand)]
        action: LockCommands,
    },
    /// Evidence ledger.
    Evidence {
        #[command(subcommand)]
        action: EvidenceCommands,
    },
    /// Re-evaluate every item against the whole evidence ledger.
    Reanalyze(ReanalyzeArgs),
    /// Findings ledger.
    Finding {
        #[command(subcommand)]
        action: FindingCommands,
    },
    /// Show the audit trail of a session.
    Audit(AuditArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ReanalyzeArgs {
    #[arg(long)]
    pub session: String,
    /// Lock holder running the reanalysis.
    #[arg(long)]
    pub holder: String,
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub session: String,
    #[arg(long)]
    pub limit: Option<u32>,
}
