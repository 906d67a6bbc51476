use clap::Subcommand;

/// Session lock commands.
#[derive(Clone, Debug, Subcommand)]
pub enum LockCommands {
    /// Acquire the lease, or take over a lapsed one.
    Acquire {
        #[arg(long)]
        session: String,
        #[arg(long)]
        holder: String,
    },
    /// Extend the caller's lease.
    Heartbeat {
        #[arg(long)]
        session: String,
        #[arg(long)]
        holder: String,
    },
    /// Release the caller's lease.
    Release {
        #[arg(long)]
        session: String,
        #[arg(long)]
        holder: String,
    },
    /// Show the current lock of a session.
    Status {
        #[arg(long)]
        session: String,
    },
}
