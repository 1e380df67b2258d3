use clap::{Parser, Subcommand};

/// Gate Relay — opens the gate from Slack and reports back
#[derive(Parser)]
#[command(name = "gate-relay", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay server
    Serve {
        /// Port to bind (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Seconds to wait for the gate to confirm (overrides GATE_CONFIRM_TIMEOUT_SECS)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}
