use clap::{Parser, Subcommand};

/// API gateway fronting the auth, payment and resource services.
#[derive(Parser)]
#[command(name = "api-gateway", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the gateway server
    Serve {
        /// Port to bind, overrides GATEWAY_PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
}
