use clap::{Args, Parser};

/// Server binary flags. Precedence: `--url` wins over `RECEIVER_URL`, which
/// wins over the default.
#[derive(Debug, Parser)]
#[command(name = "receiver-server", version, about = "Receiver control-plane gRPC server")]
pub struct ServerArgs {
    #[arg(long, env = "RECEIVER_URL", default_value = "0.0.0.0:50050")]
    pub url: String,

    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Shared flags for the client demo binaries.
#[derive(Debug, Args)]
pub struct ClientArgs {
    #[arg(long, env = "RECEIVER_URL", default_value = "http://127.0.0.1:50050")]
    pub url: String,
}
