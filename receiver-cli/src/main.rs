//! Server binary: hosts the receiver worker behind a gRPC listener, using
//! the in-memory DSP stand-in as its backend since no real hardware DSP
//! implementation ships in this workspace.

use clap::Parser;
use receiver_cli::args::ServerArgs;
use receiver_core::fakes::FakeDspReceiver;
use receiver_core::Receiver;
use receiver_rpc::proto::receiver_server::ReceiverServer;
use receiver_rpc::ReceiverService;
use tonic::transport::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ServerArgs::parse();
    receiver_cli::tracing_setup::install(&args.log_level);

    let addr = args.url.parse()?;
    let receiver = Receiver::new(Box::new(FakeDspReceiver::new()));
    let service = ReceiverService::new(receiver);

    tracing::info!(%addr, "starting receiver server");

    Server::builder()
        .add_service(ReceiverServer::new(service))
        .serve_with_shutdown(addr, shutdown_signal())
        .await?;

    tracing::info!("receiver server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM — either one lets `tonic` finish
/// in-flight unary calls and tear down streaming subscriptions.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
