//! Client demo: prints every event on the subscription stream, optionally
//! exiting after the initial replay.

use clap::Parser;
use receiver_cli::args::ClientArgs;
use receiver_rpc::convert::NativeEvent;
use receiver_rpc::ReceiverClient;

#[derive(Debug, Parser)]
struct Args {
    #[command(flatten)]
    client: ClientArgs,

    /// Exit once the initial snapshot replay finishes (after `SyncEnd`).
    #[arg(long)]
    sync_only: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    receiver_cli::tracing_setup::install("info");
    let args = Args::parse();

    let client = ReceiverClient::connect(args.client.url).await?;
    let mut stream = client.subscribe_raw(args.sync_only).await?;

    while let Some(event) = stream.message().await? {
        let Some(native) = receiver_rpc::convert::proto_to_native(event) else {
            continue;
        };
        println!("{native:?}");

        if args.sync_only {
            if let NativeEvent::Receiver(ev) = &native {
                if matches!(ev.kind, receiver_core::ReceiverEventKind::SyncEnd) {
                    break;
                }
            }
        }
    }

    Ok(())
}
