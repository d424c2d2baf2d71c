//! Client demo: issues one command from a small verb vocabulary then exits.

use clap::{Parser, Subcommand};
use receiver_cli::args::ClientArgs;
use receiver_rpc::ReceiverClient;

#[derive(Debug, Parser)]
struct Args {
    #[command(flatten)]
    client: ClientArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a VFO channel, printing its handle.
    AddVfo,
    /// Set a VFO's demodulator mode.
    SetDemod {
        handle: u64,
        demod: DemodArg,
    },
    /// Set the receiver's RF frequency in Hz.
    SetFreq {
        freq: f64,
    },
    /// Start the receiver.
    Start,
    /// Stop the receiver.
    Stop,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum DemodArg {
    Off,
    Raw,
    Am,
    AmSync,
    Lsb,
    Usb,
    Cwl,
    Cwu,
    Nfm,
    WfmMono,
    WfmStereo,
    WfmStereoOirt,
}

impl From<DemodArg> for receiver_core::types::Demod {
    fn from(arg: DemodArg) -> Self {
        use receiver_core::types::Demod::*;
        match arg {
            DemodArg::Off => Off,
            DemodArg::Raw => Raw,
            DemodArg::Am => Am,
            DemodArg::AmSync => AmSync,
            DemodArg::Lsb => Lsb,
            DemodArg::Usb => Usb,
            DemodArg::Cwl => Cwl,
            DemodArg::Cwu => Cwu,
            DemodArg::Nfm => Nfm,
            DemodArg::WfmMono => WfmMono,
            DemodArg::WfmStereo => WfmStereo,
            DemodArg::WfmStereoOirt => WfmStereoOirt,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    receiver_cli::tracing_setup::install("info");
    let args = Args::parse();

    let client = ReceiverClient::connect(args.client.url).await?;

    match args.command {
        Command::AddVfo => {
            let handle = client.add_vfo_channel().await?;
            println!("vfo handle = {handle}");
        }
        Command::SetDemod { handle, demod } => {
            client.vfo_set_demod(handle, demod.into()).await?;
        }
        Command::SetFreq { freq } => {
            let applied = client.set_rf_freq(freq).await?;
            println!("applied freq = {applied}");
        }
        Command::Start => client.start().await?,
        Command::Stop => client.stop().await?,
    }

    Ok(())
}
