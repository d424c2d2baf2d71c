//! gRPC boundary over `receiver-core`: codegen from `proto/receiver.proto`,
//! server-side unary/streaming handlers, and a client with call bookkeeping
//! and an event reactor.

pub mod client;
pub mod client_call;
pub mod convert;
pub mod error;
pub mod reactor;
pub mod server;

pub mod proto {
    tonic::include_proto!("receiver.v1");
}

pub use client::ReceiverClient;
pub use error::RpcError;
pub use server::ReceiverService;
