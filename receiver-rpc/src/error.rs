//! Client-side transport error: wraps `tonic`'s error types and projects to
//! `ErrorKind::CallError` at the user callback boundary, same as
//! `FacadeError::kind` does for `receiver-core`.

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("rpc call failed: {0}")]
    Status(#[from] tonic::Status),

    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// The call reached the server and got a well-formed reply, but the
    /// reply's own `ErrorCode` field was not `OK`: business-level failures
    /// travel in the reply, not as a non-OK gRPC status.
    #[error("receiver reported error: {0:?}")]
    App(receiver_core::ErrorKind),
}

impl RpcError {
    pub fn kind(&self) -> receiver_core::ErrorKind {
        match self {
            RpcError::Status(_) | RpcError::Transport(_) => receiver_core::ErrorKind::CallError,
            RpcError::App(kind) => *kind,
        }
    }
}
