//! Asynchronous control-plane core for a software-defined-radio receiver:
//! the worker thread, the receiver and VFO façades, and the typed event
//! model they publish. No RPC transport and no DSP implementation live
//! here — see `receiver-rpc` for the former and [`dsp`] for the trait
//! boundary the latter plugs into.

pub mod dsp;
pub mod error;
pub mod event;
pub mod filter;
pub mod hub;
pub mod receiver;
pub mod types;
pub mod vfo;
pub mod worker;

/// In-memory `DspReceiver`/`DspVfoChannel` stand-ins. Used by this crate's
/// own tests, and by `receiver-cli`'s server binary as its backend, since
/// no real hardware DSP implementation ships here.
pub mod fakes;

pub use error::{ErrorKind, FacadeError, WorkerError};
pub use event::{ReceiverEvent, ReceiverEventKind, VfoEvent, VfoEventKind};
pub use hub::SubscriberHandle;
pub use receiver::Receiver;
pub use vfo::{ShadowState, Vfo};
