//! Network layer - request execution
//!
//! The executor turns one request into an `ExecutionResult` through an
//! injected `Transport`; the actor runs executions off the caller's thread.

pub mod actor;
pub mod executor;
pub mod transport;

pub use actor::ExecutorActor;
pub use executor::Executor;
pub use transport::{
    create_transport, OutgoingRequest, ReqwestTransport, Transport, TransportError,
    TransportResponse,
};
