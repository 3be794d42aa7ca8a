//! Network listener lifecycle: the `Server` contract and the `ServerManager`
//! that starts a heterogeneous fleet concurrently and stops it in order.

pub mod error;
pub mod http;
pub mod manager;
pub mod reporter;
pub mod server;

pub use error::{LifecycleError, ServerError};
pub use http::HttpServer;
pub use manager::{LifecycleReport, ManagerState, Phase, ServerManager, ServerOutcome};
pub use reporter::{Reporter, TracingReporter};
pub use server::Server;
