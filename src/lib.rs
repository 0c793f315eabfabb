//! API Gateway Reconciler Library
//!
//! Converges a declared set of HTTP endpoints onto an AWS API Gateway REST
//! API: missing routes are created, backend functions are wired in as proxy
//! integrations, a stage deployment is published, and routes dropped from
//! the declaration are torn down without disturbing routes owned by other
//! declarations sharing the same API.
//!
//! Tests are included in the module files and under `tests/`.

pub mod config;
pub mod constants;
pub mod declaration;
pub mod endpoint;
pub mod error;
pub mod provider;
pub mod reconciler;
pub mod state;

// Re-export the types most callers need
pub use declaration::{Declaration, DeclarationFile, EndpointSpec, Overrides};
pub use endpoint::{Endpoint, HttpMethod};
pub use error::ReconcilerError;
pub use reconciler::{ApplyOutcome, Reconciler};
pub use state::State;
