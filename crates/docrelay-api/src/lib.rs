//! Docrelay API
//!
//! HTTP transport for the ingestion coordinator. Normalizes the binary and
//! multipart submission forms into one `Submission`, maps every coordinator
//! outcome onto a machine-readable response, and wires up the process
//! (config, telemetry, backends, orphan sweeper, graceful shutdown).

pub mod api_doc;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use routes::router;
pub use state::AppState;
