//! Mock Bedrock: a local stand-in for the Bedrock runtime invocation API.
//!
//! Accepts requests shaped like real `InvokeModel` calls and returns
//! synthetic, schema-correct responses without running any model. Client
//! code can exercise its serialization, status handling and latency
//! tolerance against a fast local endpoint.
//!
//! # Architecture
//!
//! - **Catalog**: read-only table of known model ids and their profiles
//! - **Request**: untyped JSON body with `messages` / `prompt` projection
//! - **Tokens**: four-characters-per-token estimate
//! - **Response**: Claude, Titan or generic body, chosen by model id prefix
//! - **Server**: axum router, CORS middleware and the [`MockServer`] handle

pub mod catalog;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod server;
pub mod tokens;

pub use catalog::{ModelCatalog, ModelProfile};
pub use config::ServerConfig;
pub use error::{MockError, Result};
pub use request::InvocationRequest;
pub use response::InvocationResponse;
pub use server::MockServer;
