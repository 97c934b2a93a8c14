// converse-core/src/lib.rs

//! Load a JSON conversation payload, send it to the Bedrock Converse API, and
//! render the reply.

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod payload;
pub mod report;
pub mod signing;
pub mod utils;

pub use api::{ConverseClient, build_request_body};
pub use config::{Auth, ClientConfig};
pub use errors::{ConverseError, ErrorCategory, ServiceError, ServiceErrorKind};
pub use models::payload::Payload;
pub use models::response::ConverseResponse;
pub use payload::{DEFAULT_PAYLOAD_FILE, list_json_files, load_payload};
