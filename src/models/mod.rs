//! Models Module
//!
//! Domain value types exchanged with the host CMS: content nodes, incoming
//! requests, and materialized routed requests.

mod content;
mod request;

pub use content::ContentNode;
pub use request::{IncomingRequest, RoutedRequest};
