//! Shared plumbing for the ndb workspace.
//!
//! Every error type in the workspace records where it was raised through
//! [`ErrorLocation`], and HTTP failures keep their status as a
//! [`HttpStatusCode`] instead of burying it in a message string.

pub mod error;
pub mod http_status;

pub use error::error_location::ErrorLocation;
pub use http_status::HttpStatusCode;
