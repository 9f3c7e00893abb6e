//! Request handler module
//!
//! Responsible for request routing dispatch. Route handlers themselves live in `api`.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
