//! Request handler module
//!
//! Routes requests to the streaming, upload and page handlers.

mod home;
pub mod router;
mod stream;
mod upload;

// Re-export main entry point
pub use router::handle_request;
