//! Request handler module
//!
//! Routing dispatch plus the home page and prediction endpoints.

mod home;
mod predict;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
