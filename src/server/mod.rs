//! HTTP server: state, handlers and router

pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
