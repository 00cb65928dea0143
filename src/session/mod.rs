// Public API - what other modules can use
pub use cleanup_task::start_cleanup_task;
pub use context::{SessionContext, SessionHandle};
pub use middleware::session_layer;
pub use types::SessionKey;

// Internal modules
mod cleanup_task;
pub mod context;
mod middleware;
pub mod models;
pub mod repository;
pub mod service;
mod token;
mod types;
