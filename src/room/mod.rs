// Public API - what other modules can use
pub use handlers::{create_room, get_room, join_room, leave_room, list_rooms, update_room, user_in_room};
pub use service::RoomService;

// Internal modules
pub mod generators;
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
