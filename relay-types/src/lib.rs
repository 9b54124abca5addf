pub mod errors;
pub mod messages;
pub mod player;

// Re-export all types
pub use errors::*;
pub use messages::*;
pub use player::*;
