pub mod connection;
pub mod messages;
pub mod score;

// Re-export all types
pub use connection::*;
pub use messages::*;
pub use score::*;
