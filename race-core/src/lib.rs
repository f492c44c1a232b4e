pub mod clock;
pub mod error;
pub mod game_state;
pub mod referee;
pub mod word_source;

// Re-export main components
pub use clock::*;
pub use error::*;
pub use game_state::*;
pub use referee::*;
pub use word_source::*;
