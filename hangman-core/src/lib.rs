pub mod chat;
pub mod game;
pub mod rematch;
pub mod words;

// Re-export main components
pub use chat::*;
pub use game::*;
pub use rematch::*;
pub use words::*;
