pub mod builder;
pub mod callback_server;
mod session;
pub mod types;

// Re-export key types for easier access
pub use builder::{ActiveSession, SessionBuilder};
pub use callback_server::{CallbackServer, PushRouter, ServerStatus};
pub use types::{ChannelId, DisplayEvent, PushEvent, SessionConfig};
