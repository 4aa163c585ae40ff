pub mod board;
pub mod config;
pub mod conversation;
pub mod member;
pub mod notification;
pub mod organization;
pub mod project;
pub mod snapshot;
pub mod task;

pub use board::*;
pub use config::*;
pub use conversation::*;
pub use member::*;
pub use notification::*;
pub use organization::*;
pub use project::*;
pub use snapshot::*;
pub use task::*;
