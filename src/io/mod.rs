pub mod config_io;
pub mod lock;
pub mod session_io;
pub mod workspace;
