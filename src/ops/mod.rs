pub mod access;
pub mod check;
pub mod clean;
pub mod detail;
pub mod drag;
pub mod notify;
pub mod projection;
pub mod reduce;
pub mod search;
pub mod store;
