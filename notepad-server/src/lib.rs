pub mod app;
pub mod auth;
pub mod config;
pub mod ctx;
pub mod errors;
pub mod notes;
pub mod shared;
pub mod state;
pub mod users;

pub use app::create_app;
pub use config::config;
pub use errors::{Error, Result};
