mod app;
mod auth;
mod effects;
pub mod logging;
mod persistence;
mod ui;

pub use app::{run_app, AppConfig};
