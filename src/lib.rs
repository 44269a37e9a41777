pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod idp;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::app;
pub use state::AppState;
