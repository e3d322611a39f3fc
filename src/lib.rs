pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod crud;
pub mod error;
pub mod middleware;
pub mod routing;
pub mod server;
pub mod types;
