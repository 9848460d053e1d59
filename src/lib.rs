pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod middleware;
pub mod notifier;
pub mod observability;
pub mod routes;
