pub mod app;
pub mod auth;
pub mod dto;
pub mod error;
pub mod http_routes;
pub mod state;
