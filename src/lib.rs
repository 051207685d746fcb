pub mod addresses;
pub mod auth;
pub mod carrier;
pub mod config;
pub mod error;
pub mod models;
pub mod payload;
pub mod server;
pub mod workflow;
