pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod state;
pub mod thoughts;
pub mod validation;
