pub mod app;
pub mod builder;
pub mod config;
pub mod models;
pub mod opt;
