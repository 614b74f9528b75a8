pub mod cli;
pub mod config;
pub mod database;
pub mod fixtures;
pub mod rules;
pub mod services;
