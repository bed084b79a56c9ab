pub mod actions;
pub mod config;
pub mod handlers;
pub mod models;
pub mod search;
pub mod services;
pub mod startup;
pub mod validation;
