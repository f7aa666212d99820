//! Terminal front end for the price tracker: config, CLI, dashboard loop and rendering.
pub mod cli;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod effects;
pub mod render;
