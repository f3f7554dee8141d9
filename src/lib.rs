pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod events;
pub mod global;
pub mod hub;
pub mod recall;
pub mod recording;
pub mod zoom;
