pub mod commands;
pub mod config;
pub mod controls;
pub mod engine;
pub mod grading;
pub mod markup;
pub mod question;
pub mod registry;
pub mod render;
pub mod runner;
pub mod state;
pub mod store;
pub mod terminal;
pub mod timer;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
