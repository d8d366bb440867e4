pub mod agent;
pub mod config;
pub mod errors;
pub mod logging;
pub mod naming;
pub mod orchestrator;
pub mod phase;
pub mod prompt;
pub mod ui;
pub mod workspace;
