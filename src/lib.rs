// Library surface for the binary, headless/integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod game;
pub mod history;
pub mod logging;
pub mod runtime;
pub mod ui;
