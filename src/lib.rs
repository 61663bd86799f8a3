pub mod action;
pub mod app;
pub mod config;
pub mod console;
pub mod event;
pub mod format;
pub mod logging;
pub mod system;
pub mod ui;
