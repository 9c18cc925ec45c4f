pub mod app;
pub mod config;
pub mod event;
pub mod groups;
pub mod resolver;
pub mod restore;
pub mod ui;
pub mod version;
