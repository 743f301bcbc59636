pub mod app;
pub mod config;
pub mod line_item_loader;
pub mod logging;
pub mod utils;
