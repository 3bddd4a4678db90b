pub mod chat;
pub mod client;
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod types;
pub mod ui;
pub mod views;
