pub mod app;
pub mod cmd;
pub mod config;
pub mod features;
pub mod kube;
pub mod logging;
pub mod message;
pub mod signal;
pub mod ui;
pub mod util;
pub mod workers;
