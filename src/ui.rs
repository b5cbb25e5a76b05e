mod console;
pub mod widget;

pub use console::*;
