pub mod kube;
mod render;
mod tick;
mod user_input;

pub use kube::KubeWorker;
pub use render::*;
pub use tick::*;
pub use user_input::*;
