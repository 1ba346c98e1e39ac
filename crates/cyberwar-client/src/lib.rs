pub mod app;
pub mod config;
pub mod context;
pub mod minigame;
pub mod reconcile;
pub mod render;
pub mod replay;
pub mod runtime;
pub mod scheduler;

pub use app::Client;
pub use config::ClientConfig;
pub use context::ClientContext;
pub use render::{RenderSink, ViewUpdate};
