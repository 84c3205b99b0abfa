pub mod commands;
pub mod shared_str;
pub mod types;

pub use commands::RenderCommand;
pub use shared_str::SharedStr;
pub use types::{Color, Point, Rect};
