mod app;
mod renderer;

pub use app::PartitionApp;
pub use renderer::PainterSurface;
