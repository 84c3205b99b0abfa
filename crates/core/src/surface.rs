use icicle_protocol::{Rect, RenderCommand};

/// Anything the partition view can draw into.
pub trait DrawSurface {
    /// Drawable area in pixels, origin at `(0, 0)`.
    fn window_rect(&self) -> Rect;

    fn submit(&mut self, command: RenderCommand);
}

/// Records commands for later replay (SVG export, tests).
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    width: f64,
    height: f64,
    commands: Vec<RenderCommand>,
}

impl CommandBuffer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl DrawSurface for CommandBuffer {
    fn window_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    fn submit(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }
}
