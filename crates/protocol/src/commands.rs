use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::types::{Color, Rect};

/// A single, stateless render instruction.
///
/// The partition renderer submits these to a drawing surface. Surfaces
/// consume them in order; each command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Fill the whole drawable area.
    Clear { color: Color },

    /// Draw a filled rectangle in pixel coordinates, optionally outlined.
    ///
    /// The outline runs along the inclusive edge pixels: columns
    /// `x..=x + w` and rows `y..=y + h`.
    DrawRect {
        rect: Rect,
        fill: Color,
        border: Option<Color>,
        label: Option<SharedStr>,
        /// Profile node the rect stands for (for hit-testing / selection).
        node_key: Option<i32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_variant_tag() {
        let cmd = RenderCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, 10.0, 5.0),
            fill: Color::WHITE,
            border: Some(Color::BLACK),
            label: Some("main".into()),
            node_key: Some(3),
        };
        let json = serde_json::to_string(&cmd).unwrap_or_default();
        assert!(json.starts_with("{\"DrawRect\""));
        assert!(json.contains("\"label\":\"main\""));
        let back: Option<RenderCommand> = serde_json::from_str(&json).ok();
        assert_eq!(back, Some(cmd));
    }
}
