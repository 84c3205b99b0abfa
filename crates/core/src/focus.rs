use icicle_protocol::Rect;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::Layout;
use crate::model::NodeKey;

#[derive(Debug, Error, PartialEq)]
pub enum LocateError {
    #[error("node {node_key} is not in the layout")]
    NodeNotFound { node_key: NodeKey, fallback: Rect },
    #[error("node {node_key} has no duration to zoom to")]
    EmptySpan { node_key: NodeKey, fallback: Rect },
}

impl LocateError {
    /// Region to show instead: the whole layout.
    pub fn fallback(&self) -> Rect {
        match self {
            LocateError::NodeNotFound { fallback, .. }
            | LocateError::EmptySpan { fallback, .. } => *fallback,
        }
    }
}

/// Spans at or below this are treated as empty.
const MIN_SPAN: f64 = 1e-12;

/// Finds the data-space region the view should zoom to for a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locator {
    /// Vertical padding as a fraction of the node's span.
    pub margin: f64,
    /// How many columns to the left of the node stay in view.
    pub column_lead: f64,
}

impl Default for Locator {
    fn default() -> Self {
        Self {
            margin: 0.05,
            column_lead: 0.2,
        }
    }
}

impl Locator {
    /// Region around the first item (column-major, then row order) whose
    /// key is `node_key`. The region reaches to the last column and is
    /// padded vertically, clamped to `[0, 1]`. A node whose span has no
    /// length would give a zero-height region, so it gets the whole layout.
    pub fn locate(&self, layout: &Layout, node_key: NodeKey) -> Result<Rect, LocateError> {
        // Linear scan; layouts are small enough that an index isn't worth keeping.
        let (col, _, item) = layout
            .items()
            .find(|(_, _, item)| item.node_key == node_key)
            .ok_or_else(|| LocateError::NodeNotFound {
                node_key,
                fallback: layout.full_extent(),
            })?;

        if item.span() <= MIN_SPAN {
            return Err(LocateError::EmptySpan {
                node_key,
                fallback: layout.full_extent(),
            });
        }

        let left = (col as f64 - self.column_lead).max(0.0);
        let pad = self.margin * item.span();
        let top = (item.span_start - pad).max(0.0);
        let bottom = (item.span_end + pad).min(1.0);

        Ok(Rect::from_corners(
            left,
            top,
            layout.column_count() as f64,
            bottom,
        ))
    }
}

/// [`Locator::locate`] with the default margin and column lead.
pub fn locate(layout: &Layout, node_key: NodeKey) -> Result<Rect, LocateError> {
    Locator::default().locate(layout, node_key)
}
