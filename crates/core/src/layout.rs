//! Partition ("icicle") layout: one column per tree depth, each column a
//! sequence of spans normalized to the root's inclusive duration.

use icicle_protocol::Rect;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{NodeKey, Profile, ProfileNode};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("profile has no valid root node")]
    InvalidRoot,
    #[error("profile has no samples yet")]
    EmptyProfile,
    #[error("profile root has zero total duration")]
    ZeroDuration,
}

/// One span in a layout column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutItem {
    pub node_key: NodeKey,
    /// Synthetic "self time" segment carried over from the parent column.
    pub exclusive: bool,
    pub span_start: f64,
    pub span_end: f64,
}

impl LayoutItem {
    pub fn span(&self) -> f64 {
        self.span_end - self.span_start
    }
}

/// Immutable result of laying out one profile snapshot.
///
/// Column 0 holds the root alone, spanning `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    columns: Vec<Vec<LayoutItem>>,
}

impl Layout {
    /// Lay out a profile, falling back to an empty layout when there is
    /// nothing to draw.
    pub fn build(profile: &Profile) -> Layout {
        match try_build(profile) {
            Ok(layout) => layout,
            Err(LayoutError::InvalidRoot) => {
                warn!(profile = %profile.name, "profile returned invalid root node");
                Layout::default()
            }
            Err(err) => {
                debug!(profile = %profile.name, %err, "nothing to lay out");
                Layout::default()
            }
        }
    }

    pub fn columns(&self) -> &[Vec<LayoutItem>] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column-major walk: `(column, row, item)`.
    pub fn items(&self) -> impl Iterator<Item = (usize, usize, &LayoutItem)> {
        self.columns.iter().enumerate().flat_map(|(col, items)| {
            items
                .iter()
                .enumerate()
                .map(move |(row, item)| (col, row, item))
        })
    }

    /// `[0, column_count] × [0, 1]`.
    pub fn full_extent(&self) -> Rect {
        Rect::from_corners(0.0, 0.0, self.column_count() as f64, 1.0)
    }

    /// Data-space rect of an item: it reaches from its own column to the
    /// right edge of the layout.
    pub fn cell_rect(&self, column: usize, item: &LayoutItem) -> Rect {
        Rect::from_corners(
            column as f64,
            item.span_start,
            self.column_count() as f64,
            item.span_end,
        )
    }
}

/// Breadth-first partition of `profile`.
///
/// Every parent item hands its column's cursor an exclusive segment for its
/// own self time, then (unless it is itself exclusive) one segment per
/// child sized by the child's inclusive time. Columns are added while some
/// newly placed child still has children.
pub fn try_build(profile: &Profile) -> Result<Layout, LayoutError> {
    let root = profile.root_node().ok_or(LayoutError::InvalidRoot)?;
    let latest = root.latest().ok_or(LayoutError::EmptyProfile)?;
    if latest.cumulative_inclusive_duration_ns == 0 {
        return Err(LayoutError::ZeroDuration);
    }
    let time_scale = latest.cumulative_inclusive_duration_ns as f64;

    let mut columns = vec![vec![LayoutItem {
        node_key: root.node_key,
        exclusive: false,
        span_start: 0.0,
        span_end: 1.0,
    }]];

    let mut keep_going = root.has_children();
    while keep_going {
        keep_going = false;

        let mut next = Vec::new();
        let mut cursor = 0.0;
        let Some(parents) = columns.last() else {
            break;
        };

        for parent_item in parents {
            let Some(parent_node) = profile.node(parent_item.node_key) else {
                warn!(node_key = parent_item.node_key, "layout parent vanished");
                continue;
            };

            let span_end = cursor + parent_node.exclusive_ns() as f64 / time_scale;
            next.push(LayoutItem {
                node_key: parent_item.node_key,
                exclusive: true,
                span_start: cursor,
                span_end,
            });
            cursor = span_end;

            // Children of an exclusive item were placed by its inclusive twin.
            if parent_item.exclusive {
                continue;
            }

            for child in children_of(profile, parent_node) {
                let span_end = cursor + child.inclusive_ns() as f64 / time_scale;
                next.push(LayoutItem {
                    node_key: child.node_key,
                    exclusive: false,
                    span_start: cursor,
                    span_end,
                });
                cursor = span_end;
                keep_going |= child.has_children();
            }
        }

        columns.push(next);
    }

    debug!(
        profile = %profile.name,
        columns = columns.len(),
        items = columns.iter().map(Vec::len).sum::<usize>(),
        "layout built"
    );
    Ok(Layout { columns })
}

fn children_of<'p>(
    profile: &'p Profile,
    node: &'p ProfileNode,
) -> impl Iterator<Item = &'p ProfileNode> + 'p {
    node.child_keys.iter().filter_map(move |key| {
        let child = profile.node(*key);
        if child.is_none() {
            warn!(parent = node.node_key, child = *key, "child key does not resolve");
        }
        child
    })
}
