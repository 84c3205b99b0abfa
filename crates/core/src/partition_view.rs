use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use icicle_protocol::{Point, Rect, RenderCommand};
use thiserror::Error;
use tracing::{debug, warn};

use crate::animation::ViewAnimator;
use crate::config::ViewConfig;
use crate::layout::{Layout, LayoutItem};
use crate::model::{ChangeKind, DatabaseError, DatabaseKey, NodeKey, ProfileDatabase, ProfileKey};
use crate::surface::DrawSurface;
use crate::transform::Transform;
use crate::views::partition::render_partition;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("no profile database attached")]
    Detached,
    #[error("cannot change the profile database")]
    RebindAttempted,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// What `set_active_node` did with the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    /// The key was already active.
    Unchanged,
    /// First focus: jumped straight to `target`.
    Snapped { target: Rect, found: bool },
    /// Zooming from the current view to `target`.
    Animated { target: Rect, found: bool },
}

/// Zoomable partition view of one profile node.
///
/// Borrows the profile database for `'db`; the database must outlive the
/// view and cannot be swapped once attached.
pub struct PartitionView<'db> {
    config: ViewConfig,
    db: Option<&'db ProfileDatabase>,
    active_key: DatabaseKey,
    layout: Layout,
    animator: ViewAnimator,
    /// Set by database listeners, cleared on rebuild.
    stale: Rc<Cell<bool>>,
}

impl<'db> PartitionView<'db> {
    pub fn new(config: ViewConfig) -> Self {
        let animator =
            ViewAnimator::new(Rect::from_corners(0.0, 0.0, 1.0, 1.0)).with_easing(config.easing);
        Self {
            config,
            db: None,
            active_key: DatabaseKey::INVALID,
            layout: Layout::default(),
            animator,
            stale: Rc::new(Cell::new(false)),
        }
    }

    /// Bind the view to its database. Only the first call takes effect.
    pub fn attach_data_source(&mut self, db: &'db ProfileDatabase) -> Result<(), ViewError> {
        if self.db.is_some() {
            warn!("PartitionView: cannot change the profile database");
            return Err(ViewError::RebindAttempted);
        }
        self.db = Some(db);

        for kind in [
            ChangeKind::DataAdded,
            ChangeKind::ProfileAdded,
            ChangeKind::NodesAdded,
        ] {
            let stale = Rc::downgrade(&self.stale);
            db.subscribe(kind, move |_| {
                if let Some(stale) = stale.upgrade() {
                    stale.set(true);
                }
            });
        }
        self.stale.set(true);
        Ok(())
    }

    /// Focus on a node. The first focus snaps; later ones animate from
    /// wherever the view currently is.
    pub fn set_active_node(
        &mut self,
        profile_key: ProfileKey,
        node_key: NodeKey,
    ) -> Result<Activation, ViewError> {
        let new_key = DatabaseKey::new(profile_key, node_key);
        if new_key == self.active_key {
            return Ok(Activation::Unchanged);
        }

        let db = self.db.ok_or(ViewError::Detached)?;
        let profile = db.profile(profile_key)?;
        let first = !self.active_key.is_valid();

        self.active_key = new_key;
        let layout = Layout::build(&profile);
        let (target, found) = self.focus_rect(&layout);
        self.layout = layout;
        self.stale.set(false);

        if first {
            self.animator.set_instant(target);
            debug!(profile_key, node_key, "focus snapped");
            Ok(Activation::Snapped { target, found })
        } else {
            self.animator.transition_to(target, self.config.transition());
            debug!(profile_key, node_key, "focus animating");
            Ok(Activation::Animated { target, found })
        }
    }

    /// Rebuild the layout from the database and move the animation target.
    pub fn update_data(&mut self) -> Result<(), ViewError> {
        self.stale.set(false);
        if !self.active_key.is_valid() {
            return Ok(());
        }

        let db = self.db.ok_or(ViewError::Detached)?;
        let profile = db.profile(self.active_key.profile_key)?;
        let layout = Layout::build(&profile);
        let (target, _) = self.focus_rect(&layout);
        self.animator.retarget(target);
        self.layout = layout;
        Ok(())
    }

    /// Apply pending data changes and advance the animation by `dt`.
    /// Returns `true` when the view should be repainted.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let mut repaint = false;
        if self.stale.get() {
            if let Err(err) = self.update_data() {
                warn!(%err, "failed to refresh partition layout");
            }
            repaint = true;
        }
        self.animator.advance(dt) || repaint
    }

    /// Clear to the background and draw the current view of the layout.
    pub fn render<S: DrawSurface + ?Sized>(&self, surface: &mut S) -> Result<(), ViewError> {
        surface.submit(RenderCommand::Clear {
            color: self.config.background,
        });
        if self.layout.is_empty() {
            return Ok(());
        }

        let db = self.db.ok_or(ViewError::Detached)?;
        let profile = db.profile(self.active_key.profile_key)?;

        let transform = Transform::affine_map(&surface.window_rect(), &self.animator.current());
        if !transform.is_finite() {
            debug!(rect = ?self.animator.current(), "degenerate view rect; nothing drawn");
            return Ok(());
        }
        render_partition(surface, &transform, &self.layout, &profile, self.config.outline);
        Ok(())
    }

    /// The call cell painted under `point` in a window of size `window`.
    pub fn node_at(&self, point: Point, window: &Rect) -> Option<&LayoutItem> {
        let inverse = Transform::affine_map(window, &self.animator.current()).inverse()?;
        let p = inverse.map_point(point);
        if !self.layout.full_extent().contains(p) {
            return None;
        }

        let columns = self.layout.columns();

        let col = (p.x.floor() as usize).min(columns.len().checked_sub(1)?);
        let hit = columns[col]
            .iter()
            .find(|item| item.span_start <= p.y && p.y <= item.span_end)?;
        if !hit.exclusive {
            return Some(hit);
        }

        // Self time is painted by the node's own call cell further left.
        columns[..col]
            .iter()
            .rev()
            .flatten()
            .find(|item| !item.exclusive && item.node_key == hit.node_key)
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn active_key(&self) -> DatabaseKey {
        self.active_key
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Data-space rect currently shown.
    pub fn current_rect(&self) -> Rect {
        self.animator.current()
    }

    /// Data-space rect the view is heading to.
    pub fn target_rect(&self) -> Rect {
        self.animator.end()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    fn focus_rect(&self, layout: &Layout) -> (Rect, bool) {
        match self.config.focus.locate(layout, self.active_key.node_key) {
            Ok(rect) => (rect, true),
            Err(err) => {
                warn!(%err, "cannot focus active node; showing the whole layout");
                (err.fallback(), false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeSample, Profile, ROOT_NODE_KEY};
    use crate::surface::CommandBuffer;

    fn sample(inclusive: u64, exclusive: u64) -> NodeSample {
        NodeSample {
            timestamp_ns: 0,
            cumulative_call_count: 1,
            cumulative_inclusive_duration_ns: inclusive,
            cumulative_exclusive_duration_ns: exclusive,
        }
    }

    /// root(100/20) -> work(80/40) -> leaf(40/40)
    fn database() -> (ProfileDatabase, ProfileKey, NodeKey, NodeKey) {
        let db = ProfileDatabase::new();
        let key = db.add_profile(Profile::new("root"));
        let nodes = db
            .add_nodes(key, [vec!["work"], vec!["work", "leaf"]])
            .unwrap();
        db.add_data(
            key,
            [
                (ROOT_NODE_KEY, sample(100, 20)),
                (nodes[0], sample(80, 40)),
                (nodes[1], sample(40, 40)),
            ],
        )
        .unwrap();
        (db, key, nodes[0], nodes[1])
    }

    #[test]
    fn requires_database() {
        let mut view = PartitionView::new(ViewConfig::default());
        assert_eq!(view.set_active_node(0, 0), Err(ViewError::Detached));
        assert!(!view.active_key().is_valid());
    }

    #[test]
    fn second_attach_is_rejected() {
        let (db, key, _, _) = database();
        let other = ProfileDatabase::new();
        let mut view = PartitionView::new(ViewConfig::default());
        view.attach_data_source(&db).unwrap();
        assert_eq!(
            view.attach_data_source(&other),
            Err(ViewError::RebindAttempted)
        );
        // Still bound to the first database.
        assert!(matches!(
            view.set_active_node(key, ROOT_NODE_KEY),
            Ok(Activation::Snapped { found: true, .. })
        ));
    }

    #[test]
    fn first_focus_snaps_then_animates() {
        let (db, key, work, leaf) = database();
        let mut view = PartitionView::new(ViewConfig::default());
        view.attach_data_source(&db).unwrap();

        let Ok(Activation::Snapped { target: first, .. }) = view.set_active_node(key, work) else {
            panic!("first activation should snap");
        };
        assert!(!view.is_animating());
        assert_eq!(view.current_rect(), first);

        let Ok(Activation::Animated { target: second, found }) = view.set_active_node(key, leaf)
        else {
            panic!("second activation should animate");
        };
        assert!(found);
        assert!(view.is_animating());
        assert_eq!(view.current_rect(), first);
        assert_eq!(view.target_rect(), second);

        assert!(view.tick(Duration::from_millis(250)));
        assert_ne!(view.current_rect(), first);
        assert!(view.tick(Duration::from_millis(250)));
        assert_eq!(view.current_rect(), second);
        assert!(!view.tick(Duration::from_millis(16)));
    }

    #[test]
    fn same_key_is_a_no_op() {
        let (db, key, work, _) = database();
        let mut view = PartitionView::new(ViewConfig::default());
        view.attach_data_source(&db).unwrap();
        view.set_active_node(key, work).unwrap();
        assert_eq!(view.set_active_node(key, work), Ok(Activation::Unchanged));
        assert!(!view.is_animating());
    }

    #[test]
    fn unknown_node_targets_full_extent() {
        let (db, key, work, _) = database();
        let mut view = PartitionView::new(ViewConfig::default());
        view.attach_data_source(&db).unwrap();
        view.set_active_node(key, work).unwrap();

        let activation = view.set_active_node(key, 404).unwrap();
        assert_eq!(
            activation,
            Activation::Animated {
                target: Rect::from_corners(0.0, 0.0, 3.0, 1.0),
                found: false,
            }
        );
    }

    #[test]
    fn unknown_profile_leaves_state_alone() {
        let (db, key, work, _) = database();
        let mut view = PartitionView::new(ViewConfig::default());
        view.attach_data_source(&db).unwrap();
        view.set_active_node(key, work).unwrap();

        assert_eq!(
            view.set_active_node(9, 0),
            Err(ViewError::Database(DatabaseError::UnknownProfile(9)))
        );
        assert_eq!(view.active_key(), DatabaseKey::new(key, work));
    }

    #[test]
    fn data_changes_rebuild_on_tick() {
        let (db, key, work, _) = database();
        let mut view = PartitionView::new(ViewConfig::default());
        view.attach_data_source(&db).unwrap();
        view.set_active_node(key, work).unwrap();
        assert!(!view.tick(Duration::ZERO));
        assert_eq!(view.layout().column_count(), 3);

        let deeper = db
            .add_nodes(key, [vec!["work", "leaf", "deeper"]])
            .unwrap()[0];
        let leaf = view.layout().columns()[2][2].node_key;
        db.add_data(
            key,
            [
                (ROOT_NODE_KEY, sample(200, 40)),
                (work, sample(160, 80)),
                (leaf, sample(80, 40)),
                (deeper, sample(40, 40)),
            ],
        )
        .unwrap();

        assert!(view.tick(Duration::ZERO));
        assert_eq!(view.layout().column_count(), 4);
        // Idle view follows the data without animating.
        assert!(!view.is_animating());
    }

    #[test]
    fn render_clears_then_draws_cells() {
        let (db, key, work, _) = database();
        let mut view = PartitionView::new(ViewConfig::default());
        let mut buf = CommandBuffer::new(300.0, 100.0);

        view.render(&mut buf).unwrap();
        assert_eq!(
            buf.commands(),
            &[RenderCommand::Clear {
                color: ViewConfig::default().background
            }]
        );

        view.attach_data_source(&db).unwrap();
        view.set_active_node(key, work).unwrap();
        buf.clear();
        view.render(&mut buf).unwrap();
        assert!(matches!(buf.commands()[0], RenderCommand::Clear { .. }));
        // root, work and leaf cells; self time is not painted.
        assert_eq!(buf.commands().len(), 4);
    }

    #[test]
    fn hit_testing_maps_back_to_cells() {
        let (db, key, work, leaf) = database();
        let mut view = PartitionView::new(ViewConfig::default());
        view.attach_data_source(&db).unwrap();
        view.set_active_node(key, ROOT_NODE_KEY).unwrap();

        // Full extent [0, 3] × [0, 1] on a 300×100 window: 100px per column.
        let window = Rect::new(0.0, 0.0, 300.0, 100.0);
        let at = |x, y| view.node_at(Point::new(x, y), &window).map(|i| i.node_key);
        assert_eq!(at(50.0, 50.0), Some(ROOT_NODE_KEY));
        assert_eq!(at(150.0, 50.0), Some(work));
        assert_eq!(at(250.0, 80.0), Some(leaf));
        // Root and work self time fall back to their call cells.
        assert_eq!(at(150.0, 10.0), Some(ROOT_NODE_KEY));
        assert_eq!(at(250.0, 40.0), Some(work));
        assert_eq!(at(50.0, 150.0), None);
    }

    #[test]
    fn node_without_duration_shows_whole_layout() {
        let (db, key, _, _) = database();
        let idle = db.add_nodes(key, [vec!["idle"]]).unwrap()[0];
        let mut view = PartitionView::new(ViewConfig::default());
        view.attach_data_source(&db).unwrap();

        assert_eq!(
            view.set_active_node(key, idle),
            Ok(Activation::Snapped {
                target: Rect::from_corners(0.0, 0.0, 3.0, 1.0),
                found: false,
            })
        );

        let mut buf = CommandBuffer::new(300.0, 100.0);
        view.render(&mut buf).unwrap();
        let cells = buf
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawRect { .. }))
            .count();
        assert_eq!(cells, 3);
    }
}
