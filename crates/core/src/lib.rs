//! Icicle (partition) view of hierarchical profiles: the profile store,
//! layout construction, focus/zoom animation and the render pass that turns
//! a layout into `RenderCommand`s for any host surface.

pub mod animation;
pub mod config;
pub mod focus;
pub mod layout;
pub mod model;
pub mod parsers;
pub mod partition_view;
pub mod surface;
pub mod svg;
pub mod transform;
pub mod views;

pub use config::ViewConfig;
pub use layout::{Layout, LayoutItem};
pub use partition_view::{Activation, PartitionView, ViewError};
pub use surface::{CommandBuffer, DrawSurface};
