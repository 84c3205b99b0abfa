pub mod database;
pub mod profile;

pub use database::{ChangeKind, DatabaseError, DatabaseKey, ProfileDatabase};
pub use profile::{
    NodeKey, NodeSample, Profile, ProfileError, ProfileKey, ProfileNode, ROOT_NODE_KEY,
};
