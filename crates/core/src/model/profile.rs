use std::collections::BTreeMap;

use icicle_protocol::SharedStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type NodeKey = i32;
pub type ProfileKey = i32;

/// Key of the root node in every profile.
pub const ROOT_NODE_KEY: NodeKey = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeKey),
    #[error("sample for node {node_key} decreases a cumulative counter")]
    NonMonotonicSample { node_key: NodeKey },
}

/// One observation of a node's cumulative counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSample {
    pub timestamp_ns: u64,
    #[serde(default)]
    pub cumulative_call_count: u64,
    /// Time spent in the node including all descendants.
    pub cumulative_inclusive_duration_ns: u64,
    /// Time spent in the node itself ("self time").
    pub cumulative_exclusive_duration_ns: u64,
}

impl NodeSample {
    /// Whether `next` can follow `self` without any counter going backwards.
    fn precedes(&self, next: &NodeSample) -> bool {
        next.cumulative_call_count >= self.cumulative_call_count
            && next.cumulative_inclusive_duration_ns >= self.cumulative_inclusive_duration_ns
            && next.cumulative_exclusive_duration_ns >= self.cumulative_exclusive_duration_ns
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileNode {
    pub node_key: NodeKey,
    pub name: SharedStr,
    pub parent_key: Option<NodeKey>,
    /// Children in insertion order, which is also traversal order.
    pub child_keys: Vec<NodeKey>,
    #[serde(default)]
    pub samples: Vec<NodeSample>,
}

impl ProfileNode {
    pub fn has_children(&self) -> bool {
        !self.child_keys.is_empty()
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<&NodeSample> {
        self.samples.last()
    }

    pub fn inclusive_ns(&self) -> u64 {
        self.latest()
            .map_or(0, |s| s.cumulative_inclusive_duration_ns)
    }

    pub fn exclusive_ns(&self) -> u64 {
        self.latest()
            .map_or(0, |s| s.cumulative_exclusive_duration_ns)
    }
}

/// A rooted call tree keyed by `NodeKey`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: SharedStr,
    pub nodes: BTreeMap<NodeKey, ProfileNode>,
}

impl Profile {
    /// Create a profile holding only its root node, named after the profile.
    pub fn new(name: impl Into<SharedStr>) -> Self {
        let name = name.into();
        let root = ProfileNode {
            node_key: ROOT_NODE_KEY,
            name: name.clone(),
            parent_key: None,
            child_keys: Vec::new(),
            samples: Vec::new(),
        };
        Self {
            name,
            nodes: BTreeMap::from([(ROOT_NODE_KEY, root)]),
        }
    }

    pub fn root_node(&self) -> Option<&ProfileNode> {
        self.nodes.get(&ROOT_NODE_KEY)
    }

    pub fn node(&self, key: NodeKey) -> Option<&ProfileNode> {
        self.nodes.get(&key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root inclusive duration of the most recent sample, if any.
    pub fn total_duration_ns(&self) -> Option<u64> {
        self.root_node()
            .and_then(ProfileNode::latest)
            .map(|s| s.cumulative_inclusive_duration_ns)
    }

    /// Find or create the chain of named nodes below the root and return
    /// the key of the last one. An empty path names the root.
    pub fn ensure_path<'a>(&mut self, path: impl IntoIterator<Item = &'a str>) -> NodeKey {
        let mut current = ROOT_NODE_KEY;
        for segment in path {
            current = match self.child_named(current, segment) {
                Some(key) => key,
                None => self.insert_child(current, segment),
            };
        }
        current
    }

    /// Append a sample to a node. Cumulative counters may not decrease.
    pub fn push_sample(&mut self, node_key: NodeKey, sample: NodeSample) -> Result<(), ProfileError> {
        let node = self
            .nodes
            .get_mut(&node_key)
            .ok_or(ProfileError::UnknownNode(node_key))?;
        if let Some(last) = node.latest()
            && !last.precedes(&sample)
        {
            return Err(ProfileError::NonMonotonicSample { node_key });
        }
        node.samples.push(sample);
        Ok(())
    }

    /// Names from the root down to `key`, root first.
    pub fn path_of(&self, key: NodeKey) -> Vec<SharedStr> {
        let mut names = Vec::new();
        let mut cursor = self.node(key);
        while let Some(node) = cursor {
            names.push(node.name.clone());
            cursor = node.parent_key.and_then(|p| self.node(p));
        }
        names.reverse();
        names
    }

    fn child_named(&self, parent: NodeKey, name: &str) -> Option<NodeKey> {
        let parent = self.node(parent)?;
        parent
            .child_keys
            .iter()
            .copied()
            .find(|k| self.node(*k).is_some_and(|n| n.name == name))
    }

    fn insert_child(&mut self, parent: NodeKey, name: &str) -> NodeKey {
        let key = self.nodes.keys().next_back().map_or(ROOT_NODE_KEY, |k| k + 1);
        self.nodes.insert(
            key,
            ProfileNode {
                node_key: key,
                name: name.into(),
                parent_key: Some(parent),
                child_keys: Vec::new(),
                samples: Vec::new(),
            },
        );
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.child_keys.push(key);
        }
        key
    }
}
