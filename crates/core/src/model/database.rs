use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::profile::{NodeKey, NodeSample, Profile, ProfileError, ProfileKey};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("profile {0} is not available")]
    UnknownProfile(ProfileKey),
    #[error("profile {profile_key}: {source}")]
    Profile {
        profile_key: ProfileKey,
        #[source]
        source: ProfileError,
    },
}

/// Identifies one node of one profile.
///
/// `DatabaseKey::INVALID` (the default) means "nothing selected".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatabaseKey {
    pub profile_key: ProfileKey,
    pub node_key: NodeKey,
}

impl DatabaseKey {
    pub const INVALID: DatabaseKey = DatabaseKey {
        profile_key: -1,
        node_key: -1,
    };

    pub fn new(profile_key: ProfileKey, node_key: NodeKey) -> Self {
        Self {
            profile_key,
            node_key,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.profile_key >= 0 && self.node_key >= 0
    }
}

impl Default for DatabaseKey {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Category of a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    DataAdded,
    ProfileAdded,
    NodesAdded,
}

type Listener = Box<dyn Fn(ProfileKey)>;

/// In-memory store of profiles with change notification.
///
/// Single-threaded: mutation goes through `&self` so that views can keep a
/// shared reference to the store while the host keeps feeding it data.
/// Listeners run after the mutation has released its borrow, so they may
/// read the store but must not subscribe from inside a notification.
#[derive(Default)]
pub struct ProfileDatabase {
    profiles: RefCell<BTreeMap<ProfileKey, Profile>>,
    listeners: RefCell<Vec<(ChangeKind, Listener)>>,
    next_key: Cell<ProfileKey>,
}

impl ProfileDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a profile under a fresh key.
    pub fn add_profile(&self, profile: Profile) -> ProfileKey {
        let key = self.next_key.get();
        self.next_key.set(key + 1);
        debug!(profile_key = key, name = %profile.name, nodes = profile.len(), "profile added");
        self.profiles.borrow_mut().insert(key, profile);
        self.notify(ChangeKind::ProfileAdded, key);
        key
    }

    /// Create (or find) one node per path, returning their keys in order.
    pub fn add_nodes<'a, P>(
        &self,
        profile_key: ProfileKey,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<Vec<NodeKey>, DatabaseError>
    where
        P: IntoIterator<Item = &'a str>,
    {
        let keys = {
            let mut profiles = self.profiles.borrow_mut();
            let profile = profiles
                .get_mut(&profile_key)
                .ok_or(DatabaseError::UnknownProfile(profile_key))?;
            paths
                .into_iter()
                .map(|path| profile.ensure_path(path))
                .collect::<Vec<_>>()
        };
        self.notify(ChangeKind::NodesAdded, profile_key);
        Ok(keys)
    }

    /// Append samples. Stops at the first rejected sample; samples before
    /// it stay recorded and listeners are still told about them.
    pub fn add_data(
        &self,
        profile_key: ProfileKey,
        samples: impl IntoIterator<Item = (NodeKey, NodeSample)>,
    ) -> Result<(), DatabaseError> {
        let result = {
            let mut profiles = self.profiles.borrow_mut();
            let profile = profiles
                .get_mut(&profile_key)
                .ok_or(DatabaseError::UnknownProfile(profile_key))?;
            samples
                .into_iter()
                .try_for_each(|(node_key, sample)| profile.push_sample(node_key, sample))
                .map_err(|source| DatabaseError::Profile {
                    profile_key,
                    source,
                })
        };
        self.notify(ChangeKind::DataAdded, profile_key);
        result
    }

    pub fn profile(&self, key: ProfileKey) -> Result<Ref<'_, Profile>, DatabaseError> {
        Ref::filter_map(self.profiles.borrow(), |profiles| profiles.get(&key))
            .map_err(|_| DatabaseError::UnknownProfile(key))
    }

    pub fn profile_keys(&self) -> Vec<ProfileKey> {
        self.profiles.borrow().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.borrow().is_empty()
    }

    /// Register a callback for one category of change.
    pub fn subscribe(&self, kind: ChangeKind, listener: impl Fn(ProfileKey) + 'static) {
        self.listeners.borrow_mut().push((kind, Box::new(listener)));
    }

    fn notify(&self, kind: ChangeKind, profile_key: ProfileKey) {
        for (_, listener) in self.listeners.borrow().iter().filter(|(k, _)| *k == kind) {
            listener(profile_key);
        }
    }
}

impl std::fmt::Debug for ProfileDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileDatabase")
            .field("profiles", &self.profile_keys())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
