use thiserror::Error;

use crate::model::Profile;

#[derive(Debug, Error)]
pub enum JsonParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("profile has no root node")]
    MissingRoot,
    #[error("node {parent} lists unknown child {child}")]
    DanglingChild { parent: i32, child: i32 },
}

/// Parse the native snapshot format: a JSON rendering of [`Profile`].
///
/// ```json
/// {
///   "name": "planner",
///   "nodes": {
///     "0": { "node_key": 0, "name": "planner", "parent_key": null,
///            "child_keys": [1], "samples": [ ... ] },
///     "1": { ... }
///   }
/// }
/// ```
pub fn parse_json(data: &[u8]) -> Result<Profile, JsonParseError> {
    let profile: Profile = serde_json::from_slice(data)?;
    if profile.root_node().is_none() {
        return Err(JsonParseError::MissingRoot);
    }
    for node in profile.nodes.values() {
        if let Some(&child) = node.child_keys.iter().find(|k| profile.node(**k).is_none()) {
            return Err(JsonParseError::DanglingChild {
                parent: node.node_key,
                child,
            });
        }
    }
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeSample, ROOT_NODE_KEY};

    #[test]
    fn snapshot_round_trip() {
        let mut profile = Profile::new("planner");
        let search = profile.ensure_path(["search"]);
        profile
            .push_sample(
                ROOT_NODE_KEY,
                NodeSample {
                    timestamp_ns: 5,
                    cumulative_call_count: 1,
                    cumulative_inclusive_duration_ns: 100,
                    cumulative_exclusive_duration_ns: 40,
                },
            )
            .unwrap();
        let json = serde_json::to_vec(&profile).unwrap();
        let back = parse_json(&json).unwrap();
        assert_eq!(back, profile);
        assert_eq!(back.node(search).unwrap().name, "search");
    }

    #[test]
    fn samples_may_be_omitted() {
        let json = br#"{"name":"p","nodes":{"0":{"node_key":0,"name":"p","parent_key":null,"child_keys":[]}}}"#;
        let profile = parse_json(json).unwrap();
        assert!(profile.root_node().unwrap().samples.is_empty());
    }

    #[test]
    fn rejects_missing_root_and_dangling_children() {
        let no_root = br#"{"name":"p","nodes":{}}"#;
        assert!(matches!(parse_json(no_root), Err(JsonParseError::MissingRoot)));

        let dangling = br#"{"name":"p","nodes":{"0":{"node_key":0,"name":"p","parent_key":null,"child_keys":[3]}}}"#;
        assert!(matches!(
            parse_json(dangling),
            Err(JsonParseError::DanglingChild { parent: 0, child: 3 })
        ));
    }
}
