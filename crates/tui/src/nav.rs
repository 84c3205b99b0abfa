use icicle_core::model::{NodeKey, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Parent,
    FirstChild,
    PrevSibling,
    NextSibling,
}

/// The node one step from `key` in the call tree, if there is one.
pub fn step(profile: &Profile, key: NodeKey, dir: Move) -> Option<NodeKey> {
    let node = profile.node(key)?;
    match dir {
        Move::Parent => node.parent_key,
        Move::FirstChild => node.child_keys.first().copied(),
        Move::PrevSibling | Move::NextSibling => {
            let siblings = &profile.node(node.parent_key?)?.child_keys;
            let at = siblings.iter().position(|k| *k == key)?;
            let next = if dir == Move::NextSibling {
                at.checked_add(1)?
            } else {
                at.checked_sub(1)?
            };
            siblings.get(next).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icicle_core::model::ROOT_NODE_KEY;

    #[test]
    fn walks_the_tree() {
        let mut profile = Profile::new("p");
        let a = profile.ensure_path(["a"]);
        let b = profile.ensure_path(["b"]);
        let a1 = profile.ensure_path(["a", "1"]);

        assert_eq!(step(&profile, ROOT_NODE_KEY, Move::Parent), None);
        assert_eq!(step(&profile, ROOT_NODE_KEY, Move::FirstChild), Some(a));
        assert_eq!(step(&profile, a, Move::NextSibling), Some(b));
        assert_eq!(step(&profile, b, Move::NextSibling), None);
        assert_eq!(step(&profile, b, Move::PrevSibling), Some(a));
        assert_eq!(step(&profile, a, Move::PrevSibling), None);
        assert_eq!(step(&profile, a1, Move::Parent), Some(a));
        assert_eq!(step(&profile, ROOT_NODE_KEY, Move::NextSibling), None);
        assert_eq!(step(&profile, 42, Move::Parent), None);
    }
}
