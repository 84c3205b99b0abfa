use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::{NodeKey, NodeSample, Profile, ROOT_NODE_KEY};

#[derive(Debug, Error)]
pub enum CollapsedParseError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("no valid stack lines found")]
    Empty,
    #[error("line {line}: invalid sample count {count:?}")]
    InvalidCount { line: usize, count: String },
    #[error("line {line}: sample counts overflow")]
    Overflow { line: usize },
}

#[derive(Default)]
struct Totals {
    inclusive: u64,
    exclusive: u64,
}

/// Parse Brendan Gregg's collapsed/folded stack format into a call tree.
///
/// Each line has the format: `stack_frame;stack_frame;... count`
/// where frames are separated by `;` and the count is the last whitespace-separated token.
/// The count is added to the inclusive time of every frame on the stack and
/// to the exclusive time of the last one; the profile root holds the total.
/// Fractional counts are rounded to the nearest whole weight.
///
/// Used by: `perf script | stackcollapse-perf.pl`, dtrace, FlameGraph tools.
pub fn parse_collapsed(data: &[u8], name: &str) -> Result<Profile, CollapsedParseError> {
    let text = std::str::from_utf8(data)?;
    let mut profile = Profile::new(name);
    let mut totals: BTreeMap<NodeKey, Totals> = BTreeMap::new();
    let mut lines = 0usize;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Split into stack and count: "a;b;c 42"
        let Some((stack_str, count_str)) = line.rsplit_once(char::is_whitespace) else {
            continue;
        };
        let count = parse_count(count_str.trim()).ok_or_else(|| {
            CollapsedParseError::InvalidCount {
                line: line_no,
                count: count_str.trim().to_owned(),
            }
        })?;
        let frames: Vec<&str> = stack_str
            .split(';')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        if frames.is_empty() {
            continue;
        }

        let overflow = move || CollapsedParseError::Overflow { line: line_no };
        add(&mut totals.entry(ROOT_NODE_KEY).or_default().inclusive, count)
            .ok_or_else(overflow)?;
        let mut path = Vec::with_capacity(frames.len());
        for frame in &frames {
            path.push(*frame);
            let key = profile.ensure_path(path.iter().copied());
            add(&mut totals.entry(key).or_default().inclusive, count)
                .ok_or_else(overflow)?;
        }
        let leaf = profile.ensure_path(frames.iter().copied());
        add(&mut totals.entry(leaf).or_default().exclusive, count).ok_or_else(overflow)?;
        lines += 1;
    }

    if lines == 0 {
        return Err(CollapsedParseError::Empty);
    }

    for (key, total) in totals {
        // Fresh nodes: the single sample needs no monotonicity check.
        if let Some(node) = profile.nodes.get_mut(&key) {
            node.samples.push(NodeSample {
                timestamp_ns: 0,
                cumulative_call_count: 0,
                cumulative_inclusive_duration_ns: total.inclusive,
                cumulative_exclusive_duration_ns: total.exclusive,
            });
        }
    }

    Ok(profile)
}

/// A non-negative count that fits in `u64` after rounding.
fn parse_count(s: &str) -> Option<u64> {
    let count: f64 = s.parse().ok()?;
    let rounded = count.round();
    // `u64::MAX as f64` is 2^64, one past the largest u64.
    (rounded >= 0.0 && rounded < u64::MAX as f64).then_some(rounded as u64)
}

fn add(slot: &mut u64, count: u64) -> Option<()> {
    *slot = slot.checked_add(count)?;
    Some(())
}
