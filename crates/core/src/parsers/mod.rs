pub mod collapsed;
pub mod json;

use crate::model::Profile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("collapsed: {0}")]
    Collapsed(#[from] collapsed::CollapsedParseError),
    #[error("json: {0}")]
    Json(#[from] json::JsonParseError),
    #[error("unable to detect format")]
    UnknownFormat,
}

/// Auto-detect the profile format and parse it.
///
/// Detection strategy:
/// 1. Anything that parses as a JSON object is treated as a snapshot.
/// 2. Otherwise fall back to collapsed stacks, naming the profile `name`.
pub fn parse_auto(data: &[u8], name: &str) -> Result<Profile, ParseError> {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data)
        && value.is_object()
    {
        return Ok(json::parse_json(data)?);
    }

    match collapsed::parse_collapsed(data, name) {
        Ok(profile) => Ok(profile),
        Err(collapsed::CollapsedParseError::Empty) => Err(ParseError::UnknownFormat),
        Err(err) => Err(err.into()),
    }
}
