//! Parameters extracted by the classifier
//!
//! Classifiers name the same slot several ways (`fromLocation`,
//! `from_location`, `from`) and send empty strings for slots they could not
//! fill. [`IntentParams`] accepts all spellings and folds blanks into `None`.

use crate::chess::{Color, PieceKind, Square};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentParams {
    #[serde(
        default,
        alias = "fromLocation",
        alias = "from",
        alias = "origin",
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub from_location: Option<String>,

    #[serde(
        default,
        alias = "toLocation",
        alias = "to",
        alias = "destination",
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub to_location: Option<String>,

    #[serde(
        default,
        alias = "pieceName",
        alias = "PieceName",
        alias = "piece",
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub piece_name: Option<String>,

    #[serde(
        default,
        alias = "BoardSide",
        alias = "boardSide",
        alias = "board_side",
        alias = "color",
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub side: Option<String>,
}

impl IntentParams {
    /// Lenient conversion from a raw JSON parameter map; anything that is
    /// not an object yields empty parameters
    pub fn from_value(value: Value) -> Self {
        if value.is_null() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_else(|e| {
            debug!("[DISPATCH] Ignoring malformed parameters: {}", e);
            Self::default()
        })
    }

    /// Build from `key=value` pairs, using the same aliases as JSON input
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map: serde_json::Map<String, Value> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        Self::from_value(Value::Object(map))
    }

    pub fn is_empty(&self) -> bool {
        self.from_location.is_none()
            && self.to_location.is_none()
            && self.piece_name.is_none()
            && self.side.is_none()
    }

    /// Origin square, if one was given and it names a real square
    pub fn origin(&self) -> Option<Square> {
        self.from_location.as_deref().and_then(parse_square)
    }

    pub fn destination(&self) -> Option<Square> {
        self.to_location.as_deref().and_then(parse_square)
    }

    pub fn piece_kind(&self) -> Option<PieceKind> {
        self.piece_name.as_deref().and_then(PieceKind::from_spoken)
    }

    pub fn color(&self) -> Option<Color> {
        self.side.as_deref().and_then(Color::from_spoken)
    }

    /// JSON snapshot kept in the session for auditing
    pub fn snapshot(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Speech transcripts come back as "E4", "e 4" or "e4."
fn parse_square(raw: &str) -> Option<Square> {
    let compact: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    compact.parse().ok()
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
