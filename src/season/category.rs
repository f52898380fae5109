//! Game categories: the regular season and the four playoff rounds.

use crate::error::{CollectError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Regular,
    Wildcard,
    Divisional,
    Conference,
    Superbowl,
}

impl Category {
    pub const PLAYOFF_ROUNDS: [Category; 4] = [
        Category::Wildcard,
        Category::Divisional,
        Category::Conference,
        Category::Superbowl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Regular => "regular",
            Category::Wildcard => "wildcard",
            Category::Divisional => "divisional",
            Category::Conference => "conference",
            Category::Superbowl => "superbowl",
        }
    }

    pub fn is_playoff(&self) -> bool {
        !matches!(self, Category::Regular)
    }

    /// Calendar month a playoff round is played in, `None` for the regular season.
    pub fn playoff_month(&self) -> Option<u32> {
        match self {
            Category::Regular => None,
            Category::Superbowl => Some(2),
            _ => Some(1),
        }
    }

    /// Read a stored category; NULL and empty values are the regular season.
    pub fn from_stored(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None | Some("") => Ok(Category::Regular),
            Some(s) => s.parse(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CollectError;

    /// Accepts the canonical names plus the spellings sources use for rounds
    /// ("Wild Card", "Conference Championships", "Super Bowl").
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "regular" | "reg" | "regularseason" => Ok(Category::Regular),
            "wildcard" | "wc" => Ok(Category::Wildcard),
            "divisional" | "div" | "divisionalround" => Ok(Category::Divisional),
            "conference" | "conf" | "conferencechampionship" | "conferencechampionships" => {
                Ok(Category::Conference)
            }
            "superbowl" | "sb" | "championship" => Ok(Category::Superbowl),
            _ => Err(CollectError::malformed(
                format!("category '{}'", s),
                "unknown game category",
            )),
        }
    }
}
