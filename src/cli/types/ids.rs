//! Identifier types for games, teams and statistics records.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_uid {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(uid: impl Into<String>) -> Self {
                Self(uid.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(uid: &str) -> Self {
                Self(uid.to_string())
            }
        }
    };
}

string_uid!(
    /// Globally unique game identifier, e.g. `NFL_202502090phi`.
    GameUid
);

string_uid!(
    /// Team identifier, e.g. `NFL_134936`.
    TeamUid
);

string_uid!(
    /// Identifier of one team's statistics line for one game.
    StatUid
);

impl TeamUid {
    /// Derive a uid for a team the source did not identify.
    ///
    /// ```rust
    /// use nfl_collect::TeamUid;
    ///
    /// assert_eq!(TeamUid::from_name("San Francisco 49ers").as_str(), "NFL_SANFRANCIS");
    /// ```
    pub fn from_name(name: &str) -> Self {
        let slug: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .take(10)
            .collect();
        Self(format!("NFL_{}", slug))
    }
}

impl StatUid {
    /// Deterministic uid for a team's line in a game.
    pub fn for_team_game(game: &GameUid, team: &TeamUid) -> Self {
        Self(format!("{}:{}", game, team))
    }
}
