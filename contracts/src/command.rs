//! Transition commands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a transition does to a badge.
///
/// New kinds of transition are added as variants here and as match arms in
/// [`crate::BadgeContract::verify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Create a badge: no inputs, one output.
    Issue,
    /// Use a badge once: consume the current version, produce the decremented one.
    Show,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Show => "show",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
