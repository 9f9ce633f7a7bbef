use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Canonical provider identifiers used in snapshot metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Yahoo,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
