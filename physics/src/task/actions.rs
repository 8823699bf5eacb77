use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How raw policy outputs become thruster commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActionMode {
    /// Outputs are commands in `[-1, 1]`.
    #[default]
    Continuous,
    /// One binary choice per thruster: 0 → full reverse, 1 → full ahead.
    MultiDiscrete,
}

impl ActionMode {
    pub fn to_command<const K: usize>(self, raw: [f32; K]) -> [f32; K] {
        match self {
            Self::Continuous => raw,
            Self::MultiDiscrete => raw.map(|a| a * 2.0 - 1.0),
        }
    }
}

impl FromStr for ActionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "continuous" => Ok(Self::Continuous),
            "multi_discrete" | "multidiscrete" => Ok(Self::MultiDiscrete),
            other => Err(ConfigError::UnsupportedActionMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for ActionMode {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ActionMode> for String {
    fn from(m: ActionMode) -> Self {
        match m {
            ActionMode::Continuous => "continuous".into(),
            ActionMode::MultiDiscrete => "multi_discrete".into(),
        }
    }
}
