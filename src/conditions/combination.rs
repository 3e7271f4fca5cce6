use serde::{Deserialize, Serialize};
use std::fmt;

/// Boolean connective of a `ConditionCollection`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combination {
    #[default]
    And,
    Or,
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combination::And => write!(f, "AND"),
            Combination::Or => write!(f, "OR"),
        }
    }
}
