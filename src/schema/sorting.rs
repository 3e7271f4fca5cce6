use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sorting {
    pub field: String,
    pub descending: bool,
}

impl Sorting {
    pub fn new(field: &str, descending: bool) -> Self {
        Self {
            field: field.to_string(),
            descending,
        }
    }

    pub fn ascending(field: &str) -> Self {
        Self::new(field, false)
    }

    pub fn descending(field: &str) -> Self {
        Self::new(field, true)
    }
}

impl fmt::Display for Sorting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            f.write_str("~")?;
        }
        f.write_str(&self.field)
    }
}
