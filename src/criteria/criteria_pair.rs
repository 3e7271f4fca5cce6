use std::fmt;

use serde::{Deserialize, Serialize};

/// One `key[:value]` entry of a criteria expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CriteriaPair {
    pub key: String,
    pub value: Option<String>,
}

impl CriteriaPair {
    pub fn new(key: &str, value: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            value: value.map(str::to_string),
        }
    }

    pub fn key(key: &str) -> Self {
        Self::new(key, None)
    }
}

impl From<(String, Option<String>)> for CriteriaPair {
    fn from((key, value): (String, Option<String>)) -> Self {
        Self { key, value }
    }
}

impl From<CriteriaPair> for (String, Option<String>) {
    fn from(pair: CriteriaPair) -> Self {
        (pair.key, pair.value)
    }
}

impl fmt::Display for CriteriaPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)?;

        let Some(value) = &self.value else {
            return Ok(());
        };

        f.write_str(":")?;

        let leading = value.len() - value.trim_start().len();
        let trailing = value.trim_end().len();

        for (offset, ch) in value.char_indices() {
            let edge = offset < leading || offset >= trailing;
            match ch {
                '\\' => f.write_str("\\\\")?,
                '+' => f.write_str("\\+")?,
                '\t' => f.write_str("\\t")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\u{8}' => f.write_str("\\b")?,
                ' ' if edge => f.write_str("\\s")?,
                ch if edge && ch.is_whitespace() => write!(f, "\\{}", ch)?,
                ch => write!(f, "{}", ch)?,
            }
        }

        Ok(())
    }
}
