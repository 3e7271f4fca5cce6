use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;

/// Paging requested for a schema member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Paging {
    /// `?`: the member is a collection but no page was requested.
    Unpaged,
    /// `*`: paging switched off, return everything.
    Disabled,
    /// `N` or `N/S`; a missing size means the configured default.
    Page { index: usize, size: Option<usize> },
}

impl Paging {
    pub fn page(index: usize) -> Self {
        Paging::Page { index, size: None }
    }

    pub fn sized(index: usize, size: usize) -> Self {
        Paging::Page { index, size: Some(size) }
    }

    /// Effective page size, falling back to `config.page_size`.
    pub fn page_size(&self, config: &Config) -> Option<usize> {
        match self {
            Paging::Page { size, .. } => Some(size.unwrap_or(config.page_size)),
            _ => None,
        }
    }
}

impl fmt::Display for Paging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Paging::Unpaged => write!(f, "?"),
            Paging::Disabled => write!(f, "*"),
            Paging::Page { index, size: None } => write!(f, "{}", index),
            Paging::Page { index, size: Some(size) } => write!(f, "{}/{}", index, size),
        }
    }
}
