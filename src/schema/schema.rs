use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::SchemaMember;

/// Requested shape of a query result: a named tree of members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema<T> {
    pub name: String,
    pub members: IndexMap<String, SchemaMember<T>>,
}

impl<T> Schema<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Values<'_, String, SchemaMember<T>> {
        self.members.values()
    }

    /// Looks up a member by dotted path, e.g. `Roles.Title`, ignoring case.
    pub fn find(&self, path: &str) -> Option<&SchemaMember<T>> {
        let (first, rest) = match path.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (path, None),
        };

        let member = self.members.get(&first.to_lowercase())?;
        match rest {
            Some(rest) => member.find(rest),
            None => Some(member),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }
}

impl<T> fmt::Display for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = self.members.values().map(ToString::to_string).collect();
        f.write_str(&members.join(","))
    }
}
