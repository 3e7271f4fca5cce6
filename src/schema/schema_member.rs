use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::{Paging, SchemaToken, Sorting};

/// Node of a parsed schema.
///
/// `children` are keyed by the lowercased member name and keep the order in
/// which the expression introduced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMember<T> {
    pub name: String,
    pub path: String,
    pub token: T,
    pub paging: Option<Paging>,
    pub sortings: Vec<Sorting>,
    pub children: IndexMap<String, SchemaMember<T>>,
}

impl<T: SchemaToken> SchemaMember<T> {
    pub fn new(token: T, parent_path: Option<&str>) -> Self {
        let name = token.name().to_string();
        let path = match parent_path {
            Some(parent) => format!("{}.{}", parent, name),
            None => name.clone(),
        };

        Self {
            name,
            path,
            token,
            paging: None,
            sortings: vec![],
            children: IndexMap::new(),
        }
    }
}

impl<T> SchemaMember<T> {
    pub fn parent_path(&self) -> Option<&str> {
        self.path.rsplit_once('.').map(|(parent, _)| parent)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<&SchemaMember<T>> {
        self.children.get(&name.to_lowercase())
    }

    /// Looks up a descendant by dotted path relative to this member.
    pub fn find(&self, path: &str) -> Option<&SchemaMember<T>> {
        path.split('.').try_fold(self, |member, name| member.child(name))
    }
}

impl<T> fmt::Display for SchemaMember<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;

        if let Some(paging) = &self.paging {
            write!(f, ":{}", paging)?;
        }

        if !self.sortings.is_empty() {
            let sortings: Vec<String> = self.sortings.iter().map(Sorting::to_string).collect();
            write!(f, "({})", sortings.join(","))?;
        }

        if self.has_children() {
            let children: Vec<String> = self.children.values().map(ToString::to_string).collect();
            write!(f, "{{{}}}", children.join(","))?;
        }

        Ok(())
    }
}
