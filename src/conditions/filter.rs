use serde::{Deserialize, Serialize};
use std::{fmt, ops};

use crate::conditions::{Combination, Condition, ConditionCollection};

/// Node of a filter tree: a single condition or a nested collection.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Filter {
    Condition(Condition),
    Collection(ConditionCollection),
}

impl Filter {
    pub fn as_condition(&self) -> Option<&Condition> {
        match self {
            Filter::Condition(condition) => Some(condition),
            Filter::Collection(_) => None,
        }
    }

    pub fn as_collection(&self) -> Option<&ConditionCollection> {
        match self {
            Filter::Condition(_) => None,
            Filter::Collection(collection) => Some(collection),
        }
    }

    /// Depth-first search for the first condition on `name`.
    pub fn find(&self, name: &str) -> Option<&Condition> {
        match self {
            Filter::Condition(condition) if condition.is_named(name) => Some(condition),
            Filter::Condition(_) => None,
            Filter::Collection(collection) => collection.find(name),
        }
    }

    /// Visits conditions depth-first; stops once `visitor` returns `true`.
    pub(crate) fn visit_mut<F>(&mut self, visitor: &mut F) -> bool
    where
        F: FnMut(&mut Condition) -> bool,
    {
        match self {
            Filter::Condition(condition) => visitor(condition),
            Filter::Collection(collection) => collection.visit_mut(visitor),
        }
    }
}

impl From<Condition> for Filter {
    fn from(condition: Condition) -> Self {
        Filter::Condition(condition)
    }
}

impl From<ConditionCollection> for Filter {
    fn from(collection: ConditionCollection) -> Self {
        Filter::Collection(collection)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Condition(condition) => write!(f, "{}", condition),
            Filter::Collection(collection) => write!(f, "{}", collection),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Condition(condition) => write!(f, "{:?}", condition),
            Filter::Collection(collection) => write!(f, "{:?}", collection),
        }
    }
}

macro_rules! filter_combinators {
    ($($source:ty),* $(,)?) => {
        $(
            impl<T: Into<Filter>> ops::BitAnd<T> for $source {
                type Output = ConditionCollection;

                fn bitand(self, rhs: T) -> ConditionCollection {
                    ConditionCollection::combine(Combination::And, self, rhs)
                }
            }

            impl<T: Into<Filter>> ops::BitOr<T> for $source {
                type Output = ConditionCollection;

                fn bitor(self, rhs: T) -> ConditionCollection {
                    ConditionCollection::combine(Combination::Or, self, rhs)
                }
            }
        )*
    };
}

filter_combinators!(Condition, ConditionCollection, Filter);

#[cfg(test)]
mod tests {
    use crate::conditions::{Combination, Condition, ConditionCollection, Filter};

    #[test]
    fn test_filter_find_nested() {
        let filter = Filter::from(Condition::equal("a", 1) & (Condition::equal("b", 2) | Condition::equal("c", 3)));

        assert_eq!(filter.find("C"), Some(&Condition::equal("c", 3)));
        assert_eq!(filter.find("d"), None);
    }

    #[test]
    fn test_filter_accessors() {
        let condition = Filter::from(Condition::equal("a", 1));
        let collection = Filter::from(ConditionCollection::new(Combination::Or));

        assert!(condition.as_condition().is_some());
        assert!(condition.as_collection().is_none());
        assert!(collection.as_collection().is_some());
    }

    #[test]
    fn test_filter_operators() {
        let left = Filter::from(Condition::equal("a", 1));
        let collection = left | Condition::equal("b", 2);

        assert_eq!(collection.combination(), Combination::Or);
        assert_eq!(collection.to_string(), "a == 1 OR b == 2");
    }
}
