use serde::{Deserialize, Serialize};
use std::{fmt, ops, slice};
use tracing::{debug, trace};

use crate::{conditions::{Combination, Condition, Filter}, expressions::Operand, ranges::RangeCondition};

/// Ordered list of filters joined by one combination.
///
/// Items are kept flat: a nested collection is never empty, never holds a
/// single item and never shares the combination of its parent. Every mutation
/// goes through [`ConditionCollection::insert`] to keep it that way.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "CollectionData")]
pub struct ConditionCollection {
    combination: Combination,
    items: Vec<Filter>,
}

#[derive(Deserialize)]
struct CollectionData {
    combination: Combination,
    items: Vec<Filter>,
}

impl From<CollectionData> for ConditionCollection {
    fn from(data: CollectionData) -> Self {
        let mut collection = ConditionCollection::new(data.combination);
        for item in data.items {
            collection.push(item);
        }
        collection
    }
}

impl ConditionCollection {
    pub fn new(combination: Combination) -> Self {
        Self {
            combination,
            items: Vec::new(),
        }
    }

    pub fn and_items<T: Into<Filter>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::with_items(Combination::And, items)
    }

    pub fn or_items<T: Into<Filter>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::with_items(Combination::Or, items)
    }

    pub fn with_items<T: Into<Filter>>(combination: Combination, items: impl IntoIterator<Item = T>) -> Self {
        let mut collection = Self::new(combination);
        for item in items {
            collection.push(item);
        }
        collection
    }

    /// `left AND right`, skipping absent sides. `None` only when both are absent.
    pub fn and(left: Option<Filter>, right: Option<Filter>) -> Option<Self> {
        let collection = Self::combine_optional(Combination::And, left, right);
        debug!(count = collection.as_ref().map_or(0, |c| c.len()), "ConditionCollection::and() created");
        collection
    }

    /// `left OR right`, skipping absent sides. `None` only when both are absent.
    pub fn or(left: Option<Filter>, right: Option<Filter>) -> Option<Self> {
        let collection = Self::combine_optional(Combination::Or, left, right);
        debug!(count = collection.as_ref().map_or(0, |c| c.len()), "ConditionCollection::or() created");
        collection
    }

    pub fn combine(combination: Combination, left: impl Into<Filter>, right: impl Into<Filter>) -> Self {
        let mut collection = Self::new(combination);
        collection.push(left);
        collection.push(right);
        collection
    }

    fn combine_optional(combination: Combination, left: Option<Filter>, right: Option<Filter>) -> Option<Self> {
        match (left, right) {
            (None, None) => None,
            (Some(left), Some(right)) => Some(Self::combine(combination, left, right)),
            (Some(only), None) | (None, Some(only)) => Some(Self::with_items(combination, [only])),
        }
    }

    pub fn combination(&self) -> Combination {
        self.combination
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Filter> {
        self.items.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, Filter> {
        self.items.iter()
    }

    /// Appends `item`; returns how many items the collection grew by.
    pub fn push(&mut self, item: impl Into<Filter>) -> usize {
        self.insert(self.items.len(), item)
    }

    /// Inserts `item` at `index` (clamped to the length), flattening nested
    /// collections. Returns how many items the collection grew by.
    pub fn insert(&mut self, index: usize, item: impl Into<Filter>) -> usize {
        let index = index.min(self.items.len());

        match item.into() {
            Filter::Collection(collection) if collection.combination == self.combination => {
                let count = collection.items.len();
                trace!(count, combination = %self.combination, "splicing collection with same combination");
                self.items.splice(index..index, collection.items);
                count
            },
            Filter::Collection(mut collection) => match collection.items.len() {
                0 => {
                    trace!("dropping empty collection");
                    0
                },
                1 => match collection.items.pop() {
                    Some(only) => {
                        trace!("unwrapping single item collection");
                        self.insert(index, only)
                    },
                    None => 0,
                },
                _ => {
                    self.items.insert(index, Filter::Collection(collection));
                    1
                },
            },
            condition => {
                self.items.insert(index, condition);
                1
            },
        }
    }

    /// Pushes every item of `other` into this collection.
    pub fn merge(&mut self, other: ConditionCollection) -> usize {
        other.items.into_iter().map(|item| self.push(item)).sum()
    }

    /// Pushes the condition a range maps to on `field`; `false` for an empty range.
    pub fn push_range(&mut self, field: impl Into<Operand>, range: &dyn RangeCondition) -> bool {
        match range.to_condition_on(field.into()) {
            Some(condition) => {
                self.push(condition);
                true
            },
            None => false,
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Filter> {
        match index < self.items.len() {
            true => Some(self.items.remove(index)),
            false => None,
        }
    }

    /// Removes every condition on any of `names`, at any depth, and
    /// renormalizes the nested collections left behind. Returns how many
    /// conditions were removed.
    pub fn remove(&mut self, names: &[&str]) -> usize {
        let items = std::mem::take(&mut self.items);
        let mut removed = 0;

        for item in items {
            match item {
                Filter::Condition(condition) if names.iter().any(|name| condition.is_named(name)) => removed += 1,
                Filter::Collection(mut collection) => {
                    removed += collection.remove(names);
                    self.push(collection);
                },
                item => {
                    self.push(item);
                },
            }
        }

        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// First condition on `name`, depth-first.
    pub fn find(&self, name: &str) -> Option<&Condition> {
        self.items.iter().find_map(|item| item.find(name))
    }

    pub fn find_all(&self, name: &str) -> Vec<&Condition> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Condition>) {
        for item in &self.items {
            match item {
                Filter::Condition(condition) if condition.is_named(name) => found.push(condition),
                Filter::Condition(_) => {},
                Filter::Collection(collection) => collection.collect_named(name, found),
            }
        }
    }

    /// Runs `action` on the first condition on `name`. Returns whether one was found.
    pub fn match_first<F>(&mut self, name: &str, action: F) -> bool
    where
        F: FnOnce(&mut Condition),
    {
        let mut action = Some(action);

        self.visit_mut(&mut |condition| {
            if !condition.is_named(name) {
                return false;
            }
            if let Some(action) = action.take() {
                action(condition);
            }
            true
        })
    }

    /// Runs `action` on every condition on `name`. Returns how many matched.
    pub fn match_all<F>(&mut self, name: &str, mut action: F) -> usize
    where
        F: FnMut(&mut Condition),
    {
        let mut count = 0;

        self.visit_mut(&mut |condition| {
            if condition.is_named(name) {
                action(condition);
                count += 1;
            }
            false
        });

        count
    }

    /// Distinct field names in order of first appearance.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        for item in &self.items {
            match item {
                Filter::Condition(condition) => {
                    if let Some(name) = condition.name() {
                        if !names.iter().any(|known| known.eq_ignore_ascii_case(name)) {
                            names.push(name);
                        }
                    }
                },
                Filter::Collection(collection) => collection.collect_names(names),
            }
        }
    }

    pub(crate) fn visit_mut<F>(&mut self, visitor: &mut F) -> bool
    where
        F: FnMut(&mut Condition) -> bool,
    {
        self.items.iter_mut().any(|item| item.visit_mut(visitor))
    }
}

impl<'a> IntoIterator for &'a ConditionCollection {
    type Item = &'a Filter;
    type IntoIter = slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl From<Condition> for ConditionCollection {
    fn from(condition: Condition) -> Self {
        condition.to_collection(Combination::And)
    }
}

impl ops::Add<Condition> for ConditionCollection {
    type Output = ConditionCollection;

    fn add(mut self, rhs: Condition) -> ConditionCollection {
        self.push(rhs);
        self
    }
}

impl ops::Add<Filter> for ConditionCollection {
    type Output = ConditionCollection;

    fn add(mut self, rhs: Filter) -> ConditionCollection {
        self.push(rhs);
        self
    }
}

impl ops::Add<ConditionCollection> for ConditionCollection {
    type Output = ConditionCollection;

    fn add(mut self, rhs: ConditionCollection) -> ConditionCollection {
        self.merge(rhs);
        self
    }
}

impl ops::AddAssign<Condition> for ConditionCollection {
    fn add_assign(&mut self, rhs: Condition) {
        self.push(rhs);
    }
}

impl ops::AddAssign<Filter> for ConditionCollection {
    fn add_assign(&mut self, rhs: Filter) {
        self.push(rhs);
    }
}

impl ops::AddAssign<ConditionCollection> for ConditionCollection {
    fn add_assign(&mut self, rhs: ConditionCollection) {
        self.merge(rhs);
    }
}

impl fmt::Display for ConditionCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, item) in self.items.iter().enumerate() {
            if index > 0 {
                write!(f, " {} ", self.combination)?;
            }
            match item {
                Filter::Condition(condition) => write!(f, "{}", condition)?,
                Filter::Collection(collection) => write!(f, "({})", collection)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ConditionCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.combination, self)
    }
}

#[cfg(test)]
mod tests {
    use crate::{conditions::{Combination, Condition, ConditionCollection, ConditionOperator, Filter}, ranges::Range};

    fn a() -> Condition {
        Condition::equal("a", 1)
    }

    fn b() -> Condition {
        Condition::equal("b", 2)
    }

    fn c() -> Condition {
        Condition::equal("c", 3)
    }

    fn assert_flat(collection: &ConditionCollection) {
        for item in collection {
            if let Filter::Collection(nested) = item {
                assert_ne!(nested.combination(), collection.combination(), "nested collection shares combination");
                assert!(nested.len() >= 2, "nested collection with {} items", nested.len());
                assert_flat(nested);
            }
        }
    }

    #[test]
    fn test_and_with_or_nests() {
        let collection = ConditionCollection::combine(Combination::And, a(), b() | c());

        assert_eq!(collection.combination(), Combination::And);
        assert_eq!(collection.len(), 2);
        match collection.get(1) {
            Some(Filter::Collection(nested)) => {
                assert_eq!(nested.combination(), Combination::Or);
                assert_eq!(nested.len(), 2);
            },
            other => panic!("Expected nested collection, got {:?}", other),
        }
        assert_eq!(collection.to_string(), "a == 1 AND (b == 2 OR c == 3)");
    }

    #[test]
    fn test_and_with_and_flattens() {
        let collection = a() & (b() & c());

        assert_eq!(collection.combination(), Combination::And);
        assert_eq!(collection.len(), 3);
        assert!(collection.iter().all(|item| item.as_condition().is_some()));
        assert_eq!(collection.to_string(), "a == 1 AND b == 2 AND c == 3");
    }

    #[test]
    fn test_named_combinators_with_absent_sides() {
        assert_eq!(ConditionCollection::and(None, None), None);

        let single = ConditionCollection::or(Some(a().into()), None).expect("Expected a collection");
        assert_eq!(single.combination(), Combination::Or);
        assert_eq!(single.len(), 1);

        let both = ConditionCollection::and(None, Some(b().into())).expect("Expected a collection");
        assert_eq!(both.get(0), Some(&Filter::Condition(b())));
    }

    #[test]
    fn test_named_combinators_flatten() {
        let left = ConditionCollection::and_items([a(), b()]);
        let collection = ConditionCollection::and(Some(left.into()), Some(c().into())).expect("Expected a collection");

        assert_eq!(collection.len(), 3);
        assert_eq!(collection.to_string(), "a == 1 AND b == 2 AND c == 3");

        let collection = ConditionCollection::or(Some((a() & b()).into()), Some(c().into())).expect("Expected a collection");

        assert_eq!(collection.len(), 2);
        assert_flat(&collection);
        assert_eq!(collection.to_string(), "(a == 1 AND b == 2) OR c == 3");
    }

    #[test]
    fn test_equality_is_ordered_and_typed() {
        assert_eq!(a() & b(), a() & b());
        assert_ne!(a() & b(), b() & a());
        assert_ne!(a() & b(), a() | b());

        let condition = ConditionCollection { combination: Combination::And, items: vec![Filter::Condition(a())] };
        let nested = ConditionCollection {
            combination: Combination::And,
            items: vec![Filter::Collection(ConditionCollection::or_items([a()]))],
        };

        assert_ne!(condition, nested);
        assert_ne!(Filter::Condition(a()), Filter::Collection(ConditionCollection::and_items([a()])));
    }

    #[test]
    fn test_push_drops_empty_and_unwraps_single() {
        let mut collection = ConditionCollection::new(Combination::And);

        assert_eq!(collection.push(ConditionCollection::new(Combination::Or)), 0);
        assert!(collection.is_empty());

        assert_eq!(collection.push(ConditionCollection::or_items([a()])), 1);
        assert_eq!(collection.get(0), Some(&Filter::Condition(a())));
    }

    #[test]
    fn test_push_unwraps_single_item_recursively() {
        let inner = ConditionCollection::and_items([b(), c()]);
        let mut wrapper = ConditionCollection::new(Combination::Or);
        wrapper.push(inner);

        assert_eq!(wrapper.len(), 1);
        assert!(wrapper.get(0).and_then(Filter::as_collection).is_some());

        let mut collection = ConditionCollection::and_items([a()]);
        let mut single = ConditionCollection::new(Combination::Or);
        single.items.push(Filter::Collection(ConditionCollection::and_items([b(), c()])));

        assert_eq!(collection.push(single), 2);
        assert_eq!(collection.len(), 3);
        assert_flat(&collection);
    }

    #[test]
    fn test_insert_splices_at_index() {
        let mut collection = ConditionCollection::and_items([a(), c()]);

        assert_eq!(collection.insert(1, ConditionCollection::and_items([b(), Condition::equal("d", 4)])), 2);
        assert_eq!(collection.to_string(), "a == 1 AND b == 2 AND d == 4 AND c == 3");

        assert_eq!(collection.insert(99, Condition::equal("e", 5)), 1);
        assert_eq!(collection.len(), 5);
    }

    #[test]
    fn test_operators_keep_collection_flat() {
        let collection = (a() | b()) & (b() | c()) & (a() & c()) | (Condition::equal("x", 0) & c());

        assert_flat(&collection);
        assert_eq!(collection.combination(), Combination::Or);
    }

    #[test]
    fn test_remove_renormalizes() {
        let mut collection = a() & (b() | c());

        assert_eq!(collection.remove(&["C"]), 1);
        assert_eq!(collection.len(), 2);
        assert!(collection.iter().all(|item| item.as_condition().is_some()));
        assert_eq!(collection.to_string(), "a == 1 AND b == 2");

        assert_eq!(collection.remove(&["a", "b"]), 2);
        assert!(collection.is_empty());
    }

    #[test]
    fn test_remove_collapses_nested_into_parent() {
        let mut collection = a() | ((b() | c()) & Condition::equal("d", 4));

        assert_eq!(collection.remove(&["d"]), 1);
        assert_eq!(collection.combination(), Combination::Or);
        assert_eq!(collection.len(), 3);
        assert_flat(&collection);
    }

    #[test]
    fn test_lookups() {
        let collection = a() & (b() | Condition::greater_than("a", 10));

        assert!(collection.contains("A"));
        assert!(!collection.contains("z"));
        assert_eq!(collection.find("b"), Some(&b()));
        assert_eq!(collection.find_all("a").len(), 2);
        assert_eq!(collection.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_match_first_and_all() {
        let mut collection = a() & (b() | Condition::greater_than("a", 10));

        let found = collection.match_first("a", |condition| condition.operator = ConditionOperator::NotEqual);
        assert!(found);
        assert_eq!(collection.find("a"), Some(&Condition::not_equal("a", 1)));
        assert!(!collection.match_first("z", |_| panic!("should not run")));

        let count = collection.match_all("A", |condition| condition.value = 7.into());
        assert_eq!(count, 2);
        assert_eq!(collection.to_string(), "a != 7 AND (b == 2 OR a > 7)");
    }

    #[test]
    fn test_add_operators() {
        let mut collection = ConditionCollection::new(Combination::And) + a();
        collection += b() & c();

        assert_eq!(collection.len(), 3);

        let collection = collection + (Condition::equal("x", 1) | Condition::equal("y", 2));

        assert_eq!(collection.len(), 5);
        assert_eq!(collection.to_string(), "a == 1 AND b == 2 AND c == 3 AND x == 1 AND y == 2");
    }

    #[test]
    fn test_push_range() {
        let mut collection = ConditionCollection::new(Combination::And);

        assert!(collection.push_range("Age", &Range::new(Some(18), Some(65))));
        assert!(collection.push_range("Score", &Range::at_least(10)));
        assert!(!collection.push_range("Height", &Range::<i32>::empty()));

        assert_eq!(collection.to_string(), "Age BETWEEN (18, 65) AND Score >= 10");
    }

    #[test]
    fn test_serde_normalizes() {
        let collection = a() & (b() | c());
        let json = serde_json::to_string(&collection).expect("Failed to serialize");

        let back: ConditionCollection = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(back, collection);
    }

    #[test]
    fn test_debug() {
        let collection = a() | b();

        assert_eq!(format!("{:?}", collection), "OR[a == 1 OR b == 2]");
    }
}
