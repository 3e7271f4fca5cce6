use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{conditions::Condition, expressions::{Literal, Operand}};

/// Inclusive interval with independently optional bounds.
///
/// Both bounds absent is the empty range, which maps to no condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range<T> {
    pub minimum: Option<T>,
    pub maximum: Option<T>,
}

impl<T: PartialOrd> Range<T> {
    /// Builds a range, swapping the bounds when `minimum > maximum`.
    pub fn new(minimum: Option<T>, maximum: Option<T>) -> Self {
        match (minimum, maximum) {
            (Some(minimum), Some(maximum)) if minimum > maximum => Self {
                minimum: Some(maximum),
                maximum: Some(minimum),
            },
            (minimum, maximum) => Self { minimum, maximum },
        }
    }

    pub fn at_least(minimum: T) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: None,
        }
    }

    pub fn at_most(maximum: T) -> Self {
        Self {
            minimum: None,
            maximum: Some(maximum),
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.minimum.as_ref().is_none_or(|minimum| minimum <= value)
            && self.maximum.as_ref().is_none_or(|maximum| value <= maximum)
    }
}

impl<T: Clone> Range<T> {
    pub fn exact(value: T) -> Self {
        Self {
            minimum: Some(value.clone()),
            maximum: Some(value),
        }
    }
}

impl<T> Range<T> {
    pub fn empty() -> Self {
        Self {
            minimum: None,
            maximum: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.minimum.is_none() && self.maximum.is_none()
    }
}

impl<T: Into<Literal> + Clone> Range<T> {
    /// Maps the range onto a condition over `field`; `None` for an empty range.
    pub fn to_condition(&self, field: impl Into<Operand>) -> Option<Condition> {
        self.to_condition_on(field.into())
    }
}

impl<T> Default for Range<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: fmt::Display> fmt::Display for Range<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        match &self.minimum {
            Some(minimum) => write!(f, "{}", minimum)?,
            None => f.write_str("*")?,
        }
        f.write_str("~")?;
        match &self.maximum {
            Some(maximum) => write!(f, "{}", maximum)?,
            None => f.write_str("*")?,
        }
        f.write_str(")")
    }
}

/// Type-erased view of a range, for code that only needs its bounds as literals.
pub trait RangeCondition {
    fn minimum_literal(&self) -> Option<Literal>;

    fn maximum_literal(&self) -> Option<Literal>;

    fn is_empty_range(&self) -> bool {
        self.minimum_literal().is_none() && self.maximum_literal().is_none()
    }

    fn to_condition_on(&self, field: Operand) -> Option<Condition> {
        match (self.minimum_literal(), self.maximum_literal()) {
            (Some(minimum), Some(maximum)) => Some(Condition::between(field, minimum, maximum)),
            (Some(minimum), None) => Some(Condition::greater_than_equal(field, minimum)),
            (None, Some(maximum)) => Some(Condition::less_than_equal(field, maximum)),
            (None, None) => None,
        }
    }
}

impl<T: Into<Literal> + Clone> RangeCondition for Range<T> {
    fn minimum_literal(&self) -> Option<Literal> {
        self.minimum.clone().map(Into::into)
    }

    fn maximum_literal(&self) -> Option<Literal> {
        self.maximum.clone().map(Into::into)
    }
}
