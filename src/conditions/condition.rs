use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{conditions::{Combination, ConditionCollection, ConditionOperator, ConditionValue, Filter}, expressions::{Literal, Operand}};

/// Single filter predicate: `field operator value`.
///
/// Equality compares the `(operator, field, value)` triple; field names are
/// compared without regard to case.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub field: Operand,
    pub operator: ConditionOperator,
    pub value: ConditionValue,
}

impl Condition {
    pub fn new(field: impl Into<Operand>, operator: ConditionOperator, value: impl Into<ConditionValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn equal(field: impl Into<Operand>, value: impl Into<ConditionValue>) -> Self {
        Self::new(field, ConditionOperator::Equal, value)
    }

    pub fn not_equal(field: impl Into<Operand>, value: impl Into<ConditionValue>) -> Self {
        Self::new(field, ConditionOperator::NotEqual, value)
    }

    pub fn greater_than(field: impl Into<Operand>, value: impl Into<ConditionValue>) -> Self {
        Self::new(field, ConditionOperator::GreaterThan, value)
    }

    pub fn greater_than_equal(field: impl Into<Operand>, value: impl Into<ConditionValue>) -> Self {
        Self::new(field, ConditionOperator::GreaterThanEqual, value)
    }

    pub fn less_than(field: impl Into<Operand>, value: impl Into<ConditionValue>) -> Self {
        Self::new(field, ConditionOperator::LessThan, value)
    }

    pub fn less_than_equal(field: impl Into<Operand>, value: impl Into<ConditionValue>) -> Self {
        Self::new(field, ConditionOperator::LessThanEqual, value)
    }

    /// A null or empty pattern degrades to `Equal` on the same value.
    pub fn like(field: impl Into<Operand>, pattern: impl Into<ConditionValue>) -> Self {
        let pattern = pattern.into();
        let empty = pattern.as_literal().is_some_and(Literal::is_empty);

        match empty {
            true => Self::new(field, ConditionOperator::Equal, pattern),
            false => Self::new(field, ConditionOperator::Like, pattern),
        }
    }

    pub fn between(field: impl Into<Operand>, minimum: impl Into<Literal>, maximum: impl Into<Literal>) -> Self {
        Self::new(field, ConditionOperator::Between, ConditionValue::Range(minimum.into(), maximum.into()))
    }

    pub fn r#in<T: Into<Literal>>(field: impl Into<Operand>, values: impl IntoIterator<Item = T>) -> Self {
        Self::new(field, ConditionOperator::In, Literal::list(values))
    }

    pub fn not_in<T: Into<Literal>>(field: impl Into<Operand>, values: impl IntoIterator<Item = T>) -> Self {
        Self::new(field, ConditionOperator::NotIn, Literal::list(values))
    }

    pub fn exists(field: impl Into<Operand>, filter: impl Into<Filter>) -> Self {
        Self::new(field, ConditionOperator::Exists, filter.into())
    }

    pub fn not_exists(field: impl Into<Operand>, filter: impl Into<Filter>) -> Self {
        Self::new(field, ConditionOperator::NotExists, filter.into())
    }

    /// Field name, when the field is a plain field reference.
    pub fn name(&self) -> Option<&str> {
        self.field.name()
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name().is_some_and(|own| own.eq_ignore_ascii_case(name))
    }

    pub fn is_null_value(&self) -> bool {
        self.value.is_null()
    }

    /// Wraps this condition into a single-item collection.
    pub fn to_collection(self, combination: Combination) -> ConditionCollection {
        let mut collection = ConditionCollection::new(combination);
        collection.push(self);
        collection
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = &self.field;
        let value = &self.value;

        match self.operator {
            ConditionOperator::Equal if value.is_null() => write!(f, "{} IS NULL", field),
            ConditionOperator::NotEqual if value.is_null() => write!(f, "{} IS NOT NULL", field),
            ConditionOperator::Between => write!(f, "{} BETWEEN ({})", field, value),
            ConditionOperator::In | ConditionOperator::NotIn => write!(f, "{} {} [{}]", field, self.operator, value),
            ConditionOperator::Exists | ConditionOperator::NotExists => write!(f, "{} {} ({})", field, self.operator, value),
            operator => write!(f, "{} {} {}", field, operator, value),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Condition({})", self)
    }
}
