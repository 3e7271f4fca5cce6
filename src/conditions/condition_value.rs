use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{conditions::{Condition, ConditionCollection, Filter}, expressions::{Literal, Operand}};

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionValue {
    Literal(Literal),
    Range(Literal, Literal),
    Operand(Operand),
    Filter(Box<Filter>),
}

impl ConditionValue {
    pub fn is_null(&self) -> bool {
        match self {
            ConditionValue::Literal(literal) => literal.is_null(),
            ConditionValue::Operand(operand) => operand.is_null_constant(),
            _ => false,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            ConditionValue::Literal(literal) => Some(literal),
            _ => None,
        }
    }
}

impl Default for ConditionValue {
    fn default() -> Self {
        ConditionValue::Literal(Literal::Null)
    }
}

macro_rules! condition_value_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for ConditionValue {
                fn from(value: $source) -> Self {
                    ConditionValue::Literal(value.into())
                }
            }
        )*
    };
}

condition_value_from!(
    Literal, bool, char, i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64,
    String, &str, NaiveDateTime, NaiveDate, Uuid,
);

impl<T: Into<Literal>> From<Option<T>> for ConditionValue {
    fn from(value: Option<T>) -> Self {
        ConditionValue::Literal(value.into())
    }
}

impl<T: Into<Literal>> From<Vec<T>> for ConditionValue {
    fn from(values: Vec<T>) -> Self {
        ConditionValue::Literal(Literal::list(values))
    }
}

impl From<Operand> for ConditionValue {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Constant(literal) => ConditionValue::Literal(literal),
            operand => ConditionValue::Operand(operand),
        }
    }
}

impl From<Filter> for ConditionValue {
    fn from(filter: Filter) -> Self {
        ConditionValue::Filter(Box::new(filter))
    }
}

impl From<Condition> for ConditionValue {
    fn from(condition: Condition) -> Self {
        Filter::from(condition).into()
    }
}

impl From<ConditionCollection> for ConditionValue {
    fn from(collection: ConditionCollection) -> Self {
        Filter::from(collection).into()
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Literal(literal) => write!(f, "{}", literal),
            ConditionValue::Range(minimum, maximum) => write!(f, "{}, {}", minimum, maximum),
            ConditionValue::Operand(operand) => write!(f, "{}", operand),
            ConditionValue::Filter(filter) => write!(f, "{}", filter),
        }
    }
}
