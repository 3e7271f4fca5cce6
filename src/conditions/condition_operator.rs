use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    Like,
    Between,
    In,
    NotIn,
    Exists,
    NotExists,
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionOperator::Equal => write!(f, "=="),
            ConditionOperator::NotEqual => write!(f, "!="),
            ConditionOperator::GreaterThan => write!(f, ">"),
            ConditionOperator::GreaterThanEqual => write!(f, ">="),
            ConditionOperator::LessThan => write!(f, "<"),
            ConditionOperator::LessThanEqual => write!(f, "<="),
            ConditionOperator::Like => write!(f, "LIKE"),
            ConditionOperator::Between => write!(f, "BETWEEN"),
            ConditionOperator::In => write!(f, "IN"),
            ConditionOperator::NotIn => write!(f, "NOT IN"),
            ConditionOperator::Exists => write!(f, "EXISTS"),
            ConditionOperator::NotExists => write!(f, "NOT EXISTS"),
        }
    }
}

impl fmt::Debug for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConditionOperator({})", self)
    }
}
