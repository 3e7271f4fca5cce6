pub mod parser;

pub mod criteria;
pub use criteria::{CriteriaPair, CriteriaParser};

pub mod expressions;
pub use expressions::{Literal, Operand};

pub mod conditions;
pub use conditions::{Combination, Condition, ConditionCollection, ConditionOperator, Filter};

pub mod ranges;
pub use ranges::{DateTimeRangeParser, Range, RangeCondition, RangeParser};

pub mod schema;
pub use schema::{Paging, Schema, SchemaMember, SchemaParser, Sorting};

pub mod config;
pub use config::Config;

pub mod error;
pub use error::{Error, Result};
