use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{conditions::Filter, expressions::Identifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunction {
    Count,
    Sum,
    Average,
    Median,
    Maximum,
    Minimum,
    Deviation,
    DeviationPopulation,
    Variance,
    VariancePopulation,
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Aggregate over a member, optionally restricted by a filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aggregate {
    pub function: AggregateFunction,
    pub member: Identifier,
    pub filter: Option<Box<Filter>>,
    pub distinct: bool,
}

impl Aggregate {
    pub fn new(function: AggregateFunction, member: &str) -> Self {
        Self {
            function,
            member: member.into(),
            filter: None,
            distinct: false,
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(Box::new(filter.into()));
        self
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function)?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        write!(f, "{})", self.member)?;

        if let Some(filter) = &self.filter {
            write!(f, " WHERE {}", filter)?;
        }

        Ok(())
    }
}
