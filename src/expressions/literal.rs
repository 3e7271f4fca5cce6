use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display};
use uuid::Uuid;

/// Closed set of constant values a query object can carry.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    Float(NotNan<f64>),
    String(String),
    DateTime(NaiveDateTime),
    Guid(Uuid),
    List(Vec<Literal>),
}

impl Literal {
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// `true` for a null or an empty string, the values a `Like` pattern degrades on.
    pub fn is_empty(&self) -> bool {
        match self {
            Literal::Null => true,
            Literal::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn float(value: f64) -> Self {
        NotNan::new(value).map_or(Literal::Null, Literal::Float)
    }

    pub fn list<T: Into<Literal>>(values: impl IntoIterator<Item = T>) -> Self {
        Literal::List(values.into_iter().map(Into::into).collect())
    }
}

macro_rules! literal_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Literal {
                fn from(value: $source) -> Self {
                    Literal::$variant(value.into())
                }
            }
        )*
    };
}

literal_from!(
    bool => Bool,
    char => Char,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => UInt,
    u16 => UInt,
    u32 => UInt,
    u64 => UInt,
    String => String,
    &str => String,
    NaiveDateTime => DateTime,
    Uuid => Guid,
);

impl From<usize> for Literal {
    fn from(value: usize) -> Self {
        Literal::UInt(value as u64)
    }
}

impl From<f32> for Literal {
    fn from(value: f32) -> Self {
        Literal::float(value.into())
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::float(value)
    }
}

impl From<NaiveDate> for Literal {
    fn from(value: NaiveDate) -> Self {
        Literal::DateTime(value.and_time(NaiveTime::MIN))
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(value: Option<T>) -> Self {
        value.map_or(Literal::Null, Into::into)
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Literal {
    fn from(values: Vec<T>) -> Self {
        Literal::list(values)
    }
}

impl From<Value> for Literal {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Literal::Null,
            Value::Bool(b) => Literal::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Literal::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Literal::UInt(u)
                } else {
                    n.as_f64().map_or(Literal::Null, Literal::float)
                }
            },
            Value::String(s) => Literal::String(s),
            Value::Array(items) => Literal::list(items),
            object @ Value::Object(_) => Literal::String(object.to_string()),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Char(c) => write!(f, "'{}'", c),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::UInt(u) => write!(f, "{}", u),
            Literal::Float(n) => write!(f, "{}", n.into_inner()),
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::DateTime(dt) => write!(f, "{}", dt),
            Literal::Guid(id) => write!(f, "{}", id),
            Literal::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            },
        }
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "Null"),
            Literal::Bool(_) => write!(f, "Bool({})", self),
            Literal::Char(_) => write!(f, "Char({})", self),
            Literal::Int(_) => write!(f, "Int({})", self),
            Literal::UInt(_) => write!(f, "UInt({})", self),
            Literal::Float(_) => write!(f, "Float({})", self),
            Literal::String(_) => write!(f, "String({})", self),
            Literal::DateTime(_) => write!(f, "DateTime({})", self),
            Literal::Guid(_) => write!(f, "Guid({})", self),
            Literal::List(_) => write!(f, "List([{}])", self),
        }
    }
}
