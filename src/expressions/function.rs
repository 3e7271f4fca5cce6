use serde::{Deserialize, Serialize};
use std::fmt;

use crate::expressions::{Identifier, Operand};

/// Storage types a `Cast` can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DbType {
    AnsiString,
    AnsiStringFixedLength,
    String,
    StringFixedLength,
    Binary,
    Boolean,
    Byte,
    SByte,
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Single,
    Double,
    Decimal,
    Currency,
    Date,
    Time,
    DateTime,
    DateTimeOffset,
    Guid,
    Xml,
    Object,
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Size part of a cast target: a length for character/binary types, or a
/// precision and scale for exact numerics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastSize {
    #[default]
    Unspecified,
    Length(u32),
    Precision { precision: u8, scale: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastTarget {
    pub db_type: DbType,
    pub size: CastSize,
    pub style: Option<String>,
}

impl CastTarget {
    pub fn new(db_type: DbType) -> Self {
        Self { db_type, size: CastSize::Unspecified, style: None }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.size = CastSize::Length(length);
        self
    }

    pub fn with_precision(mut self, precision: u8, scale: u8) -> Self {
        self.size = CastSize::Precision { precision, scale };
        self
    }

    pub fn with_style(mut self, style: &str) -> Self {
        self.style = Some(style.to_string());
        self
    }
}

impl fmt::Display for CastTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.db_type)?;
        match self.size {
            CastSize::Unspecified => Ok(()),
            CastSize::Length(length) => write!(f, "({})", length),
            CastSize::Precision { precision, scale } => write!(f, "({},{})", precision, scale),
        }
    }
}

/// Named function call; a `Cast` is a call named `Cast` carrying its target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Function {
    pub name: Identifier,
    pub arguments: Vec<Operand>,
    pub cast: Option<CastTarget>,
}

impl Function {
    pub const CAST: &'static str = "Cast";
    pub const IS_NULL: &'static str = "IsNull";

    pub fn new(name: &str, arguments: Vec<Operand>) -> Self {
        Self { name: name.into(), arguments, cast: None }
    }

    pub fn cast(value: Operand, target: CastTarget) -> Self {
        Self { name: Self::CAST.into(), arguments: vec![value], cast: Some(target) }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (index, argument) in self.arguments.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", argument)?;
        }

        if let Some(target) = &self.cast {
            write!(f, " AS {}", target)?;
            if let Some(style) = &target.style {
                write!(f, ", {}", style)?;
            }
        }

        f.write_str(")")
    }
}
