use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::{fmt, ops};
use uuid::Uuid;

use crate::{conditions::Filter, expressions::{Aggregate, AggregateFunction, BinaryOperator, CastTarget, Function, Identifier, Literal, UnaryOperator}};

/// Node of a value-expression tree.
///
/// Operands are immutable values; equality and hashing are structural, with
/// field, function and aggregate member names compared without regard to case.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    Field(Identifier),
    Constant(Literal),
    Function(Function),
    Aggregate(Aggregate),
    Binary { operator: BinaryOperator, left: Box<Operand>, right: Box<Operand> },
    Unary { operator: UnaryOperator, operand: Box<Operand> },
}

impl Operand {
    pub fn field(name: &str) -> Self {
        Operand::Field(name.into())
    }

    pub fn constant(value: impl Into<Literal>) -> Self {
        Operand::Constant(value.into())
    }

    pub fn from_literal(literal: Literal) -> Self {
        Operand::Constant(literal)
    }

    pub fn function(name: &str, arguments: Vec<Operand>) -> Self {
        Operand::Function(Function::new(name, arguments))
    }

    pub fn cast(value: impl Into<Operand>, target: CastTarget) -> Self {
        Operand::Function(Function::cast(value.into(), target))
    }

    /// `IsNull(operand, replacement)`: the replacement when `operand` is null.
    pub fn is_null(operand: impl Into<Operand>, replacement: impl Into<Operand>) -> Self {
        Operand::function(Function::IS_NULL, vec![operand.into(), replacement.into()])
    }

    pub fn binary(operator: BinaryOperator, left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Operand::Binary {
            operator,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    pub fn unary(operator: UnaryOperator, operand: impl Into<Operand>) -> Self {
        Operand::Unary { operator, operand: Box::new(operand.into()) }
    }

    pub fn aggregate(function: AggregateFunction, member: &str, filter: Option<Filter>, distinct: bool) -> Self {
        Operand::Aggregate(Aggregate {
            function,
            member: member.into(),
            filter: filter.map(Box::new),
            distinct,
        })
    }

    /// Aggregate over `member`, wrapped in `IsNull(aggregate, default)` when a default is given.
    pub fn aggregate_or(function: AggregateFunction, member: &str, default: Option<Literal>) -> Self {
        let aggregate = Operand::aggregate(function, member, None, false);

        match default {
            Some(default) => Operand::is_null(aggregate, Operand::Constant(default)),
            None => aggregate,
        }
    }

    pub fn count(member: &str, default: Option<Literal>) -> Self {
        Operand::aggregate_or(AggregateFunction::Count, member, default)
    }

    pub fn sum(member: &str, default: Option<Literal>) -> Self {
        Operand::aggregate_or(AggregateFunction::Sum, member, default)
    }

    pub fn average(member: &str, default: Option<Literal>) -> Self {
        Operand::aggregate_or(AggregateFunction::Average, member, default)
    }

    pub fn median(member: &str, default: Option<Literal>) -> Self {
        Operand::aggregate_or(AggregateFunction::Median, member, default)
    }

    pub fn maximum(member: &str, default: Option<Literal>) -> Self {
        Operand::aggregate_or(AggregateFunction::Maximum, member, default)
    }

    pub fn minimum(member: &str, default: Option<Literal>) -> Self {
        Operand::aggregate_or(AggregateFunction::Minimum, member, default)
    }

    pub fn deviation(member: &str, default: Option<Literal>) -> Self {
        Operand::aggregate_or(AggregateFunction::Deviation, member, default)
    }

    pub fn deviation_population(member: &str, default: Option<Literal>) -> Self {
        Operand::aggregate_or(AggregateFunction::DeviationPopulation, member, default)
    }

    pub fn variance(member: &str, default: Option<Literal>) -> Self {
        Operand::aggregate_or(AggregateFunction::Variance, member, default)
    }

    pub fn variance_population(member: &str, default: Option<Literal>) -> Self {
        Operand::aggregate_or(AggregateFunction::VariancePopulation, member, default)
    }

    /// Field name when this operand is a field reference.
    pub fn name(&self) -> Option<&str> {
        match self {
            Operand::Field(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn is_null_constant(&self) -> bool {
        matches!(self, Operand::Constant(Literal::Null))
    }
}

impl From<&str> for Operand {
    fn from(name: &str) -> Self {
        Operand::field(name)
    }
}

impl From<String> for Operand {
    fn from(name: String) -> Self {
        Operand::Field(name.into())
    }
}

impl From<Identifier> for Operand {
    fn from(name: Identifier) -> Self {
        Operand::Field(name)
    }
}

impl From<Literal> for Operand {
    fn from(literal: Literal) -> Self {
        Operand::Constant(literal)
    }
}

impl From<Function> for Operand {
    fn from(function: Function) -> Self {
        Operand::Function(function)
    }
}

impl From<Aggregate> for Operand {
    fn from(aggregate: Aggregate) -> Self {
        Operand::Aggregate(aggregate)
    }
}

macro_rules! operand_from_literal {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for Operand {
                fn from(value: $source) -> Self {
                    Operand::Constant(value.into())
                }
            }
        )*
    };
}

operand_from_literal!(bool, char, i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, NaiveDateTime, NaiveDate, Uuid);

macro_rules! operand_binary_ops {
    ($($trait:ident :: $method:ident => $operator:ident),* $(,)?) => {
        $(
            impl<T: Into<Operand>> ops::$trait<T> for Operand {
                type Output = Operand;

                fn $method(self, rhs: T) -> Operand {
                    Operand::binary(BinaryOperator::$operator, self, rhs)
                }
            }
        )*
    };
}

operand_binary_ops!(
    Add::add => Add,
    Sub::sub => Subtract,
    Mul::mul => Multiply,
    Div::div => Divide,
    Rem::rem => Modulo,
    BitAnd::bitand => And,
    BitOr::bitor => Or,
    BitXor::bitxor => Xor,
);

impl ops::Neg for Operand {
    type Output = Operand;

    fn neg(self) -> Operand {
        Operand::unary(UnaryOperator::Negate, self)
    }
}

impl ops::Not for Operand {
    type Output = Operand;

    fn not(self) -> Operand {
        Operand::unary(UnaryOperator::Not, self)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(name) => write!(f, "{}", name),
            Operand::Constant(literal) => write!(f, "{}", literal),
            Operand::Function(function) => write!(f, "{}", function),
            Operand::Aggregate(aggregate) => write!(f, "{}", aggregate),
            Operand::Binary { operator, left, right } => write!(f, "({} {} {})", left, operator, right),
            Operand::Unary { operator, operand } => write!(f, "{}{}", operator, operand),
        }
    }
}

impl fmt::Debug for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(_) => write!(f, "Field({})", self),
            Operand::Constant(literal) => write!(f, "Constant({:?})", literal),
            Operand::Function(_) => write!(f, "Function({})", self),
            Operand::Aggregate(_) => write!(f, "Aggregate({})", self),
            Operand::Binary { .. } => write!(f, "Binary{}", self),
            Operand::Unary { .. } => write!(f, "Unary({})", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::{conditions::Condition, expressions::{Aggregate, AggregateFunction, BinaryOperator, CastTarget, DbType, Literal, Operand, UnaryOperator}};

    #[test]
    fn test_operand_arithmetic_tree() {
        let operand = Operand::field("price") * Operand::field("quantity") - 5;

        match &operand {
            Operand::Binary { operator, left, right } => {
                assert_eq!(*operator, BinaryOperator::Subtract);
                assert_eq!(**right, Operand::constant(5));
                match left.as_ref() {
                    Operand::Binary { operator, .. } => assert_eq!(*operator, BinaryOperator::Multiply),
                    _ => panic!(),
                }
            },
            _ => panic!(),
        }

        assert_eq!(operand.to_string(), "((price * quantity) - 5)");
    }

    #[test]
    fn test_operand_unary() {
        let operand = -Operand::field("balance");

        match &operand {
            Operand::Unary { operator, operand } => {
                assert_eq!(*operator, UnaryOperator::Negate);
                assert_eq!(operand.name(), Some("balance"));
            },
            _ => panic!(),
        }

        assert_eq!((!Operand::field("flag")).to_string(), "!flag");
    }

    #[test]
    fn test_operand_equality_ignores_name_case() {
        let a = Operand::field("Amount") + Operand::function("Round", vec![Operand::field("Tax")]);
        let b = Operand::field("amount") + Operand::function("ROUND", vec![Operand::field("tax")]);

        assert_eq!(a, b);

        let set: HashSet<Operand> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_operand_constants_are_case_sensitive() {
        assert_ne!(Operand::constant("Abc"), Operand::constant("abc"));
    }

    #[test]
    fn test_operand_aggregate_with_default() {
        let operand = Operand::sum("Amount", Some(Literal::from(0)));

        match &operand {
            Operand::Function(function) => {
                assert!(function.name.is("IsNull"));
                assert_eq!(function.arguments.len(), 2);
                assert_eq!(function.arguments[0], Operand::Aggregate(Aggregate::new(AggregateFunction::Sum, "amount")));
                assert_eq!(function.arguments[1], Operand::constant(0));
            },
            _ => panic!(),
        }

        assert_eq!(operand.to_string(), "IsNull(Sum(Amount), 0)");
    }

    #[test]
    fn test_operand_aggregate_without_default() {
        let operand = Operand::count("*", None);

        assert_eq!(operand, Operand::Aggregate(Aggregate::new(AggregateFunction::Count, "*")));
        assert_eq!(operand.to_string(), "Count(*)");
    }

    #[test]
    fn test_operand_aggregate_distinct_with_filter() {
        let aggregate = Aggregate::new(AggregateFunction::Count, "UserId")
            .distinct()
            .filter(Condition::equal("Enabled", true));

        assert_eq!(Operand::from(aggregate).to_string(), "Count(DISTINCT UserId) WHERE Enabled == true");
    }

    #[test]
    fn test_operand_all_aggregate_shortcuts() {
        let shortcuts = [
            (Operand::average("x", None), AggregateFunction::Average),
            (Operand::median("x", None), AggregateFunction::Median),
            (Operand::maximum("x", None), AggregateFunction::Maximum),
            (Operand::minimum("x", None), AggregateFunction::Minimum),
            (Operand::deviation("x", None), AggregateFunction::Deviation),
            (Operand::deviation_population("x", None), AggregateFunction::DeviationPopulation),
            (Operand::variance("x", None), AggregateFunction::Variance),
            (Operand::variance_population("x", None), AggregateFunction::VariancePopulation),
        ];

        for (operand, expected) in shortcuts {
            match operand {
                Operand::Aggregate(aggregate) => assert_eq!(aggregate.function, expected),
                _ => panic!(),
            }
        }
    }

    #[test]
    fn test_operand_cast() {
        let decimal = Operand::cast("Price", CastTarget::new(DbType::Decimal).with_precision(18, 2));
        let text = Operand::cast("Birthday", CastTarget::new(DbType::String).with_length(10).with_style("yyyy-MM-dd"));

        assert_eq!(decimal.to_string(), "Cast(Price AS Decimal(18,2))");
        assert_eq!(text.to_string(), "Cast(Birthday AS String(10), yyyy-MM-dd)");
        assert_ne!(decimal, Operand::cast("Price", CastTarget::new(DbType::Decimal).with_precision(18, 4)));
    }

    #[test]
    fn test_operand_serde() {
        let operand = Operand::field("a") % 2 ^ Operand::constant(true);
        let json = serde_json::to_string(&operand).expect("Failed to serialize");

        let back: Operand = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(back, operand);
    }
}
