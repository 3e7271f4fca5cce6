pub mod identifier;
pub use identifier::*;

pub mod literal;
pub use literal::*;

pub mod operators;
pub use operators::*;

pub mod function;
pub use function::*;

pub mod aggregate;
pub use aggregate::*;

pub mod operand;
pub use operand::*;
