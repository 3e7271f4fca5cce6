pub mod combination;
pub use combination::*;

pub mod condition_operator;
pub use condition_operator::*;

pub mod condition_value;
pub use condition_value::*;

pub mod condition;
pub use condition::*;

pub mod filter;
pub use filter::*;

pub mod condition_collection;
pub use condition_collection::*;
