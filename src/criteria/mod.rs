pub mod criteria_pair;
pub use criteria_pair::*;

pub mod criteria_parser;
pub use criteria_parser::*;
