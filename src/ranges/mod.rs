pub mod range;
pub use range::*;

pub mod range_parser;
pub use range_parser::*;

pub mod datetime_range_parser;
pub use datetime_range_parser::*;
