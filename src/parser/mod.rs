pub mod scanner;
pub use scanner::*;

pub mod parse_error;
pub use parse_error::*;
