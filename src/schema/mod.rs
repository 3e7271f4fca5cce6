pub mod paging;
pub use paging::*;

pub mod sorting;
pub use sorting::*;

pub mod schema_mapper;
pub use schema_mapper::*;

pub mod schema_member;
pub use schema_member::*;

pub mod schema;
pub use schema::*;

pub mod schema_parser;
pub use schema_parser::*;
