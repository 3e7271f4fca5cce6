//! Error types for the query-specification front end.

use crate::parser::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use crate::{CriteriaParser, Error, Result};

    fn criteria_count(text: &str) -> Result<usize> {
        Ok(CriteriaParser::parse(text)?.len())
    }

    #[test]
    fn test_parse_error_converts() {
        match criteria_count("a:1+#") {
            Ok(_) => panic!(),
            Err(Error::Parse(err)) => assert_eq!(err.parameter, "$criteria"),
            Err(err) => panic!("unexpected error {err}"),
        }

        assert_eq!(criteria_count("a:1+b").expect("Failed to parse criteria"), 2);
    }
}
