use std::fmt::Display;

/// Failure raised by any of the DSL parsers.
///
/// `position` is the 1-based character index of the offending character in
/// the original input (0 when the window itself is invalid) and `parameter`
/// names the strict entry point that raised it (`$criteria`, `$schema`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub text: String,
    pub position: usize,
    pub parameter: &'static str,
}

impl ParseError {
    pub fn new(message: &str, text: String, position: usize, parameter: &'static str) -> Self {
        Self {
            message: message.to_string(),
            text,
            position,
            parameter,
        }
    }

    pub fn argument(message: &str, parameter: &'static str) -> Self {
        Self::new(message, String::new(), 0, parameter)
    }

    pub fn err<T>(self) -> Result<T, ParseError> {
        Err(self)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParseError: {}", self.message)?;
        if self.position > 0 {
            write!(f, "\n  at [{}] -> '{}'", self.position, self.text)?;
        }
        write!(f, " (Parameter '{}')", self.parameter)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use crate::parser::ParseError;

    #[test]
    pub fn test_parse_error_display() {
        let err = ParseError::new("Invalid character", "#".to_string(), 5, "$criteria");

        assert_eq!(err.to_string(), "ParseError: Invalid character\n  at [5] -> '#' (Parameter '$criteria')");
    }

    #[test]
    pub fn test_parse_error_display_without_position() {
        let err = ParseError::argument("The count is out of range", "$schema");

        assert_eq!(err.to_string(), "ParseError: The count is out of range (Parameter '$schema')");
    }
}
