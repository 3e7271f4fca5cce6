use crate::parser::ParseError;

/// Character cursor over a window of the input text.
///
/// All four DSL parsers walk their input once through a `Scanner`. The cursor
/// keeps both the byte offset (to slice the input without copying) and the
/// absolute character index (to report 1-based error positions).
#[derive(Debug)]
pub struct Scanner<'a> {
    pub text: &'a str,
    pub position: usize,
    pub index: usize,
    pub parameter: &'static str,
    offset: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str, parameter: &'static str) -> Self {
        Self {
            text,
            position: 0,
            index: 0,
            parameter,
            offset: 0,
        }
    }

    /// Builds a scanner over `count` characters of `text` starting at character `start`.
    /// A `count` of `None` runs to the end of the input.
    pub fn window(text: &'a str, start: usize, count: Option<usize>, parameter: &'static str) -> Result<Self, ParseError> {
        let total = text.chars().count();
        if start > total {
            return Err(ParseError::argument("The start index is out of range", parameter));
        }

        let count = match count {
            Some(count) if start.checked_add(count).is_none_or(|end| end > total) => {
                return Err(ParseError::argument("The count is out of range", parameter));
            },
            Some(count) => count,
            None => total - start,
        };

        let begin = byte_offset(text, start);
        let end = begin + byte_offset(&text[begin..], count);

        Ok(Self {
            text: &text[begin..end],
            position: 0,
            index: 0,
            parameter,
            offset: start,
        })
    }

    pub fn eof(&self) -> bool {
        self.position >= self.text.len()
    }

    pub fn current(&self) -> Option<char> {
        self.text[self.position..].chars().next()
    }

    pub fn peek(&self) -> Option<char> {
        let mut chars = self.text[self.position..].chars();
        chars.next();
        chars.next()
    }

    pub fn next(&mut self) {
        if let Some(current) = self.current() {
            self.position += current.len_utf8();
            self.index += 1;
        }
    }

    pub fn next_non_whitespace(&mut self) {
        while self.current().is_some_and(char::is_whitespace) {
            self.next();
        }
    }

    /// Slice of the window between two byte offsets.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[start..end.min(self.text.len())]
    }

    pub fn slice_from(&self, pivot: usize) -> &'a str {
        self.slice(pivot, self.position)
    }

    /// 1-based index of the current character within the original input.
    pub fn ordinal(&self) -> usize {
        self.offset + self.index + 1
    }

    /// Error located at the current character.
    pub fn error(&self, message: &str) -> ParseError {
        let text = self.current().map(String::from).unwrap_or_default();
        ParseError::new(message, text, self.ordinal(), self.parameter)
    }

    /// Error located at the current character whose fragment starts at `pivot`.
    pub fn error_from(&self, message: &str, pivot: usize) -> ParseError {
        let end = self.position + self.current().map_or(0, char::len_utf8);
        ParseError::new(message, self.slice(pivot, end).to_string(), self.ordinal(), self.parameter)
    }

    /// Error reported once the whole window has been consumed.
    pub fn error_at_end(&self, message: &str) -> ParseError {
        ParseError::new(message, String::new(), self.offset + self.index, self.parameter)
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(offset, _)| offset)
}

#[cfg(test)]
mod tests {
    use crate::parser::Scanner;

    #[test]
    pub fn test_scanner_walks_characters() {
        let mut scanner = Scanner::new("aé b", "$test");

        assert_eq!(scanner.current(), Some('a'));
        scanner.next();
        assert_eq!(scanner.current(), Some('é'));
        assert_eq!(scanner.peek(), Some(' '));
        scanner.next();
        scanner.next_non_whitespace();
        assert_eq!(scanner.current(), Some('b'));
        assert_eq!(scanner.ordinal(), 4);
        scanner.next();
        assert!(scanner.eof());
        assert_eq!(scanner.current(), None);
    }

    #[test]
    pub fn test_scanner_window() {
        let scanner = Scanner::window("0123456789", 2, Some(3), "$test").expect("Failed to build window");

        assert_eq!(scanner.text, "234");
        assert_eq!(scanner.ordinal(), 3);
    }

    #[test]
    pub fn test_scanner_window_to_end() {
        let scanner = Scanner::window("abcdef", 4, None, "$test").expect("Failed to build window");

        assert_eq!(scanner.text, "ef");
    }

    #[test]
    pub fn test_scanner_window_out_of_range() {
        let result = Scanner::window("abc", 2, Some(5), "$test");

        match result {
            Ok(_) => panic!(),
            Err(err) => {
                assert_eq!(err.parameter, "$test");
                assert_eq!(err.position, 0);
            },
        }
    }

    #[test]
    pub fn test_scanner_window_count_overflow() {
        let result = Scanner::window("abc", 1, Some(usize::MAX), "$test");

        match result {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.message, "The count is out of range"),
        }
    }

    #[test]
    pub fn test_scanner_error_from_pivot() {
        let mut scanner = Scanner::new("name#", "$test");
        for _ in 0..4 {
            scanner.next();
        }

        let err = scanner.error_from("Invalid text", 0);

        assert_eq!(err.text, "name#");
        assert_eq!(err.position, 5);
    }
}
