use tracing::{debug, trace};

use crate::{criteria::CriteriaPair, parser::{ParseError, Scanner}};

const PARAMETER: &str = "$criteria";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    None,
    Key,
    Suspense,
    Value,
}

/// Per-call parsing state.
///
/// Whitespace inside a value is not written to `buffer` right away: the start
/// of the pending run is kept in `whitespace` and the run is copied only when a
/// following non-whitespace character arrives.
#[derive(Debug, Default)]
struct CriteriaContext {
    state: State,
    key: (usize, usize),
    buffer: String,
    whitespace: Option<usize>,
    escaping: bool,
}

impl CriteriaContext {
    fn key<'a>(&self, scanner: &Scanner<'a>) -> &'a str {
        scanner.slice(self.key.0, self.key.1)
    }

    fn emit(&mut self, scanner: &Scanner, pairs: &mut Vec<CriteriaPair>) {
        let key = self.key(scanner).to_string();
        let value = match self.state {
            State::Value => {
                let value = self.buffer.clone();
                self.buffer.clear();
                Some(value)
            },
            _ => None,
        };

        trace!(key = %key, value = ?value, "criteria pair");
        pairs.push(CriteriaPair { key, value });

        self.state = State::None;
        self.whitespace = None;
        self.escaping = false;
    }

    fn flush_whitespace(&mut self, scanner: &Scanner) {
        if let Some(start) = self.whitespace.take() {
            if !self.buffer.is_empty() {
                self.buffer.push_str(scanner.slice_from(start));
            }
        }
    }
}

/// Parser for the `key:value+key:value` criteria shorthand.
pub struct CriteriaParser;

impl CriteriaParser {
    pub fn is_key_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_'
    }

    pub fn is_key_part(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '.'
    }

    pub fn escape(ch: char) -> char {
        match ch {
            't' => '\t',
            'b' => '\u{8}',
            's' => ' ',
            'n' => '\n',
            'r' => '\r',
            other => other,
        }
    }

    pub fn parse(text: &str) -> Result<Vec<CriteriaPair>, ParseError> {
        Self::parse_window(text, 0, None)
    }

    pub fn try_parse(text: &str) -> Option<Vec<CriteriaPair>> {
        Self::parse(text).ok()
    }

    pub fn try_parse_window(text: &str, start: usize, count: Option<usize>) -> Option<Vec<CriteriaPair>> {
        Self::parse_window(text, start, count).ok()
    }

    /// Parses `count` characters of `text` starting at character `start`.
    pub fn parse_window(text: &str, start: usize, count: Option<usize>) -> Result<Vec<CriteriaPair>, ParseError> {
        let mut scanner = Scanner::window(text, start, count, PARAMETER)?;
        let mut context = CriteriaContext {
            buffer: String::with_capacity(scanner.text.len()),
            ..Default::default()
        };
        let mut pairs: Vec<CriteriaPair> = vec![];

        while let Some(current) = scanner.current() {
            match context.state {
                State::None => {
                    if Self::is_key_start(current) {
                        context.key = (scanner.position, scanner.position + current.len_utf8());
                        context.state = State::Key;
                    } else if !current.is_whitespace() && current != '+' {
                        return scanner.error("Illegal character in criteria key").err();
                    }
                },
                State::Key => {
                    if Self::is_key_part(current) {
                        context.key.1 = scanner.position + current.len_utf8();
                    } else if current == ':' {
                        context.state = State::Value;
                    } else if current == '+' {
                        context.emit(&scanner, &mut pairs);
                    } else if current.is_whitespace() {
                        context.state = State::Suspense;
                    } else {
                        return scanner.error_from("Illegal character in criteria key", context.key.0).err();
                    }
                },
                State::Suspense => {
                    if current == ':' {
                        context.state = State::Value;
                    } else if current == '+' {
                        context.emit(&scanner, &mut pairs);
                    } else if !current.is_whitespace() {
                        return scanner.error("Illegal character after criteria key").err();
                    }
                },
                State::Value => {
                    if context.escaping {
                        context.buffer.push(Self::escape(current));
                        context.escaping = false;
                    } else if current == '+' {
                        context.emit(&scanner, &mut pairs);
                    } else if current.is_whitespace() {
                        if context.whitespace.is_none() {
                            context.whitespace = Some(scanner.position);
                        }
                    } else {
                        context.flush_whitespace(&scanner);

                        if current == '\\' {
                            context.escaping = true;
                        } else {
                            context.buffer.push(current);
                        }
                    }
                },
            }

            scanner.next();
        }

        if context.state != State::None {
            context.emit(&scanner, &mut pairs);
        }

        debug!(count = pairs.len(), "criteria parsed");
        Ok(pairs)
    }

    /// Renders pairs back into criteria text; `parse(render(pairs)) == pairs`.
    pub fn render(pairs: &[CriteriaPair]) -> String {
        pairs.iter()
            .map(CriteriaPair::to_string)
            .collect::<Vec<_>>()
            .join("+")
    }
}
