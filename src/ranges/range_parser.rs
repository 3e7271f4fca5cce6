use std::str::FromStr;
use tracing::debug;

use crate::{parser::{ParseError, Scanner}, ranges::Range};

const PARAMETER: &str = "$range";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    Start,
    Minimum,
    MinimumFinal,
    Maximum,
    MaximumFinal,
    Final,
}

/// Per-call parsing state. `pivot` is the (byte, ordinal) start of the bound
/// being read; bound text is trimmed when it is emitted.
#[derive(Debug)]
struct RangeContext<T> {
    state: State,
    parenthesized: bool,
    pivot: Option<(usize, usize)>,
    minimum: Option<T>,
    maximum: Option<T>,
}

impl<T> Default for RangeContext<T> {
    fn default() -> Self {
        Self {
            state: State::Start,
            parenthesized: false,
            pivot: None,
            minimum: None,
            maximum: None,
        }
    }
}

impl<T> RangeContext<T> {
    fn bound<F>(&mut self, scanner: &Scanner, parse: &F) -> Result<Option<T>, ParseError>
    where
        F: Fn(&str) -> Option<T>,
    {
        let Some((start, ordinal)) = self.pivot.take() else {
            return Ok(None);
        };

        let text = scanner.slice_from(start).trim();
        match parse(text) {
            Some(value) => Ok(Some(value)),
            None => ParseError::new("Invalid range value", text.to_string(), ordinal, scanner.parameter).err(),
        }
    }

    fn mark(&mut self, scanner: &Scanner) {
        if self.pivot.is_none() {
            self.pivot = Some((scanner.position, scanner.ordinal()));
        }
    }
}

/// Parser for `min~max`, `(min~max)` and single-value ranges. `*` and `?`
/// stand for an open bound.
pub struct RangeParser;

impl RangeParser {
    pub fn is_open_bound(ch: char) -> bool {
        ch == '*' || ch == '?'
    }

    pub fn parse<T: FromStr + PartialOrd + Clone>(text: &str) -> Result<Range<T>, ParseError> {
        Self::parse_window(text, 0, None)
    }

    pub fn try_parse<T: FromStr + PartialOrd + Clone>(text: &str) -> Option<Range<T>> {
        Self::parse(text).ok()
    }

    pub fn parse_window<T: FromStr + PartialOrd + Clone>(text: &str, start: usize, count: Option<usize>) -> Result<Range<T>, ParseError> {
        let scanner = Scanner::window(text, start, count, PARAMETER)?;
        Self::parse_with(scanner, |bound| bound.parse::<T>().ok())
    }

    /// Runs the range grammar over `scanner`, converting each bound with `parse`.
    pub fn parse_with<T, F>(mut scanner: Scanner, parse: F) -> Result<Range<T>, ParseError>
    where
        T: PartialOrd + Clone,
        F: Fn(&str) -> Option<T>,
    {
        let mut context = RangeContext::default();

        while let Some(current) = scanner.current() {
            match context.state {
                State::Start => {
                    if current == '(' {
                        context.parenthesized = true;
                        context.state = State::Minimum;
                    } else if current == '~' {
                        context.state = State::Maximum;
                    } else if Self::is_open_bound(current) {
                        context.state = State::MinimumFinal;
                    } else if !current.is_whitespace() {
                        context.mark(&scanner);
                        context.state = State::Minimum;
                    }
                },
                State::Minimum => {
                    if current == '~' {
                        context.minimum = context.bound(&scanner, &parse)?;
                        context.state = State::Maximum;
                    } else if Self::is_open_bound(current) && context.pivot.is_none() {
                        context.state = State::MinimumFinal;
                    } else if current == '(' || current == ')' {
                        return scanner.error("Expected range separator '~'").err();
                    } else if !current.is_whitespace() {
                        context.mark(&scanner);
                    }
                },
                State::MinimumFinal => {
                    if current == '~' {
                        context.state = State::Maximum;
                    } else if !current.is_whitespace() {
                        return scanner.error("Expected range separator '~'").err();
                    }
                },
                State::Maximum => {
                    if current == ')' && context.parenthesized {
                        context.maximum = context.bound(&scanner, &parse)?;
                        context.state = State::Final;
                    } else if Self::is_open_bound(current) && context.pivot.is_none() {
                        context.state = State::MaximumFinal;
                    } else if current == '(' || current == ')' || current == '~' {
                        return scanner.error("Illegal character in range maximum").err();
                    } else if !current.is_whitespace() {
                        context.mark(&scanner);
                    }
                },
                State::MaximumFinal => {
                    if current == ')' && context.parenthesized {
                        context.state = State::Final;
                    } else if !current.is_whitespace() {
                        return scanner.error("Unexpected character after open bound").err();
                    }
                },
                State::Final => {
                    if !current.is_whitespace() {
                        return scanner.error("Unexpected character after range").err();
                    }
                },
            }

            scanner.next();
        }

        if context.parenthesized && context.state != State::Final {
            return scanner.error_at_end("Unterminated range, expected ')'").err();
        }

        let range = match context.state {
            State::Start | State::MinimumFinal => Range::empty(),
            State::Minimum => match context.bound(&scanner, &parse)? {
                Some(value) => Range::exact(value),
                None => Range::empty(),
            },
            State::Maximum => {
                let maximum = context.bound(&scanner, &parse)?;
                Range::new(context.minimum, maximum)
            },
            State::MaximumFinal | State::Final => Range::new(context.minimum, context.maximum),
        };

        debug!(empty = range.is_empty(), "range parsed");
        Ok(range)
    }
}
