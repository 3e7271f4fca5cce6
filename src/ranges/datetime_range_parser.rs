use chrono::{Datelike, Days, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

use crate::{config::Config, parser::{ParseError, Scanner}, ranges::{Range, RangeParser}};

const PARAMETER: &str = "$datetime";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateFunction {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
    ThisYear,
    LastYear,
    Ago,
    Last,
    Year,
    Month,
    Day,
}

static FUNCTIONS: Lazy<HashMap<&'static str, DateFunction>> = Lazy::new(|| {
    HashMap::from([
        ("today", DateFunction::Today),
        ("yesterday", DateFunction::Yesterday),
        ("thisweek", DateFunction::ThisWeek),
        ("thismonth", DateFunction::ThisMonth),
        ("thisyear", DateFunction::ThisYear),
        ("lastyear", DateFunction::LastYear),
        ("ago", DateFunction::Ago),
        ("last", DateFunction::Last),
        ("year", DateFunction::Year),
        ("month", DateFunction::Month),
        ("day", DateFunction::Day),
    ])
});

/// Calendar unit of an `Ago`/`Last` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl DateUnit {
    /// Unit letters are case-sensitive only for `M` (months) versus `m` (minutes).
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'Y' | 'y' => Some(DateUnit::Years),
            'M' => Some(DateUnit::Months),
            'D' | 'd' => Some(DateUnit::Days),
            'H' | 'h' => Some(DateUnit::Hours),
            'm' => Some(DateUnit::Minutes),
            'S' | 's' => Some(DateUnit::Seconds),
            _ => None,
        }
    }

    fn subtract(self, at: NaiveDateTime, count: u32) -> Option<NaiveDateTime> {
        match self {
            DateUnit::Years => at.checked_sub_months(Months::new(count.checked_mul(12)?)),
            DateUnit::Months => at.checked_sub_months(Months::new(count)),
            DateUnit::Days => at.checked_sub_days(Days::new(count.into())),
            DateUnit::Hours => at.checked_sub_signed(Duration::hours(count.into())),
            DateUnit::Minutes => at.checked_sub_signed(Duration::minutes(count.into())),
            DateUnit::Seconds => at.checked_sub_signed(Duration::seconds(count.into())),
        }
    }

    /// Start of the unit containing `at`.
    fn truncate(self, at: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = at.date();
        match self {
            DateUnit::Years => NaiveDate::from_ymd_opt(date.year(), 1, 1).map(midnight),
            DateUnit::Months => date.with_day(1).map(midnight),
            DateUnit::Days => Some(midnight(date)),
            DateUnit::Hours => at.with_minute(0)?.with_second(0)?.with_nanosecond(0),
            DateUnit::Minutes => at.with_second(0)?.with_nanosecond(0),
            DateUnit::Seconds => at.with_nanosecond(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Argument {
    Number(u32),
    Unit(DateUnit),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    Start,
    Identifier,
    Gap,
    Arguments,
    Final,
}

/// Parser for relative date expressions such as `Today`, `Ago(3, 'M')` or
/// `Month(2020, 2)`.
///
/// Expressions are evaluated when parsed: the result is a closed
/// `[minimum, maximum]` interval relative to the instant passed in (or the
/// local wall clock), never a deferred computation.
pub struct DateTimeRangeParser;

impl DateTimeRangeParser {
    pub fn parse(text: &str) -> Result<Range<NaiveDateTime>, ParseError> {
        Self::parse_with(text, &Config::default())
    }

    pub fn try_parse(text: &str) -> Option<Range<NaiveDateTime>> {
        Self::parse(text).ok()
    }

    pub fn parse_with(text: &str, config: &Config) -> Result<Range<NaiveDateTime>, ParseError> {
        Self::parse_at(text, Local::now().naive_local(), config)
    }

    pub fn parse_at(text: &str, now: NaiveDateTime, config: &Config) -> Result<Range<NaiveDateTime>, ParseError> {
        Self::parse_window_at(text, 0, None, now, config)
    }

    pub fn parse_window_at(
        text: &str,
        start: usize,
        count: Option<usize>,
        now: NaiveDateTime,
        config: &Config,
    ) -> Result<Range<NaiveDateTime>, ParseError> {
        let mut scanner = Scanner::window(text, start, count, PARAMETER)?;
        let mut state = State::Start;
        let mut identifier = (0, 0, 0);
        let mut arguments = (0, 0, 0);

        while let Some(current) = scanner.current() {
            match state {
                State::Start => {
                    if current.is_alphabetic() {
                        identifier = (scanner.position, scanner.position, scanner.ordinal());
                        state = State::Identifier;
                    } else if !current.is_whitespace() {
                        return scanner.error("Expected a date function name").err();
                    }
                },
                State::Identifier => {
                    if current == '(' {
                        identifier.1 = scanner.position;
                        arguments = (scanner.position + 1, scanner.position + 1, scanner.ordinal() + 1);
                        state = State::Arguments;
                    } else if current.is_whitespace() {
                        identifier.1 = scanner.position;
                        state = State::Gap;
                    } else if !current.is_alphabetic() {
                        return scanner.error_from("Illegal character in date function name", identifier.0).err();
                    }
                },
                State::Gap => {
                    if current == '(' {
                        arguments = (scanner.position + 1, scanner.position + 1, scanner.ordinal() + 1);
                        state = State::Arguments;
                    } else if !current.is_whitespace() {
                        return scanner.error("Expected '(' or end of expression").err();
                    }
                },
                State::Arguments => {
                    if current == ')' {
                        arguments.1 = scanner.position;
                        state = State::Final;
                    } else if current == '(' {
                        return scanner.error("Nested parentheses are not allowed").err();
                    }
                },
                State::Final => {
                    if !current.is_whitespace() {
                        return scanner.error("Unexpected character after date function").err();
                    }
                },
            }

            scanner.next();
        }

        match state {
            State::Start => return scanner.error_at_end("Empty date expression").err(),
            State::Arguments => return scanner.error_at_end("Unterminated argument list, expected ')'").err(),
            State::Identifier => identifier.1 = scanner.text.len(),
            _ => {},
        }

        let name = scanner.slice(identifier.0, identifier.1);
        let Some(function) = FUNCTIONS.get(name.to_lowercase().as_str()).copied() else {
            return ParseError::new("Unknown date function", name.to_string(), identifier.2, PARAMETER).err();
        };

        let parsed = Self::arguments(scanner.slice(arguments.0, arguments.1))
            .map_err(|(message, offset)| ParseError::new(message, String::new(), arguments.2 + offset, PARAMETER))?;

        let range = Self::evaluate(function, &parsed, now, config)
            .map_err(|message| ParseError::new(message, name.to_string(), identifier.2, PARAMETER))?;

        debug!(function = ?function, minimum = ?range.minimum, maximum = ?range.maximum, "date range resolved");
        Ok(range)
    }

    /// Accepts either a date function or a plain `min~max` range of ISO-8601
    /// dates and date-times.
    pub fn parse_any(text: &str) -> Result<Range<NaiveDateTime>, ParseError> {
        Self::parse_any_at(text, Local::now().naive_local(), &Config::default())
    }

    pub fn parse_any_at(text: &str, now: NaiveDateTime, config: &Config) -> Result<Range<NaiveDateTime>, ParseError> {
        match text.trim_start().chars().next() {
            Some(first) if first.is_alphabetic() => Self::parse_at(text, now, config),
            _ => RangeParser::parse_with(Scanner::new(text, PARAMETER), Self::date_time),
        }
    }

    fn date_time(text: &str) -> Option<NaiveDateTime> {
        text.parse::<NaiveDateTime>().ok()
            .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").ok())
            .or_else(|| text.parse::<NaiveDate>().ok().map(midnight))
    }

    /// Splits `3, 'M'`, `3M` or `2020, 2` into numbers and unit letters.
    /// Errors carry the character offset inside the argument list.
    fn arguments(text: &str) -> Result<Vec<Argument>, (&'static str, usize)> {
        let chars: Vec<char> = text.chars().collect();
        let mut arguments = vec![];
        let mut index = 0;

        while index < chars.len() {
            let current = chars[index];

            if current.is_whitespace() || current == ',' {
                index += 1;
            } else if current.is_ascii_digit() {
                let start = index;
                while index < chars.len() && chars[index].is_ascii_digit() {
                    index += 1;
                }
                let digits: String = chars[start..index].iter().collect();
                let number = digits.parse::<u32>().map_err(|_| ("Number out of range", start))?;
                arguments.push(Argument::Number(number));
            } else if current == '\'' || current == '"' {
                let unit = chars.get(index + 1).and_then(|letter| DateUnit::from_letter(*letter));
                match (unit, chars.get(index + 2)) {
                    (Some(unit), Some(quote)) if *quote == current => arguments.push(Argument::Unit(unit)),
                    (Some(_), _) => return Err(("Unterminated unit literal", index)),
                    (None, _) => return Err(("Unknown date unit", index + 1)),
                }
                index += 3;
            } else if let Some(unit) = DateUnit::from_letter(current) {
                if chars.get(index + 1).is_some_and(|next| next.is_alphanumeric()) {
                    return Err(("Unknown date unit", index));
                }
                arguments.push(Argument::Unit(unit));
                index += 1;
            } else {
                return Err(("Illegal character in arguments", index));
            }
        }

        Ok(arguments)
    }

    fn evaluate(
        function: DateFunction,
        arguments: &[Argument],
        now: NaiveDateTime,
        config: &Config,
    ) -> Result<Range<NaiveDateTime>, &'static str> {
        let today = now.date();

        match (function, arguments) {
            (DateFunction::Today, []) => day_range(today),
            (DateFunction::Yesterday, []) => day_range(today.pred_opt().ok_or(OUT_OF_RANGE)?),
            (DateFunction::ThisWeek, []) => {
                let first = config.first_day_of_week.num_days_from_monday();
                let offset = (today.weekday().num_days_from_monday() + 7 - first) % 7;
                let start = today.checked_sub_days(Days::new(offset.into())).ok_or(OUT_OF_RANGE)?;
                period(start, start.checked_add_days(Days::new(7)))
            },
            (DateFunction::ThisMonth, []) => month_range(today.year(), today.month()),
            (DateFunction::ThisYear, []) => year_range(today.year()),
            (DateFunction::LastYear, []) => year_range(today.year() - 1),
            (DateFunction::Ago | DateFunction::Last, [Argument::Number(count), rest @ ..]) => {
                let unit = match rest {
                    [] => DateUnit::Days,
                    [Argument::Unit(unit)] => *unit,
                    _ => return Err("Expected a count and an optional unit"),
                };
                let start = unit.subtract(now, *count).ok_or(OUT_OF_RANGE)?;
                let start = match function {
                    DateFunction::Last => unit.truncate(start).ok_or(OUT_OF_RANGE)?,
                    _ => start,
                };
                Ok(Range::new(Some(start), Some(now)))
            },
            (DateFunction::Ago | DateFunction::Last, _) => Err("Expected a count and an optional unit"),
            (DateFunction::Year, [Argument::Number(year)]) => year_range(to_year(*year)?),
            (DateFunction::Month, [Argument::Number(year), Argument::Number(month)]) => month_range(to_year(*year)?, *month),
            (DateFunction::Day, [Argument::Number(year), Argument::Number(month), Argument::Number(day)]) => {
                day_range(NaiveDate::from_ymd_opt(to_year(*year)?, *month, *day).ok_or(INVALID_DATE)?)
            },
            (DateFunction::Year | DateFunction::Month | DateFunction::Day, _) => Err("Expected numeric date parts"),
            _ => Err("Date function takes no arguments"),
        }
    }
}

const OUT_OF_RANGE: &str = "Date out of range";
const INVALID_DATE: &str = "Invalid date";

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn to_year(year: u32) -> Result<i32, &'static str> {
    i32::try_from(year).map_err(|_| OUT_OF_RANGE)
}

/// `[start, next - 1ms]` for the period that begins at `start`.
fn period(start: NaiveDate, next: Option<NaiveDate>) -> Result<Range<NaiveDateTime>, &'static str> {
    let next = next.ok_or(OUT_OF_RANGE)?;
    let end = midnight(next).checked_sub_signed(Duration::milliseconds(1)).ok_or(OUT_OF_RANGE)?;
    Ok(Range::new(Some(midnight(start)), Some(end)))
}

fn day_range(date: NaiveDate) -> Result<Range<NaiveDateTime>, &'static str> {
    period(date, date.succ_opt())
}

fn month_range(year: i32, month: u32) -> Result<Range<NaiveDateTime>, &'static str> {
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(INVALID_DATE)?;
    period(start, start.checked_add_months(Months::new(1)))
}

fn year_range(year: i32) -> Result<Range<NaiveDateTime>, &'static str> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(INVALID_DATE)?;
    period(start, start.checked_add_months(Months::new(12)))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};

    use crate::{config::Config, ranges::{DateTimeRangeParser, Range}};

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .expect("Invalid test date")
    }

    fn end_of(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_milli_opt(23, 59, 59, 999))
            .expect("Invalid test date")
    }

    fn now() -> NaiveDateTime {
        // Wednesday
        at(2024, 3, 13, 15, 42, 10)
    }

    fn parse(text: &str) -> Range<NaiveDateTime> {
        DateTimeRangeParser::parse_at(text, now(), &Config::default()).expect("Failed to parse date range")
    }

    #[test]
    pub fn test_year_is_independent_of_now() {
        let range = parse("Year(2020)");

        assert_eq!(range.minimum, Some(at(2020, 1, 1, 0, 0, 0)));
        assert_eq!(range.maximum, Some(end_of(2020, 12, 31)));

        let live = DateTimeRangeParser::parse("Year(2020)").expect("Failed to parse date range");
        assert_eq!(live, range);
    }

    #[test]
    pub fn test_month_and_day() {
        let month = parse("Month(2024, 2)");
        let day = parse("day (2024,2,29)");

        assert_eq!(month.minimum, Some(at(2024, 2, 1, 0, 0, 0)));
        assert_eq!(month.maximum, Some(end_of(2024, 2, 29)));
        assert_eq!(day.minimum, Some(at(2024, 2, 29, 0, 0, 0)));
        assert_eq!(day.maximum, Some(end_of(2024, 2, 29)));
    }

    #[test]
    pub fn test_named_periods() {
        assert_eq!(parse("Today"), Range::new(Some(at(2024, 3, 13, 0, 0, 0)), Some(end_of(2024, 3, 13))));
        assert_eq!(parse("yesterday()"), Range::new(Some(at(2024, 3, 12, 0, 0, 0)), Some(end_of(2024, 3, 12))));
        assert_eq!(parse("ThisMonth"), Range::new(Some(at(2024, 3, 1, 0, 0, 0)), Some(end_of(2024, 3, 31))));
        assert_eq!(parse("THISYEAR"), Range::new(Some(at(2024, 1, 1, 0, 0, 0)), Some(end_of(2024, 12, 31))));
        assert_eq!(parse("LastYear()"), Range::new(Some(at(2023, 1, 1, 0, 0, 0)), Some(end_of(2023, 12, 31))));
    }

    #[test]
    pub fn test_this_week_follows_first_day() {
        assert_eq!(parse("ThisWeek"), Range::new(Some(at(2024, 3, 11, 0, 0, 0)), Some(end_of(2024, 3, 17))));

        let sunday = Config::with_first_day_of_week(Weekday::Sun);
        let range = DateTimeRangeParser::parse_at("ThisWeek", now(), &sunday).expect("Failed to parse date range");

        assert_eq!(range, Range::new(Some(at(2024, 3, 10, 0, 0, 0)), Some(end_of(2024, 3, 16))));
    }

    #[test]
    pub fn test_ago_forms() {
        let expected = Range::new(Some(at(2023, 12, 13, 15, 42, 10)), Some(now()));

        assert_eq!(parse("Ago(3M)"), expected);
        assert_eq!(parse("Ago(3,M)"), expected);
        assert_eq!(parse("Ago(3, 'M')"), expected);
        assert_eq!(parse("ago(3, \"M\")"), expected);
        assert_eq!(parse("Ago(2)"), Range::new(Some(at(2024, 3, 11, 15, 42, 10)), Some(now())));
        assert_eq!(parse("Ago(90,m)"), Range::new(Some(at(2024, 3, 13, 14, 12, 10)), Some(now())));
    }

    #[test]
    pub fn test_last_truncates_to_unit() {
        assert_eq!(parse("Last(1,'Y')"), Range::new(Some(at(2023, 1, 1, 0, 0, 0)), Some(now())));
        assert_eq!(parse("Last(2M)"), Range::new(Some(at(2024, 1, 1, 0, 0, 0)), Some(now())));
        assert_eq!(parse("Last(1)"), Range::new(Some(at(2024, 3, 12, 0, 0, 0)), Some(now())));
        assert_eq!(parse("Last(3h)"), Range::new(Some(at(2024, 3, 13, 12, 0, 0)), Some(now())));
    }

    #[test]
    pub fn test_evaluation_is_eager() {
        let first = parse("Ago(1,'Y')");
        let later = DateTimeRangeParser::parse_at("Ago(1,'Y')", now() + Duration::seconds(1), &Config::default())
            .expect("Failed to parse date range");

        assert_eq!(later.minimum.zip(first.minimum).map(|(l, f)| l - f), Some(Duration::seconds(1)));
        assert_eq!(later.maximum.zip(first.maximum).map(|(l, f)| l - f), Some(Duration::seconds(1)));

        let before = chrono::Local::now().naive_local();
        let live = DateTimeRangeParser::parse("Ago(1,'Y')").expect("Failed to parse date range");
        let after = chrono::Local::now().naive_local();

        assert!(live.maximum.is_some_and(|maximum| before <= maximum && maximum <= after));
    }

    #[test]
    pub fn test_unknown_function() {
        let result = DateTimeRangeParser::parse_at("  Tomorrow", now(), &Config::default());

        match result {
            Ok(_) => panic!(),
            Err(err) => {
                assert_eq!(err.message, "Unknown date function");
                assert_eq!(err.text, "Tomorrow");
                assert_eq!(err.position, 3);
                assert_eq!(err.parameter, "$datetime");
            },
        }
    }

    #[test]
    pub fn test_argument_errors() {
        let result = DateTimeRangeParser::parse_at("Ago(3, 'Q')", now(), &Config::default());

        match result {
            Ok(_) => panic!(),
            Err(err) => {
                assert_eq!(err.message, "Unknown date unit");
                assert_eq!(err.position, 9);
            },
        }

        let result = DateTimeRangeParser::parse_at("Today(1)", now(), &Config::default());

        match result {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.message, "Date function takes no arguments"),
        }

        assert!(DateTimeRangeParser::parse_at("Month(2020, 13)", now(), &Config::default()).is_err());
        assert!(DateTimeRangeParser::parse_at("Ago()", now(), &Config::default()).is_err());
        assert!(DateTimeRangeParser::parse_at("Ago(M)", now(), &Config::default()).is_err());
    }

    #[test]
    pub fn test_structural_errors() {
        assert!(DateTimeRangeParser::try_parse("").is_none());
        assert!(DateTimeRangeParser::try_parse("Ago(3").is_none());
        assert!(DateTimeRangeParser::try_parse("Today() x").is_none());
        assert!(DateTimeRangeParser::try_parse("Today x").is_none());
        assert!(DateTimeRangeParser::try_parse("To-day").is_none());
    }

    #[test]
    pub fn test_parse_any_falls_back_to_plain_range() {
        let range = DateTimeRangeParser::parse_any_at("2020-01-01~2020-06-30 12:00:00", now(), &Config::default())
            .expect("Failed to parse date range");

        assert_eq!(range.minimum, Some(at(2020, 1, 1, 0, 0, 0)));
        assert_eq!(range.maximum, Some(at(2020, 6, 30, 12, 0, 0)));

        let relative = DateTimeRangeParser::parse_any_at("Year(2021)", now(), &Config::default())
            .expect("Failed to parse date range");

        assert_eq!(relative.minimum, Some(at(2021, 1, 1, 0, 0, 0)));
    }
}
