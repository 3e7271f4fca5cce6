use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::{parser::{ParseError, Scanner}, schema::{Paging, Schema, SchemaMapper, SchemaMember, SchemaToken, Sorting}};

const PARAMETER: &str = "$schema";

type Level<T> = IndexMap<String, SchemaMember<T>>;

/// Lowercased member keys from the root down to a member.
type Address = Vec<String>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    None,
    Asterisk,
    Exclude,
    Include,
    Included,
    PagingCount,
    PagingSize,
    SortingField,
}

/// How far the current entry has got through `name:paging(sorting){group}`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    #[default]
    Named,
    Paged,
    Sorted,
    Grouped,
}

/// One open `{` group.
#[derive(Debug)]
enum Frame {
    /// Entries apply to the children of each of these members.
    Members(Vec<Address>),
    /// The group belongs to a name that mapped to nothing; entries are
    /// syntax-checked only.
    Ignores,
}

struct SchemaContext<T, M> {
    state: State,
    stage: Stage,
    stack: Vec<Frame>,
    root: Level<T>,
    current: Vec<Address>,
    cache: HashMap<(String, String), Vec<T>>,
    mapper: M,
    pivot: Option<usize>,
    end: usize,
    ended: bool,
    clear_all: bool,
    descending: bool,
    placeholder: bool,
    number: Option<usize>,
    size: Option<usize>,
}

fn member_mut<'a, T>(level: &'a mut Level<T>, address: &[String]) -> Option<&'a mut SchemaMember<T>> {
    let (first, rest) = address.split_first()?;
    let member = level.get_mut(first)?;

    match rest.is_empty() {
        true => Some(member),
        false => member_mut(&mut member.children, rest),
    }
}

fn accumulate(number: Option<usize>, digit: u32) -> Option<usize> {
    number.unwrap_or(0).checked_mul(10)?.checked_add(digit as usize)
}

impl<T, M> SchemaContext<T, M>
where
    T: SchemaToken + Clone,
    M: SchemaMapper<T>,
{
    fn new(mapper: M) -> Self {
        Self {
            state: State::None,
            stage: Stage::Named,
            stack: vec![],
            root: IndexMap::new(),
            current: vec![],
            cache: HashMap::new(),
            mapper,
            pivot: None,
            end: 0,
            ended: false,
            clear_all: false,
            descending: false,
            placeholder: false,
            number: None,
            size: None,
        }
    }

    fn step(&mut self, scanner: &Scanner, current: char) -> Result<(), ParseError> {
        match self.state {
            State::None => {
                if current == '*' {
                    self.include("*");
                    self.state = State::Asterisk;
                } else if current == '!' {
                    self.state = State::Exclude;
                } else if SchemaParser::is_name_part(current) {
                    self.identifier(scanner, current)?;
                    self.state = State::Include;
                } else if current == '}' {
                    self.close_group(scanner)?;
                } else if !current.is_whitespace() {
                    return scanner.error("Unexpected character in schema").err();
                }
            },
            State::Asterisk => {
                if current == ',' {
                    self.state = State::None;
                } else if current == '}' {
                    self.close_group(scanner)?;
                } else if !current.is_whitespace() {
                    return scanner.error("Unexpected character after '*'").err();
                }
            },
            State::Exclude => {
                if current == '*' && self.pivot.is_none() && !self.clear_all {
                    self.clear_all = true;
                } else if SchemaParser::is_name_part(current) && !self.clear_all {
                    self.identifier(scanner, current)?;
                } else if current == ',' {
                    self.exclude(scanner);
                    self.state = State::None;
                } else if current == '}' {
                    self.exclude(scanner);
                    self.close_group(scanner)?;
                } else if current.is_whitespace() {
                    self.ended = self.pivot.is_some();
                } else {
                    return scanner.error("Unexpected character in exclusion").err();
                }
            },
            State::Include => {
                if SchemaParser::is_name_part(current) {
                    self.identifier(scanner, current)?;
                } else if current.is_whitespace() {
                    self.ended = true;
                } else if matches!(current, ':' | '(' | '{' | ',' | '}') {
                    self.resolve(scanner);
                    self.state = State::Included;
                    self.stage = Stage::Named;
                    self.suffix(scanner, current)?;
                } else {
                    let pivot = self.pivot.unwrap_or(scanner.position);
                    return scanner.error_from("Illegal character in identifier", pivot).err();
                }
            },
            State::Included => {
                if !current.is_whitespace() {
                    self.suffix(scanner, current)?;
                }
            },
            State::PagingCount => {
                if let Some(digit) = current.to_digit(10) {
                    self.number = Some(accumulate(self.number, digit).ok_or_else(|| scanner.error("Page number is too large"))?);
                } else if self.number.is_none() {
                    match current {
                        '?' => {
                            self.set_paging(Paging::Unpaged);
                            self.state = State::Included;
                        },
                        '*' => {
                            self.set_paging(Paging::Disabled);
                            self.state = State::Included;
                        },
                        '/' => return scanner.error("Missing page number before '/'").err(),
                        ch if ch.is_whitespace() => {},
                        _ => return scanner.error("Expected page number").err(),
                    }
                } else if current == '/' {
                    self.state = State::PagingSize;
                } else {
                    self.finish_page(None);
                    if !current.is_whitespace() {
                        self.suffix(scanner, current)?;
                    }
                }
            },
            State::PagingSize => {
                if let Some(digit) = current.to_digit(10) {
                    self.size = Some(accumulate(self.size, digit).ok_or_else(|| scanner.error("Page size is too large"))?);
                } else if self.size.is_none() {
                    match current {
                        '?' => self.finish_page(None),
                        ch if ch.is_whitespace() => {},
                        _ => return scanner.error("Expected page size").err(),
                    }
                } else {
                    let size = self.size.take();
                    self.finish_page(size);
                    if !current.is_whitespace() {
                        self.suffix(scanner, current)?;
                    }
                }
            },
            State::SortingField => {
                if current == ',' || current == ')' {
                    self.sorting(scanner)?;
                    if current == ')' {
                        self.state = State::Included;
                    }
                } else if current == '~' || current == '!' {
                    if self.descending || self.placeholder || self.pivot.is_some() {
                        return scanner.error("Unexpected sorting direction").err();
                    }
                    self.descending = true;
                } else if current == '?' && self.pivot.is_none() && !self.descending {
                    self.placeholder = true;
                } else if SchemaParser::is_name_part(current) && !self.placeholder {
                    self.identifier(scanner, current)?;
                } else if current.is_whitespace() {
                    self.ended = self.pivot.is_some();
                } else {
                    return scanner.error("Illegal character in sorting").err();
                }
            },
        }

        Ok(())
    }

    /// Handles what may follow a resolved member. Paging, sorting and group
    /// each appear at most once and in that order.
    fn suffix(&mut self, scanner: &Scanner, current: char) -> Result<(), ParseError> {
        let stage = match current {
            ':' => Stage::Paged,
            '(' => Stage::Sorted,
            '{' => Stage::Grouped,
            ',' => {
                self.state = State::None;
                return Ok(());
            },
            '}' => return self.close_group(scanner),
            _ => return scanner.error("Unexpected character after member").err(),
        };

        if stage <= self.stage {
            return scanner.error("Unexpected character after member").err();
        }

        self.stage = stage;
        match stage {
            Stage::Paged => self.state = State::PagingCount,
            Stage::Sorted => self.state = State::SortingField,
            _ => self.open_group(),
        }
        Ok(())
    }

    fn finish(&mut self, scanner: &Scanner) -> Result<(), ParseError> {
        match self.state {
            State::None | State::Asterisk | State::Included => {},
            State::Exclude => self.exclude(scanner),
            State::Include => self.resolve(scanner),
            State::PagingCount => self.finish_page(None),
            State::PagingSize => {
                let size = self.size.take();
                self.finish_page(size);
            },
            State::SortingField => {
                return scanner.error_at_end("Incomplete schema expression, expected ')'").err();
            },
        }

        if !self.stack.is_empty() {
            return scanner.error_at_end("Unbalanced '{', expected '}'").err();
        }

        Ok(())
    }

    fn identifier(&mut self, scanner: &Scanner, current: char) -> Result<(), ParseError> {
        let end = scanner.position + current.len_utf8();

        match self.pivot {
            None if !SchemaParser::is_name_start(current) => scanner.error("Identifier cannot start with a digit").err(),
            None => {
                self.pivot = Some(scanner.position);
                self.end = end;
                self.ended = false;
                Ok(())
            },
            Some(pivot) if self.ended => scanner.error_from("Whitespace inside identifier", pivot).err(),
            Some(_) => {
                self.end = end;
                Ok(())
            },
        }
    }

    fn take_name<'a>(&mut self, scanner: &Scanner<'a>) -> Option<&'a str> {
        self.ended = false;
        self.pivot.take().map(|pivot| scanner.slice(pivot, self.end))
    }

    fn resolve(&mut self, scanner: &Scanner) {
        if let Some(name) = self.take_name(scanner) {
            self.include(name);
        }
    }

    /// Maps `name` under every parent of the open group and makes the
    /// resulting members current.
    fn include(&mut self, name: &str) {
        let parents: Vec<Option<Address>> = match self.stack.last() {
            None => vec![None],
            Some(Frame::Members(parents)) => parents.iter().cloned().map(Some).collect(),
            Some(Frame::Ignores) => {
                self.current.clear();
                return;
            },
        };

        self.current.clear();

        for parent in parents {
            let (token, path) = match &parent {
                None => (None, None),
                Some(address) => match member_mut(&mut self.root, address) {
                    Some(member) => (Some(member.token.clone()), Some(member.path.clone())),
                    None => continue,
                },
            };

            let key = (path.clone().unwrap_or_default().to_lowercase(), name.to_lowercase());
            let tokens = match self.cache.get(&key) {
                Some(tokens) => tokens.clone(),
                None => {
                    let tokens = self.mapper.map(name, token.as_ref());
                    trace!(name = %name, parent = ?path, count = tokens.len(), "schema name mapped");
                    self.cache.insert(key, tokens.clone());
                    tokens
                },
            };

            let level = match &parent {
                None => &mut self.root,
                Some(address) => match member_mut(&mut self.root, address) {
                    Some(member) => &mut member.children,
                    None => continue,
                },
            };

            for token in tokens {
                let key = token.name().to_lowercase();
                let mut address = parent.clone().unwrap_or_default();
                address.push(key.clone());

                level.entry(key).or_insert_with(|| SchemaMember::new(token, path.as_deref()));
                self.current.push(address);
            }
        }
    }

    fn exclude(&mut self, scanner: &Scanner) {
        let name = self.take_name(scanner).map(str::to_lowercase);
        let clear_all = std::mem::take(&mut self.clear_all);
        self.current.clear();

        let apply = |level: &mut Level<T>| match &name {
            Some(name) if !clear_all => {
                level.shift_remove(name);
            },
            _ => level.clear(),
        };

        match self.stack.last() {
            None => apply(&mut self.root),
            Some(Frame::Members(parents)) => {
                for address in parents {
                    if let Some(member) = member_mut(&mut self.root, address) {
                        apply(&mut member.children);
                    }
                }
            },
            Some(Frame::Ignores) => {},
        }
    }

    fn open_group(&mut self) {
        let frame = match self.current.is_empty() {
            true => Frame::Ignores,
            false => Frame::Members(std::mem::take(&mut self.current)),
        };

        self.stack.push(frame);
        self.state = State::None;
    }

    fn close_group(&mut self, scanner: &Scanner) -> Result<(), ParseError> {
        match self.stack.pop() {
            Some(Frame::Members(parents)) => self.current = parents,
            Some(Frame::Ignores) => self.current.clear(),
            None => return scanner.error("Unbalanced '}'").err(),
        }

        self.state = State::Included;
        self.stage = Stage::Grouped;
        Ok(())
    }

    fn set_paging(&mut self, paging: Paging) {
        for address in &self.current {
            if let Some(member) = member_mut(&mut self.root, address) {
                member.paging = Some(paging);
            }
        }
    }

    fn finish_page(&mut self, size: Option<usize>) {
        if let Some(index) = self.number.take() {
            self.set_paging(Paging::Page { index, size });
        }
        self.size = None;
        self.state = State::Included;
    }

    fn sorting(&mut self, scanner: &Scanner) -> Result<(), ParseError> {
        let descending = std::mem::take(&mut self.descending);
        self.placeholder = false;

        match self.take_name(scanner) {
            Some(field) => {
                let sorting = Sorting::new(field, descending);
                for address in &self.current {
                    if let Some(member) = member_mut(&mut self.root, address) {
                        member.sortings.push(sorting.clone());
                    }
                }
                Ok(())
            },
            None if descending => scanner.error("Empty sorting field").err(),
            None => Ok(()),
        }
    }
}

/// Parser for the schema/projection expression, e.g.
/// `Name,Roles:1/5(~Title){Id,Title},!Password`.
///
/// Names are resolved through a [`SchemaMapper`]; results are cached per
/// `(parent path, name)` for the duration of one call.
pub struct SchemaParser;

impl SchemaParser {
    pub fn is_name_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_'
    }

    pub fn is_name_part(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_'
    }

    pub fn parse<T, M>(name: &str, text: &str, mapper: M) -> Result<Schema<T>, ParseError>
    where
        T: SchemaToken + Clone,
        M: SchemaMapper<T>,
    {
        Self::parse_window(name, text, 0, None, mapper)
    }

    pub fn try_parse<T, M>(name: &str, text: &str, mapper: M) -> Option<Schema<T>>
    where
        T: SchemaToken + Clone,
        M: SchemaMapper<T>,
    {
        Self::parse(name, text, mapper).ok()
    }

    pub fn parse_window<T, M>(name: &str, text: &str, start: usize, count: Option<usize>, mapper: M) -> Result<Schema<T>, ParseError>
    where
        T: SchemaToken + Clone,
        M: SchemaMapper<T>,
    {
        let mut scanner = Scanner::window(text, start, count, PARAMETER)?;
        let mut context = SchemaContext::new(mapper);

        while let Some(current) = scanner.current() {
            context.step(&scanner, current)?;
            scanner.next();
        }

        context.finish(&scanner)?;

        debug!(schema = name, members = context.root.len(), "schema parsed");
        Ok(Schema {
            name: name.to_string(),
            members: context.root,
        })
    }
}
