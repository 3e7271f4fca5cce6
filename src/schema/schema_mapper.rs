/// Token a schema member is built from; its name becomes the member name.
pub trait SchemaToken {
    fn name(&self) -> &str;
}

impl SchemaToken for String {
    fn name(&self) -> &str {
        self
    }
}

/// Resolves a name written in a schema expression to zero or more tokens.
///
/// `parent` is the token of the enclosing member, `None` at the root. The
/// name `*` asks for every member of that level. Returning more than one
/// token fans the entry out (e.g. over a type hierarchy); returning none
/// makes the parser skip the entry and any group that follows it.
pub trait SchemaMapper<T> {
    fn map(&mut self, name: &str, parent: Option<&T>) -> Vec<T>;
}

impl<T, F> SchemaMapper<T> for F
where
    F: FnMut(&str, Option<&T>) -> Vec<T>,
{
    fn map(&mut self, name: &str, parent: Option<&T>) -> Vec<T> {
        self(name, parent)
    }
}
