use std::{fmt, hash::{Hash, Hasher}};

use serde::{Deserialize, Serialize};

/// Member or function name, compared and hashed without regard to ASCII case.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::hash_map::DefaultHasher, hash::{Hash, Hasher}};

    use crate::expressions::Identifier;

    fn hash_of(identifier: &Identifier) -> u64 {
        let mut hasher = DefaultHasher::new();
        identifier.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_identifier_ignores_case() {
        let a = Identifier::new("UserId");
        let b = Identifier::new("userid");

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert!(a.is("USERID"));
        assert_eq!(a.to_string(), "UserId");
    }

    #[test]
    fn test_identifier_differs() {
        assert_ne!(Identifier::new("a"), Identifier::new("ab"));
    }
}
