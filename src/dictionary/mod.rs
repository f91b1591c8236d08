//! Run-time dictionary: name → value store consulted by dictionary references.

pub mod standard;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::expression::Value;

/// What a bare `[name]` token denotes when it stands alone in a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A plain number; a bare reference becomes a note with this value.
    #[default]
    Value,
    Tempo,
    Instrument,
    Voice,
    Layer,
}

impl Role {
    /// The prefix letter used for this role in `$NAME=...` definitions.
    pub fn prefix(self) -> Option<char> {
        match self {
            Role::Value => None,
            Role::Tempo => Some('T'),
            Role::Instrument => Some('I'),
            Role::Voice => Some('V'),
            Role::Layer => Some('L'),
        }
    }

    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            'T' => Some(Role::Tempo),
            'I' => Some(Role::Instrument),
            'V' => Some(Role::Voice),
            'L' => Some(Role::Layer),
            _ => None,
        }
    }
}

/// A single dictionary definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Entry {
    pub value: Value,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: HashMap<String, Entry>,
}

impl Dictionary {
    /// An empty dictionary.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Dictionary preloaded with instrument, percussion, tempo and controller names.
    pub fn standard() -> Self {
        let mut dictionary = Self::new();
        standard::load(&mut dictionary);
        dictionary
    }

    /// Define or redefine `name`. The latest definition wins.
    pub fn insert(&mut self, name: impl Into<String>, value: Value, role: Role) {
        self.entries.insert(name.into(), Entry { value, role });
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy every entry of `other` into this dictionary, overwriting on conflict.
    pub fn merge(&mut self, other: &Dictionary) {
        for (name, entry) in &other.entries {
            self.entries.insert(name.clone(), *entry);
        }
    }
}

/// Parse the right-hand side of a definition: an optional role prefix
/// (`T`, `I`, `V`, `L`) followed by a number.
///
/// A number with a `.` is a double; otherwise an int, or a long when it does
/// not fit in an int.
pub fn parse_definition(text: &str) -> Option<(Value, Role)> {
    let mut chars = text.chars();
    let (role, number) = match chars.next().and_then(Role::from_prefix) {
        Some(role) => (role, chars.as_str()),
        None => (Role::Value, text),
    };
    if number.is_empty() {
        return None;
    }
    let value = if number.contains('.') {
        Value::Double(number.parse().ok()?)
    } else {
        let v: i64 = number.parse().ok()?;
        match i32::try_from(v) {
            Ok(int) => Value::Int(int),
            Err(_) => Value::Long(v),
        }
    };
    Some((value, role))
}
