//! Parser configuration — defaults and extra dictionary entries loaded from
//! ~/.notestream/parser.yaml.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dictionary::{Dictionary, Role};
use crate::environment::Defaults;
use crate::expression::Value;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A number as written in YAML: integers stay integers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Decimal(f64),
}

impl Number {
    pub fn to_value(self) -> Value {
        match self {
            Number::Integer(v) => match i32::try_from(v) {
                Ok(int) => Value::Int(int),
                Err(_) => Value::Long(v),
            },
            Number::Decimal(v) => Value::Double(v),
        }
    }
}

/// A dictionary entry: `NAME: 42` or `NAME: { value: 42, role: tempo }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DictionaryValue {
    Plain(Number),
    WithRole {
        value: Number,
        #[serde(default)]
        role: Role,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub default_octave: u8,
    pub default_chord_octave: u8,
    /// Whole notes.
    pub default_duration: f64,
    pub default_attack: u8,
    pub default_decay: u8,
    pub default_tempo: i32,
    /// Preload instrument, percussion, tempo and controller names.
    pub standard_dictionary: bool,
    pub dictionary: BTreeMap<String, DictionaryValue>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let defaults = Defaults::default();
        Self {
            default_octave: defaults.octave,
            default_chord_octave: defaults.chord_octave,
            default_duration: defaults.duration,
            default_attack: defaults.attack,
            default_decay: defaults.decay,
            default_tempo: defaults.tempo,
            standard_dictionary: true,
            dictionary: BTreeMap::new(),
        }
    }
}

impl ParserConfig {
    /// Standard location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::home_dir()?.join(".notestream").join("parser.yaml"))
    }

    /// Load from the standard path. Returns None if the file doesn't exist or
    /// can't be used; an unusable file is logged.
    pub fn load() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return None;
        }
        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("ignoring configuration: {e}");
                None
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_defaults(&self) -> Defaults {
        Defaults {
            octave: self.default_octave,
            chord_octave: self.default_chord_octave,
            duration: self.default_duration,
            attack: self.default_attack,
            decay: self.default_decay,
            tempo: self.default_tempo,
            ..Defaults::default()
        }
    }

    /// The configured entries only, without the standard names.
    pub fn build_dictionary(&self) -> Dictionary {
        let mut dictionary = Dictionary::new();
        for (name, entry) in &self.dictionary {
            let (value, role) = match entry {
                DictionaryValue::Plain(value) => (value.to_value(), Role::Value),
                DictionaryValue::WithRole { value, role } => (value.to_value(), *role),
            };
            dictionary.insert(name.clone(), value, role);
        }
        dictionary
    }
}
