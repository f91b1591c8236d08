//! Parse environment — dictionaries, defaults and the listener registry.
//!
//! The environment is the only mutable state a parse touches. Firing an
//! element evaluates it against the working dictionary and current defaults,
//! applies its state effects, then fans the event out to every listener in
//! registration order.
//!
//! Listeners run synchronously on the parsing thread. A listener that never
//! returns blocks the parse; there is no timeout or cancellation.

use std::fmt;

use log::debug;

use crate::config::ParserConfig;
use crate::dictionary::{Dictionary, Role};
use crate::element::Element;
use crate::event::{Event, Listener};
use crate::expression::Value;
use crate::parser::error::{EvalError, ParseError};

/// Values used when a token leaves a field out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Defaults {
    pub octave: u8,
    pub chord_octave: u8,
    /// Whole notes.
    pub duration: f64,
    pub attack: u8,
    pub decay: u8,
    pub tempo: i32,
    pub voice: u8,
    pub layer: u8,
    pub time: i64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            octave: 5,
            chord_octave: 3,
            duration: 0.25,
            attack: 64,
            decay: 64,
            tempo: 120,
            voice: 0,
            layer: 0,
            time: 0,
        }
    }
}

/// Handle returned by [`Environment::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One parse session: dictionaries, defaults and listeners.
///
/// `Environment` is `Send`, so independent sessions can each run on their own
/// thread. Calls into one environment are serialized by the `&mut self`
/// receivers; sharing a single environment between threads (behind a lock)
/// is up to the caller. The listener set cannot change while a parse is
/// running because the parser holds the only mutable borrow.
pub struct Environment {
    /// Entries that survive [`reset`](Self::reset).
    base: Dictionary,
    dictionary: Dictionary,
    initial: Defaults,
    defaults: Defaults,
    listeners: Vec<(ListenerId, Box<dyn Listener>)>,
    next_id: u64,
}

impl Environment {
    /// Environment with the standard dictionary and stock defaults.
    pub fn new() -> Self {
        Self::with_dictionary(Dictionary::standard())
    }

    pub fn with_dictionary(dictionary: Dictionary) -> Self {
        Self {
            base: dictionary.clone(),
            dictionary,
            initial: Defaults::default(),
            defaults: Defaults::default(),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        let mut dictionary = if config.standard_dictionary {
            Dictionary::standard()
        } else {
            Dictionary::new()
        };
        dictionary.merge(&config.build_dictionary());
        let mut env = Self::with_dictionary(dictionary);
        env.set_defaults(config.to_defaults());
        env
    }

    /// Current defaults, including tempo/voice/layer/time changes fired so far.
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Replace the defaults a pattern starts from.
    pub fn set_defaults(&mut self, defaults: Defaults) {
        self.initial = defaults;
        self.defaults = defaults;
    }

    /// The working dictionary.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// The dictionary every [`reset`](Self::reset) starts from.
    pub fn base_dictionary(&self) -> &Dictionary {
        &self.base
    }

    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.define_with_role(name, value, Role::Value);
    }

    /// Add a definition that persists across patterns.
    pub fn define_with_role(&mut self, name: impl Into<String>, value: Value, role: Role) {
        let name = name.into();
        self.base.insert(name.clone(), value, role);
        self.dictionary.insert(name, value, role);
    }

    /// Back to the start-of-pattern state: base dictionary and initial defaults.
    /// Listeners are kept.
    pub fn reset(&mut self) {
        self.dictionary = self.base.clone();
        self.defaults = self.initial;
    }

    pub fn add_listener<L: Listener + 'static>(&mut self, listener: L) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(candidate, _)| *candidate != id);
        self.listeners.len() != before
    }

    /// Registered listeners in dispatch order.
    pub fn listener_ids(&self) -> Vec<ListenerId> {
        self.listeners.iter().map(|(id, _)| *id).collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Evaluate without firing: no state change, no dispatch.
    pub fn evaluate(&self, element: &Element) -> Result<Event, EvalError> {
        element.evaluate(&self.dictionary, &self.defaults)
    }

    /// Evaluate `element`, apply its state effects and dispatch it.
    ///
    /// `position` is the token's offset in the pattern and is attached to any
    /// error. A listener error stops the fan-out; listeners already called
    /// keep what they saw.
    pub fn fire(&mut self, element: &Element, position: usize) -> Result<Event, ParseError> {
        let event = self
            .evaluate(element)
            .map_err(|e| ParseError::from_eval(e, position))?;
        self.apply(&event);
        debug!("fire {} at {position}", event.kind());

        for (id, listener) in &mut self.listeners {
            event.accept(listener.as_mut()).map_err(|e| {
                ParseError::listener(
                    format!("listener {id} rejected {} event: {e}", event.kind()),
                    position,
                )
            })?;
        }
        Ok(event)
    }

    fn apply(&mut self, event: &Event) {
        match event {
            Event::DictionaryAdd(add) => self.dictionary.insert(add.name.clone(), add.value, add.role),
            Event::Tempo(tempo) => self.defaults.tempo = tempo.bpm,
            Event::Voice(voice) => self.defaults.voice = voice.voice,
            Event::Layer(layer) => self.defaults.layer = layer.layer,
            Event::Time(time) => self.defaults.time = time.time,
            _ => {}
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("dictionary_len", &self.dictionary.len())
            .field("defaults", &self.defaults)
            .field("listeners", &self.listener_ids())
            .finish()
    }
}
