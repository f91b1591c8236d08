//! Music string parser — pattern text → elements → events, one token at a time.
//!
//! Tokens are separated by whitespace. Each token is read by the first rule
//! in [`rules::RULES`] that claims it, fired through the [`Environment`]
//! immediately, and only then is the next token read. A dictionary definition
//! is therefore visible to every token after it.

pub mod chord;
pub mod error;
pub mod note;
pub mod primitives;
pub mod reader;
pub mod rules;

pub use error::{ErrorKind, EvalError, ParseError};

use log::debug;

use crate::environment::Environment;
use crate::event::Event;

use reader::ParserContext;

/// The music string parser.
pub struct Parser;

impl Parser {
    /// Parse a complete pattern.
    ///
    /// The environment is reset first (working dictionary back to its base,
    /// defaults back to their initial values). Returns every event fired. On
    /// error, events fired before the failing token have already reached the
    /// listeners.
    ///
    /// Each event reaches every listener before the next token is read, on
    /// the calling thread, so a listener that hangs hangs the parse. The
    /// environment stays mutably borrowed for the whole call: listeners cannot
    /// be added or removed mid-parse, and concurrent parses need separate
    /// environments.
    pub fn parse(env: &mut Environment, pattern: &str) -> Result<Vec<Event>, ParseError> {
        env.reset();
        Self::parse_fragment(env, pattern)
    }

    /// Parse a piece of a longer stream, keeping dictionary definitions and
    /// defaults from earlier fragments.
    pub fn parse_fragment(env: &mut Environment, pattern: &str) -> Result<Vec<Event>, ParseError> {
        let chars: Vec<char> = pattern.chars().collect();
        debug!("parse start: {} chars", chars.len());

        let mut pos = 0;
        let mut events = Vec::new();
        loop {
            let (element, start, end) = {
                let mut ctx = ParserContext::at(&chars, pos, env.dictionary());
                ctx.skip_whitespace();
                if ctx.is_at_end() {
                    break;
                }
                let start = ctx.position();
                let element = rules::read_element(&mut ctx)?;
                if !ctx.at_token_boundary() {
                    return Err(ctx.unexpected("whitespace or end of input"));
                }
                (element, start, ctx.position())
            };
            events.push(env.fire(&element, start)?);
            pos = end;
        }

        debug!("parse finished: {} events", events.len());
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Role;
    use crate::expression::Value;

    #[test]
    fn empty_pattern_fires_nothing() {
        let mut env = Environment::new();
        assert!(Parser::parse(&mut env, "").unwrap().is_empty());
        assert!(Parser::parse(&mut env, "  \n\t ").unwrap().is_empty());
    }

    #[test]
    fn one_event_per_token() {
        let mut env = Environment::new();
        let events = Parser::parse(&mut env, "V1 T90 C D+E | Rq X7=100").unwrap();
        assert_eq!(events.len(), 7);
        assert_eq!(events[4], Event::Measure);
    }

    #[test]
    fn trailing_garbage_is_grammar_error() {
        let mut env = Environment::new();
        let err = Parser::parse(&mut env, "C D5qz").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Grammar);
        assert_eq!(err.position, 5);
    }

    #[test]
    fn definition_visible_to_later_tokens() {
        let mut env = Environment::new();
        let events = Parser::parse(&mut env, "$N=62 [N]q").unwrap();
        assert_eq!(events[1].as_note().unwrap().value, 62);
    }

    #[test]
    fn reference_sees_redefinition() {
        let mut env = Environment::new();
        let events = Parser::parse(&mut env, "$V=T100 [V] $V=T140 [V]").unwrap();
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[1], Event::Tempo(t) if t.bpm == 100));
        assert!(matches!(&events[3], Event::Tempo(t) if t.bpm == 140));
    }

    #[test]
    fn fragment_keeps_definitions() {
        let mut env = Environment::new();
        Parser::parse(&mut env, "$HORN=I60").unwrap();
        assert!(env.dictionary().contains("HORN"));
        Parser::parse_fragment(&mut env, "[HORN]").unwrap();
        assert!(Parser::parse(&mut env, "[HORN]").is_err());
    }

    #[test]
    fn api_definitions_survive_parse() {
        let mut env = Environment::new();
        env.define_with_role("LEAD", Value::Byte(3), Role::Voice);
        let events = Parser::parse(&mut env, "[LEAD] C").unwrap();
        assert_eq!(events[1].as_note().unwrap().voice, 3);
    }
}
