//! notestream — parse music strings into an ordered stream of typed events.
//!
//! ```no_run
//! use notestream::{Environment, EventLog, Parser};
//!
//! let mut env = Environment::new();
//! let log = EventLog::new();
//! env.add_listener(log.clone());
//! Parser::parse(&mut env, "T[ALLEGRO] V0 I[PIANO] C5q E5q G5h").unwrap();
//! assert_eq!(log.len(), 6);
//! ```

pub mod config;
pub mod dictionary;
pub mod element;
pub mod environment;
pub mod event;
pub mod expression;
pub mod parser;

pub use config::{ConfigError, ParserConfig};
pub use dictionary::{Dictionary, Entry, Role};
pub use element::Element;
pub use environment::{Defaults, Environment, ListenerId};
pub use event::{Event, EventLog, Listener, ListenerResult};
pub use expression::{ByteExpr, DoubleExpr, Expr, IntExpr, LongExpr, Value};
pub use parser::{ErrorKind, EvalError, ParseError, Parser};
