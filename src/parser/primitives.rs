//! Grammar primitives.
//!
//! Small recognizers that run against a [`ParserContext`] and compose into the
//! token grammar. None of them keep state between calls.
//!
//! Cursor contract: a primitive that fails *without* consuming input leaves
//! the cursor where it was, which lets [`Optional`], [`OneOf`] and [`Repeat`]
//! fall back. A failure after consuming input is reported as-is and is not
//! backtracked.

use crate::expression::IntExpr;

use super::error::ParseError;
use super::reader::{CharClass, ParserContext};

pub trait Rule {
    type Output;

    fn parse(&self, ctx: &mut ParserContext<'_>) -> Result<Self::Output, ParseError>;

    fn map<F, U>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Output) -> U,
    {
        Map { rule: self, f }
    }
}

/// Read characters by class and/or explicit set. The count may itself be a
/// dictionary reference.
#[derive(Debug, Clone)]
pub struct ParseChars {
    pub strict: bool,
    pub looking_for: Vec<char>,
    pub classes: Vec<CharClass>,
    pub count: Option<IntExpr>,
}

impl ParseChars {
    /// Exactly `count` characters of `class`.
    pub fn exactly(count: i32, class: CharClass) -> Self {
        Self {
            strict: true,
            looking_for: Vec::new(),
            classes: vec![class],
            count: Some(IntExpr::Literal(count)),
        }
    }

    /// Any run (possibly empty) of characters from `chars`.
    pub fn any_of(chars: &[char]) -> Self {
        Self {
            strict: false,
            looking_for: chars.to_vec(),
            classes: Vec::new(),
            count: None,
        }
    }
}

impl Rule for ParseChars {
    type Output = String;

    fn parse(&self, ctx: &mut ParserContext<'_>) -> Result<String, ParseError> {
        let count = match &self.count {
            Some(expr) => {
                let n = expr
                    .eval(ctx.dictionary())
                    .map_err(|e| ParseError::from_eval(e, ctx.position()))?;
                let n = usize::try_from(n).map_err(|_| {
                    ParseError::grammar(format!("negative character count {n}"), ctx.position())
                })?;
                Some(n)
            }
            None => None,
        };
        ctx.read_chars(count, self.strict, &self.classes, &self.looking_for)
    }
}

/// One token from a fixed vocabulary, bounded by `delimiters` or whitespace.
#[derive(Debug, Clone)]
pub struct ParseSimpleToken {
    pub strings: Vec<String>,
    pub delimiters: Vec<char>,
    pub consume_delimiter: bool,
}

impl ParseSimpleToken {
    pub fn new(strings: &[&str], delimiters: &[char], consume_delimiter: bool) -> Self {
        Self {
            strings: strings.iter().map(|s| s.to_string()).collect(),
            delimiters: delimiters.to_vec(),
            consume_delimiter,
        }
    }
}

impl Rule for ParseSimpleToken {
    type Output = String;

    fn parse(&self, ctx: &mut ParserContext<'_>) -> Result<String, ParseError> {
        let start = ctx.position();
        let token = ctx.read_token(self.consume_delimiter, &self.delimiters);
        if self.strings.iter().any(|s| *s == token) {
            return Ok(token);
        }
        ctx.rewind(start);
        Err(ParseError::grammar(
            format!(
                "expected one of [{}], found '{token}'",
                self.strings.join(", ")
            ),
            start,
        ))
    }
}

/// Longest member of a vocabulary that prefixes the remaining input.
///
/// Unlike [`ParseSimpleToken`] this needs no delimiter, so it can pick
/// `maj7` out of `Cmaj7w`.
#[derive(Debug, Clone)]
pub struct ParseKeyword {
    pub strings: Vec<&'static str>,
}

impl ParseKeyword {
    pub fn new(strings: &[&'static str]) -> Self {
        Self {
            strings: strings.to_vec(),
        }
    }
}

impl Rule for ParseKeyword {
    type Output = &'static str;

    fn parse(&self, ctx: &mut ParserContext<'_>) -> Result<&'static str, ParseError> {
        let best = self
            .strings
            .iter()
            .filter(|s| {
                s.chars()
                    .enumerate()
                    .all(|(i, c)| ctx.peek_at(i) == Some(c))
            })
            .max_by_key(|s| s.chars().count());
        match best {
            Some(keyword) => {
                for _ in keyword.chars() {
                    ctx.advance();
                }
                Ok(*keyword)
            }
            None => Err(ctx.unexpected(&format!("one of [{}]", self.strings.join(", ")))),
        }
    }
}

/// Run `first` then `second`; both results or the first failure.
#[derive(Debug, Clone)]
pub struct Pair<A, B>(pub A, pub B);

impl<A: Rule, B: Rule> Rule for Pair<A, B> {
    type Output = (A::Output, B::Output);

    fn parse(&self, ctx: &mut ParserContext<'_>) -> Result<Self::Output, ParseError> {
        let first = self.0.parse(ctx)?;
        let second = self.1.parse(ctx)?;
        Ok((first, second))
    }
}

/// `None` when the inner rule fails without consuming input.
#[derive(Debug, Clone)]
pub struct Optional<R>(pub R);

impl<R: Rule> Rule for Optional<R> {
    type Output = Option<R::Output>;

    fn parse(&self, ctx: &mut ParserContext<'_>) -> Result<Self::Output, ParseError> {
        let start = ctx.position();
        match self.0.parse(ctx) {
            Ok(value) => Ok(Some(value)),
            Err(_) if ctx.position() == start => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Zero or more repetitions, stopping at the first non-consuming failure.
#[derive(Debug, Clone)]
pub struct Repeat<R>(pub R);

impl<R: Rule> Rule for Repeat<R> {
    type Output = Vec<R::Output>;

    fn parse(&self, ctx: &mut ParserContext<'_>) -> Result<Self::Output, ParseError> {
        let mut items = Vec::new();
        loop {
            let start = ctx.position();
            match self.0.parse(ctx) {
                Ok(item) => {
                    items.push(item);
                    if ctx.position() == start {
                        break;
                    }
                }
                Err(_) if ctx.position() == start => break,
                Err(e) => return Err(e),
            }
        }
        Ok(items)
    }
}

/// First alternative that succeeds. An alternative that fails after
/// consuming input ends the search with its error.
pub struct OneOf<T> {
    rules: Vec<Box<dyn Rule<Output = T>>>,
}

impl<T> OneOf<T> {
    pub fn new(rules: Vec<Box<dyn Rule<Output = T>>>) -> Self {
        Self { rules }
    }
}

impl<T> Rule for OneOf<T> {
    type Output = T;

    fn parse(&self, ctx: &mut ParserContext<'_>) -> Result<T, ParseError> {
        let start = ctx.position();
        let mut failures = Vec::new();
        for rule in &self.rules {
            match rule.parse(ctx) {
                Ok(value) => return Ok(value),
                Err(e) if ctx.position() == start => failures.push(e.message),
                Err(e) => return Err(e),
            }
        }
        Err(ParseError::grammar(
            if failures.is_empty() {
                "no alternative matched".to_string()
            } else {
                failures.join("; ")
            },
            start,
        ))
    }
}

/// Apply `f` to the output of `rule`.
#[derive(Debug, Clone)]
pub struct Map<R, F> {
    rule: R,
    f: F,
}

impl<R, F, U> Rule for Map<R, F>
where
    R: Rule,
    F: Fn(R::Output) -> U,
{
    type Output = U;

    fn parse(&self, ctx: &mut ParserContext<'_>) -> Result<U, ParseError> {
        self.rule.parse(ctx).map(&self.f)
    }
}

/// Adapt a plain function over the context into a [`Rule`].
pub struct FromFn<F>(pub F);

impl<F, T> Rule for FromFn<F>
where
    F: Fn(&mut ParserContext<'_>) -> Result<T, ParseError>,
{
    type Output = T;

    fn parse(&self, ctx: &mut ParserContext<'_>) -> Result<T, ParseError> {
        (self.0)(ctx)
    }
}

pub type ContextFn<T> = fn(&mut ParserContext<'_>) -> Result<T, ParseError>;

fn read_hex_byte(ctx: &mut ParserContext<'_>) -> Result<u8, ParseError> {
    ctx.read_byte(16)
}

/// Two characters from the upper-case hex alphabet, as a byte.
pub fn hex_byte() -> FromFn<ContextFn<u8>> {
    FromFn(read_hex_byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{Dictionary, Role};
    use crate::expression::Value;
    use crate::parser::error::ErrorKind;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn parse_chars_exact_count() {
        let dictionary = Dictionary::new();
        let input = chars("7Fz");
        let mut ctx = ParserContext::new(&input, &dictionary);
        let rule = ParseChars::exactly(2, CharClass::UpperHexDigit);
        assert_eq!(rule.parse(&mut ctx).unwrap(), "7F");
        assert!(rule.parse(&mut ctx).is_err());
        assert_eq!(ctx.position(), 2);
    }

    #[test]
    fn parse_chars_count_from_dictionary() {
        let mut dictionary = Dictionary::new();
        dictionary.insert("N", Value::Int(3), Role::Value);
        let input = chars("abcd");
        let mut ctx = ParserContext::new(&input, &dictionary);
        let rule = ParseChars {
            strict: true,
            looking_for: Vec::new(),
            classes: vec![CharClass::LowercaseLetter],
            count: Some(IntExpr::dict_ref("N")),
        };
        assert_eq!(rule.parse(&mut ctx).unwrap(), "abc");
    }

    #[test]
    fn parse_chars_undefined_count() {
        let dictionary = Dictionary::new();
        let input = chars("abcd");
        let mut ctx = ParserContext::new(&input, &dictionary);
        let rule = ParseChars {
            strict: false,
            looking_for: Vec::new(),
            classes: vec![CharClass::Letter],
            count: Some(IntExpr::dict_ref("N")),
        };
        let err = rule.parse(&mut ctx).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedDictionaryKey);
    }

    #[test]
    fn simple_token_accepts_vocabulary() {
        let dictionary = Dictionary::new();
        let input = chars("hex:F0");
        let mut ctx = ParserContext::new(&input, &dictionary);
        let rule = ParseSimpleToken::new(&["dec", "hex"], &[':'], true);
        assert_eq!(rule.parse(&mut ctx).unwrap(), "hex");
        assert_eq!(ctx.peek(), Some('F'));
    }

    #[test]
    fn simple_token_rejects_and_names_vocabulary() {
        let dictionary = Dictionary::new();
        let input = chars("oct:17");
        let mut ctx = ParserContext::new(&input, &dictionary);
        let rule = ParseSimpleToken::new(&["dec", "hex"], &[':'], true);
        let err = rule.parse(&mut ctx).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Grammar);
        assert!(err.message.contains("[dec, hex]"));
        assert!(err.message.contains("'oct'"));
        assert_eq!(ctx.position(), 0);
    }

    #[test]
    fn keyword_prefers_longest() {
        let dictionary = Dictionary::new();
        let input = chars("maj7w");
        let mut ctx = ParserContext::new(&input, &dictionary);
        let rule = ParseKeyword::new(&["maj", "maj7", "min"]);
        assert_eq!(rule.parse(&mut ctx).unwrap(), "maj7");
        assert_eq!(ctx.peek(), Some('w'));
    }

    #[test]
    fn keyword_miss_consumes_nothing() {
        let dictionary = Dictionary::new();
        let input = chars("mix");
        let mut ctx = ParserContext::new(&input, &dictionary);
        let rule = ParseKeyword::new(&["maj", "min"]);
        assert!(rule.parse(&mut ctx).is_err());
        assert_eq!(ctx.position(), 0);
    }

    #[test]
    fn pair_returns_both() {
        let dictionary = Dictionary::new();
        let input = chars("F7min");
        let mut ctx = ParserContext::new(&input, &dictionary);
        let rule = Pair(hex_byte(), ParseKeyword::new(&["maj", "min"]));
        assert_eq!(rule.parse(&mut ctx).unwrap(), (0xF7, "min"));
    }

    #[test]
    fn pair_failure_exposes_no_result() {
        let dictionary = Dictionary::new();
        let input = chars("F7aug");
        let mut ctx = ParserContext::new(&input, &dictionary);
        let rule = Pair(hex_byte(), ParseKeyword::new(&["maj", "min"]));
        let err = rule.parse(&mut ctx).unwrap_err();
        assert_eq!(err.position, 2);
    }

    #[test]
    fn optional_and_repeat() {
        let dictionary = Dictionary::new();
        let input = chars("0A1BFFx");
        let mut ctx = ParserContext::new(&input, &dictionary);
        let bytes = Repeat(hex_byte()).parse(&mut ctx).unwrap();
        assert_eq!(bytes, vec![0x0A, 0x1B, 0xFF]);
        assert_eq!(Optional(hex_byte()).parse(&mut ctx).unwrap(), None);
        assert_eq!(ctx.peek(), Some('x'));
    }

    #[test]
    fn one_of_falls_back_on_clean_failure() {
        let dictionary = Dictionary::new();
        let input = chars("min");
        let mut ctx = ParserContext::new(&input, &dictionary);
        let rule: OneOf<String> = OneOf::new(vec![
            Box::new(hex_byte().map(|b| b.to_string())),
            Box::new(ParseKeyword::new(&["min"]).map(str::to_string)),
        ]);
        assert_eq!(rule.parse(&mut ctx).unwrap(), "min");
    }

    #[test]
    fn one_of_reports_all_failures() {
        let dictionary = Dictionary::new();
        let input = chars("zz");
        let mut ctx = ParserContext::new(&input, &dictionary);
        let rule: OneOf<String> = OneOf::new(vec![
            Box::new(ParseKeyword::new(&["maj"]).map(str::to_string)),
            Box::new(ParseKeyword::new(&["min"]).map(str::to_string)),
        ]);
        let err = rule.parse(&mut ctx).unwrap_err();
        assert!(err.message.contains("maj"));
        assert_eq!(ctx.position(), 0);
    }
}
