//! Character-level reader for music strings.
//!
//! [`ParserContext`] is a forward cursor over the pattern's characters with
//! single-character pushback. It also carries the dictionary so low-level
//! reads can resolve references (for example a character count given as
//! `[NAME]`).

use crate::dictionary::Dictionary;
use crate::expression::{ByteExpr, DoubleExpr, Expr, IntExpr, LongExpr};

use super::error::ParseError;

/// The fixed alphabet accepted by radix-16 reads.
pub const HEX_DIGITS: &str = "0123456789ABCDEF";

/// Character classes a read can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    UppercaseLetter,
    LowercaseLetter,
    /// Any Unicode alphabetic character.
    Letter,
    DecimalDigit,
    /// One of [`HEX_DIGITS`].
    UpperHexDigit,
    Whitespace,
}

impl CharClass {
    pub fn contains(self, c: char) -> bool {
        match self {
            CharClass::UppercaseLetter => c.is_uppercase(),
            CharClass::LowercaseLetter => c.is_lowercase(),
            CharClass::Letter => c.is_alphabetic(),
            CharClass::DecimalDigit => c.is_ascii_digit(),
            CharClass::UpperHexDigit => HEX_DIGITS.contains(c),
            CharClass::Whitespace => c.is_whitespace(),
        }
    }
}

pub struct ParserContext<'a> {
    chars: &'a [char],
    pos: usize,
    dictionary: &'a Dictionary,
}

impl<'a> ParserContext<'a> {
    pub fn new(chars: &'a [char], dictionary: &'a Dictionary) -> Self {
        Self::at(chars, 0, dictionary)
    }

    /// A context whose cursor starts at `pos`.
    pub fn at(chars: &'a [char], pos: usize, dictionary: &'a Dictionary) -> Self {
        Self {
            chars,
            pos: pos.min(chars.len()),
            dictionary,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor back to a position saved earlier with [`position`](Self::position).
    pub fn rewind(&mut self, pos: usize) {
        self.pos = pos.min(self.chars.len());
    }

    pub fn dictionary(&self) -> &'a Dictionary {
        self.dictionary
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Push the last consumed character back.
    pub fn unread(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// Consume `c` if it is next.
    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, c: char) -> Result<(), ParseError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{c}'")))
        }
    }

    /// Build a grammar error describing what was expected at the cursor.
    pub fn unexpected(&self, expected: &str) -> ParseError {
        let found = match self.peek() {
            Some(c) => format!("'{c}'"),
            None => "end of input".to_string(),
        };
        ParseError::grammar(format!("expected {expected}, found {found}"), self.pos)
    }

    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// True at end of input or before whitespace.
    pub fn at_token_boundary(&self) -> bool {
        self.peek().map_or(true, char::is_whitespace)
    }

    /// Consume everything up to (not including) the next newline.
    pub fn rest_of_line(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            s.push(c);
            self.pos += 1;
        }
        s.trim_end().to_string()
    }

    /// Read up to the next delimiter, whitespace, or end of input.
    ///
    /// Whitespace always ends a token. When `consume_delimiter` is set and the
    /// scan stopped on one of `delimiters`, that delimiter is consumed too.
    pub fn read_token(&mut self, consume_delimiter: bool, delimiters: &[char]) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if delimiters.contains(&c) {
                if consume_delimiter {
                    self.pos += 1;
                }
                break;
            }
            if c.is_whitespace() {
                break;
            }
            s.push(c);
            self.pos += 1;
        }
        s
    }

    /// Read characters that belong to one of `classes` or appear in `looking_for`.
    ///
    /// At most `count` characters are read (`None` = no limit). In strict mode
    /// exactly `count` must match; a strict failure restores the cursor and
    /// returns a grammar error. Non-strict reads never fail.
    pub fn read_chars(
        &mut self,
        count: Option<usize>,
        strict: bool,
        classes: &[CharClass],
        looking_for: &[char],
    ) -> Result<String, ParseError> {
        let start = self.pos;
        let mut s = String::new();
        while count.map_or(true, |n| s.chars().count() < n) {
            match self.peek() {
                Some(c) if looking_for.contains(&c) || classes.iter().any(|k| k.contains(c)) => {
                    s.push(c);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        if strict {
            if let Some(n) = count {
                let found = s.chars().count();
                if found != n {
                    let err = ParseError::grammar(
                        format!("expected {n} matching characters, found {found}"),
                        self.pos,
                    );
                    self.pos = start;
                    return Err(err);
                }
            }
        }
        Ok(s)
    }

    /// Read one byte in radix 10 (a run of decimal digits) or radix 16
    /// (exactly two characters from [`HEX_DIGITS`]).
    ///
    /// Any other radix fails with `UnsupportedRadix` without touching the
    /// cursor. A failed read restores the cursor.
    pub fn read_byte(&mut self, radix: u32) -> Result<u8, ParseError> {
        let start = self.pos;
        match radix {
            10 => {
                let digits = self.read_chars(None, false, &[CharClass::DecimalDigit], &[])?;
                if digits.is_empty() {
                    return Err(self.unexpected("a decimal byte"));
                }
                digits.parse::<u8>().map_err(|_| {
                    self.pos = start;
                    ParseError::grammar(format!("'{digits}' does not fit in a byte"), start)
                })
            }
            16 => {
                let digits = self.read_chars(Some(2), true, &[CharClass::UpperHexDigit], &[])?;
                u8::from_str_radix(&digits, 16).map_err(|_| {
                    self.pos = start;
                    ParseError::grammar(format!("'{digits}' is not a hex byte"), start)
                })
            }
            _ => Err(ParseError::unsupported_radix(radix, start)),
        }
    }

    /// Read a `[name]` dictionary reference if one starts at the cursor.
    pub fn read_reference(&mut self) -> Result<Option<String>, ParseError> {
        if self.peek() != Some('[') {
            return Ok(None);
        }
        let start = self.pos;
        self.pos += 1;
        let name = self.read_token(false, &[']']);
        if !self.eat(']') {
            let err = self.unexpected("']' closing the reference");
            self.pos = start;
            return Err(err);
        }
        if name.is_empty() {
            self.pos = start;
            return Err(ParseError::grammar("empty dictionary reference", start));
        }
        Ok(Some(name))
    }

    /// Read an optionally signed run of decimal digits as an integer.
    fn read_integer(&mut self, what: &str) -> Result<i64, ParseError> {
        let start = self.pos;
        let negative = self.eat('-');
        let digits = self.read_chars(None, false, &[CharClass::DecimalDigit], &[])?;
        if digits.is_empty() {
            self.pos = start;
            return Err(self.unexpected(what));
        }
        let value: i64 = digits.parse().map_err(|_| {
            self.pos = start;
            ParseError::grammar(format!("'{digits}' is too large for {what}"), start)
        })?;
        Ok(if negative { -value } else { value })
    }

    fn read_integer_in<T: TryFrom<i64>>(&mut self, what: &str) -> Result<T, ParseError> {
        let start = self.pos;
        let value = self.read_integer(what)?;
        T::try_from(value).map_err(|_| {
            self.pos = start;
            ParseError::grammar(format!("{value} is out of range for {what}"), start)
        })
    }

    /// Read a decimal number such as `120`, `0.25` or `.5`.
    pub fn read_double(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;
        let mut s = String::new();
        if self.eat('-') {
            s.push('-');
        }
        s.push_str(&self.read_chars(None, false, &[CharClass::DecimalDigit], &[])?);
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            s.push('.');
            s.push_str(&self.read_chars(None, false, &[CharClass::DecimalDigit], &[])?);
        }
        if !s.chars().any(|c| c.is_ascii_digit()) {
            self.pos = start;
            return Err(self.unexpected("a number"));
        }
        s.parse().map_err(|_| {
            self.pos = start;
            ParseError::grammar(format!("invalid number '{s}'"), start)
        })
    }

    pub fn read_byte_expr(&mut self) -> Result<ByteExpr, ParseError> {
        match self.read_reference()? {
            Some(name) => Ok(Expr::DictRef(name)),
            None => self.read_byte(10).map(Expr::Literal),
        }
    }

    pub fn read_int_expr(&mut self) -> Result<IntExpr, ParseError> {
        match self.read_reference()? {
            Some(name) => Ok(Expr::DictRef(name)),
            None => self.read_integer_in("an int").map(Expr::Literal),
        }
    }

    pub fn read_long_expr(&mut self) -> Result<LongExpr, ParseError> {
        match self.read_reference()? {
            Some(name) => Ok(Expr::DictRef(name)),
            None => self.read_integer("a long").map(Expr::Literal),
        }
    }

    pub fn read_double_expr(&mut self) -> Result<DoubleExpr, ParseError> {
        match self.read_reference()? {
            Some(name) => Ok(Expr::DictRef(name)),
            None => self.read_double().map(Expr::Literal),
        }
    }
}
