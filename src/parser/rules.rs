//! Token rules, tried in a fixed order.
//!
//! Each rule looks at the first character of the token. If the token isn't
//! its kind it returns `Ok(None)` without consuming anything; once it has
//! claimed the token, any failure is fatal.

use log::trace;

use crate::dictionary::{self, Role};
use crate::element::{Element, NoteElement, NoteValue};
use crate::event::Scale;
use crate::expression::{ByteExpr, Expr, IntExpr};

use super::error::{EvalError, ParseError};
use super::note;
use super::primitives::{hex_byte, FromFn, Pair, ParseKeyword, ParseSimpleToken, Repeat, Rule};
use super::reader::{CharClass, ParserContext};

pub type RuleFn = fn(&mut ParserContext<'_>) -> Result<Option<Element>, ParseError>;

/// Every rule with its name, in precedence order.
pub const RULES: &[(&str, RuleFn)] = &[
    ("dictionary definition", dictionary_add),
    ("comment", comment),
    ("property", property),
    ("voice", voice),
    ("layer", layer),
    ("tempo", tempo),
    ("instrument", instrument),
    ("key signature", key_signature),
    ("controller", controller),
    ("time", time),
    ("measure", measure),
    ("pitch bend", pitch_bend),
    ("channel pressure", channel_pressure),
    ("polyphonic pressure", polyphonic_pressure),
    ("system exclusive", system_exclusive),
    ("dictionary reference", bare_reference),
    ("note", note_rule),
];

/// Read one element starting at the cursor.
pub fn read_element(ctx: &mut ParserContext<'_>) -> Result<Element, ParseError> {
    let start = ctx.position();
    for (name, rule) in RULES {
        trace!("trying {name} rule at {start}");
        if let Some(element) = rule(ctx)? {
            return Ok(element);
        }
    }
    let names: Vec<&str> = RULES.iter().map(|(name, _)| *name).collect();
    Err(ctx.unexpected(&format!("one of [{}]", names.join(", "))))
}

fn dictionary_add(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.eat('$') {
        return Ok(None);
    }
    let name = ctx.read_chars(None, false, &[CharClass::Letter, CharClass::DecimalDigit], &['_'])?;
    if name.is_empty() {
        return Err(ctx.unexpected("a dictionary name"));
    }
    ctx.expect('=')?;
    let at = ctx.position();
    let text = ctx.read_token(false, &[]);
    let (value, role) = dictionary::parse_definition(&text).ok_or_else(|| {
        ParseError::grammar(format!("'{text}' is not a valid definition for '{name}'"), at)
    })?;
    Ok(Some(Element::DictionaryAdd { name, value, role }))
}

fn comment(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.eat('#') {
        return Ok(None);
    }
    let text = ctx.rest_of_line().trim_start().to_string();
    Ok(Some(Element::Comment { text }))
}

fn property(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.eat('%') {
        return Ok(None);
    }
    let key = ctx.read_chars(
        None,
        false,
        &[CharClass::Letter, CharClass::DecimalDigit],
        &['_', '.', '-'],
    )?;
    if key.is_empty() {
        return Err(ctx.unexpected("a property key"));
    }
    ctx.expect('=')?;
    let value = ctx.read_token(false, &[]);
    Ok(Some(Element::Property { key, value }))
}

fn voice(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.eat('V') {
        return Ok(None);
    }
    let voice = ctx.read_byte_expr()?;
    Ok(Some(Element::Voice { voice }))
}

fn layer(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.eat('L') {
        return Ok(None);
    }
    let layer = ctx.read_byte_expr()?;
    Ok(Some(Element::Layer { layer }))
}

fn tempo(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.eat('T') {
        return Ok(None);
    }
    let bpm = ctx.read_int_expr()?;
    Ok(Some(Element::Tempo { bpm }))
}

fn instrument(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.eat('I') {
        return Ok(None);
    }
    let program = ctx.read_byte_expr()?;
    Ok(Some(Element::Instrument { program }))
}

/// Position of a natural on the circle of fifths, relative to C.
fn circle_position(letter: char) -> Option<i32> {
    match letter {
        'F' => Some(-1),
        'C' => Some(0),
        'G' => Some(1),
        'D' => Some(2),
        'A' => Some(3),
        'E' => Some(4),
        'B' => Some(5),
        _ => None,
    }
}

fn key_signature(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    let start = ctx.position();
    if !ctx.eat('K') {
        return Ok(None);
    }
    let letter = match ctx.peek() {
        Some(c) => c,
        None => return Err(ctx.unexpected("a key")),
    };
    let (Some(position), Some(offset)) = (circle_position(letter), note::letter_offset(letter))
    else {
        return Err(ctx.unexpected("a key letter A-G"));
    };
    ctx.advance();
    let accidentals = note::read_accidentals(ctx, start)?;
    let scale = match ParseKeyword::new(&["maj", "min"]).parse(ctx)? {
        "min" => Scale::Minor,
        _ => Scale::Major,
    };

    let mut fifths = position + 7 * i32::from(accidentals);
    if scale == Scale::Minor {
        fifths -= 3;
    }
    let root = (i32::from(offset) + i32::from(accidentals)).rem_euclid(12) as u8;
    Ok(Some(Element::KeySignature {
        root: Expr::Literal(root),
        fifths: Expr::Literal(fifths),
        scale,
    }))
}

fn controller_index(ctx: &mut ParserContext<'_>) -> Result<IntExpr, ParseError> {
    let index = ctx.read_int_expr()?;
    ctx.expect('=')?;
    Ok(index)
}

fn int_expr(ctx: &mut ParserContext<'_>) -> Result<IntExpr, ParseError> {
    ctx.read_int_expr()
}

fn controller(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.eat('X') {
        return Ok(None);
    }
    let (index, value) = Pair(FromFn(controller_index), FromFn(int_expr)).parse(ctx)?;
    Ok(Some(Element::Controller { index, value }))
}

fn time(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.eat('@') {
        return Ok(None);
    }
    let time = ctx.read_long_expr()?;
    Ok(Some(Element::Time { time }))
}

fn measure(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    Ok(ctx.eat('|').then_some(Element::Measure))
}

fn pitch_bend(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.eat('&') {
        return Ok(None);
    }
    let value = ctx.read_int_expr()?;
    Ok(Some(Element::PitchBend { value }))
}

fn channel_pressure(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.eat('+') {
        return Ok(None);
    }
    let pressure = ctx.read_byte_expr()?;
    Ok(Some(Element::ChannelPressure { pressure }))
}

fn pressure_note(ctx: &mut ParserContext<'_>) -> Result<ByteExpr, ParseError> {
    let note = ctx.read_byte_expr()?;
    ctx.expect(',')?;
    Ok(note)
}

fn byte_expr(ctx: &mut ParserContext<'_>) -> Result<ByteExpr, ParseError> {
    ctx.read_byte_expr()
}

fn polyphonic_pressure(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.eat('*') {
        return Ok(None);
    }
    let (note, pressure) = Pair(FromFn(pressure_note), FromFn(byte_expr)).parse(ctx)?;
    Ok(Some(Element::PolyphonicPressure { note, pressure }))
}

fn system_exclusive(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.eat('^') {
        return Ok(None);
    }
    let mode = ParseSimpleToken::new(&["dec", "hex"], &[':'], false).parse(ctx)?;
    ctx.expect(':')?;
    let bytes = if mode == "hex" {
        let bytes = Repeat(hex_byte()).parse(ctx)?;
        if bytes.is_empty() {
            return Err(ctx.unexpected("hex byte pairs"));
        }
        bytes.into_iter().map(Expr::Literal).collect()
    } else {
        let mut bytes = vec![ctx.read_byte_expr()?];
        while ctx.eat(',') {
            bytes.push(ctx.read_byte_expr()?);
        }
        bytes
    };
    Ok(Some(Element::SystemExclusive { bytes }))
}

/// A token that is nothing but `[name]`. What it becomes depends on the
/// entry's role; plain values and numbers are left to the note rule.
fn bare_reference(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    let start = ctx.position();
    let Some(name) = ctx.read_reference()? else {
        return Ok(None);
    };
    if !ctx.at_token_boundary() || name.chars().all(|c| c.is_ascii_digit()) {
        ctx.rewind(start);
        return Ok(None);
    }
    let role = match ctx.dictionary().get(&name) {
        Some(entry) => entry.role,
        None => return Err(ParseError::from_eval(EvalError::UndefinedKey(name), start)),
    };
    let element = match role {
        Role::Tempo => Element::Tempo {
            bpm: Expr::DictRef(name),
        },
        Role::Instrument => Element::Instrument {
            program: Expr::DictRef(name),
        },
        Role::Voice => Element::Voice {
            voice: Expr::DictRef(name),
        },
        Role::Layer => Element::Layer {
            layer: Expr::DictRef(name),
        },
        Role::Value => Element::Note(NoteElement::new(NoteValue::Numeric(Expr::DictRef(name)))),
    };
    Ok(Some(element))
}

fn note_rule(ctx: &mut ParserContext<'_>) -> Result<Option<Element>, ParseError> {
    if !ctx.peek().is_some_and(note::starts_note) {
        return Ok(None);
    }
    note::read_note_token(ctx).map(Some)
}
