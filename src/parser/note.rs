//! Note token grammar — `C`, `Eb6h.`, `Cmaj^^w`, `[60]i`, `C+E+G`, `C5qa100d40`.
//!
//! Format: `<value><octave?><chord?><tie-end?><duration?><tuplet?><tie-start?><velocity?>`
//! - Value: `A`–`G` with any of `#`, `b`, `n`; `R` for a rest; `[n]` or `[NAME]`
//! - Octave: 0–10 (octave 5 holds middle C, note 60)
//! - Chord: a name from the chord table, then one `^` per inversion
//! - Duration: letters `w h q i s t x o`, each optionally dotted, summed; or `/<double>`
//! - Tuplet: `*` (3:2) or `*n:m`
//! - Velocity: `a<byte>` attack, `d<byte>` decay
//!
//! Notes joined by `+` (parallel) or `_` (sequential) form one collection.

use crate::element::{ChordSpec, Element, NoteElement, NoteValue, Tuplet};
use crate::event::Placement;
use crate::expression::{ByteExpr, DoubleExpr, Expr};

use super::chord;
use super::error::{EvalError, ParseError};
use super::primitives::{Optional, ParseChars, ParseKeyword, Rule};
use super::reader::{CharClass, ParserContext};

/// Semitones above C for a note letter.
pub fn letter_offset(c: char) -> Option<i8> {
    match c {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Length in whole notes of a duration letter.
pub fn letter_duration(c: char) -> Option<f64> {
    match c {
        'w' => Some(1.0),
        'h' => Some(0.5),
        'q' => Some(0.25),
        'i' => Some(0.125),
        's' => Some(0.0625),
        't' => Some(0.03125),
        'x' => Some(0.015625),
        'o' => Some(0.0078125),
        _ => None,
    }
}

/// True if a note token can start with `c`.
pub fn starts_note(c: char) -> bool {
    letter_offset(c).is_some() || c == 'R' || c == '['
}

/// Read one note token: a single note, or a `+`/`_` joined collection.
pub fn read_note_token(ctx: &mut ParserContext<'_>) -> Result<Element, ParseError> {
    let mut notes = vec![read_note(ctx, Placement::Sequential)?];
    loop {
        let placement = if ctx.eat('+') {
            Placement::Parallel
        } else if ctx.eat('_') {
            Placement::Sequential
        } else {
            break;
        };
        notes.push(read_note(ctx, placement)?);
    }
    if notes.len() == 1 {
        Ok(Element::Note(notes.remove(0)))
    } else {
        Ok(Element::NoteCollection(notes))
    }
}

fn read_note(ctx: &mut ParserContext<'_>, placement: Placement) -> Result<NoteElement, ParseError> {
    let value = read_value(ctx)?;
    let rest = matches!(value, NoteValue::Rest);
    let mut note = NoteElement::new(value);
    note.placement = placement;

    if !rest {
        note.chord = read_chord(ctx)?;
    }

    if ctx.peek() == Some('-') {
        if ctx.peek_at(1).is_some_and(starts_duration) {
            note.tie_end = true;
        } else {
            note.tie_start = true;
        }
        ctx.advance();
    }

    note.duration = read_duration(ctx)?;
    note.tuplet = read_tuplet(ctx)?;
    if ctx.eat('-') {
        note.tie_start = true;
    }

    loop {
        if ctx.eat('a') {
            note.attack = Some(ctx.read_byte_expr()?);
        } else if ctx.eat('d') {
            note.decay = Some(ctx.read_byte_expr()?);
        } else {
            break;
        }
    }
    Ok(note)
}

fn starts_duration(c: char) -> bool {
    letter_duration(c).is_some() || c == '/'
}

fn read_value(ctx: &mut ParserContext<'_>) -> Result<NoteValue, ParseError> {
    let start = ctx.position();
    match ctx.peek() {
        Some('R') => {
            ctx.advance();
            Ok(NoteValue::Rest)
        }
        Some('[') => {
            let Some(name) = ctx.read_reference()? else {
                return Err(ctx.unexpected("a note"));
            };
            if name.chars().all(|c| c.is_ascii_digit()) {
                let value = name.parse::<u8>().map_err(|_| {
                    ParseError::grammar(format!("note number '{name}' does not fit in a byte"), start)
                })?;
                Ok(NoteValue::Numeric(Expr::Literal(value)))
            } else {
                Ok(NoteValue::Numeric(Expr::DictRef(name)))
            }
        }
        Some(c) => {
            let Some(base) = letter_offset(c) else {
                return Err(ctx.unexpected("a note"));
            };
            ctx.advance();
            let offset = base + read_accidentals(ctx, start)?;
            let octave = read_octave(ctx)?;
            Ok(NoteValue::Pitch { offset, octave })
        }
        None => Err(ctx.unexpected("a note")),
    }
}

/// Largest net number of sharps or flats on one letter.
pub const MAX_ACCIDENTALS: i32 = 12;

/// Sum of `#` (+1) and `b` (-1); `n` cancels everything before it.
///
/// A net total beyond [`MAX_ACCIDENTALS`] fails at `start`, the start of the
/// token.
pub fn read_accidentals(ctx: &mut ParserContext<'_>, start: usize) -> Result<i8, ParseError> {
    let mut offset: i32 = 0;
    loop {
        match ctx.peek() {
            Some('#') => offset = offset.saturating_add(1),
            Some('b') => offset = offset.saturating_sub(1),
            Some('n') => offset = 0,
            _ => break,
        }
        ctx.advance();
    }
    i8::try_from(offset)
        .ok()
        .filter(|o| i32::from(*o).abs() <= MAX_ACCIDENTALS)
        .ok_or_else(|| {
            ParseError::from_eval(
                EvalError::out_of_range("accidentals", offset, -MAX_ACCIDENTALS, MAX_ACCIDENTALS),
                start,
            )
        })
}

fn read_octave(ctx: &mut ParserContext<'_>) -> Result<Option<ByteExpr>, ParseError> {
    let digits = ParseChars {
        strict: false,
        looking_for: Vec::new(),
        classes: vec![CharClass::DecimalDigit],
        count: Some(Expr::Literal(2)),
    }
    .parse(ctx)?;
    if digits.is_empty() {
        return Ok(None);
    }
    // Two decimal digits always fit a byte.
    let octave = digits.parse::<u8>().unwrap_or(u8::MAX);
    Ok(Some(Expr::Literal(octave)))
}

fn read_chord(ctx: &mut ParserContext<'_>) -> Result<Option<ChordSpec>, ParseError> {
    let Some(name) = Optional(ParseKeyword::new(&chord::chord_names())).parse(ctx)? else {
        return Ok(None);
    };
    let intervals = chord::intervals(name)
        .unwrap_or_default()
        .iter()
        .map(|i| Expr::Literal(*i))
        .collect();
    let mut inversion: u8 = 0;
    while ctx.eat('^') {
        inversion = inversion.saturating_add(1);
    }
    Ok(Some(ChordSpec {
        name: name.to_string(),
        intervals,
        inversion,
    }))
}

fn read_duration(ctx: &mut ParserContext<'_>) -> Result<Option<DoubleExpr>, ParseError> {
    if ctx.eat('/') {
        return ctx.read_double_expr().map(Some);
    }
    let mut total = 0.0;
    let mut found = false;
    while let Some(length) = ctx.peek().and_then(letter_duration) {
        ctx.advance();
        found = true;
        total += length;
        let mut increment = length;
        while ctx.eat('.') {
            increment /= 2.0;
            total += increment;
        }
    }
    Ok(found.then_some(Expr::Literal(total)))
}

fn read_tuplet(ctx: &mut ParserContext<'_>) -> Result<Option<Tuplet>, ParseError> {
    if !ctx.eat('*') {
        return Ok(None);
    }
    if !ctx.peek().is_some_and(|c| c.is_ascii_digit()) {
        return Ok(Some(Tuplet::default()));
    }
    let start = ctx.position();
    let count = read_ratio_part(ctx)?;
    ctx.expect(':')?;
    let span = read_ratio_part(ctx)?;
    if count == 0 || span == 0 {
        return Err(ParseError::grammar(
            format!("tuplet {count}:{span} must not contain zero"),
            start,
        ));
    }
    Ok(Some(Tuplet { count, span }))
}

fn read_ratio_part(ctx: &mut ParserContext<'_>) -> Result<u32, ParseError> {
    let start = ctx.position();
    let digits = ctx.read_chars(None, false, &[CharClass::DecimalDigit], &[])?;
    if digits.is_empty() {
        return Err(ctx.unexpected("a tuplet number"));
    }
    digits
        .parse()
        .map_err(|_| ParseError::grammar(format!("tuplet number '{digits}' is too large"), start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::parser::error::ErrorKind;
    use assert_approx_eq::assert_approx_eq;

    fn parse(s: &str) -> Result<Element, ParseError> {
        let dictionary = Dictionary::new();
        let input: Vec<char> = s.chars().collect();
        let mut ctx = ParserContext::new(&input, &dictionary);
        let element = read_note_token(&mut ctx)?;
        assert!(ctx.is_at_end(), "unconsumed input in {s:?}");
        Ok(element)
    }

    fn note(s: &str) -> NoteElement {
        match parse(s).unwrap() {
            Element::Note(note) => note,
            other => panic!("expected a single note, got {other:?}"),
        }
    }

    fn literal_duration(note: &NoteElement) -> f64 {
        match note.duration {
            Some(Expr::Literal(d)) => d,
            ref other => panic!("expected literal duration, got {other:?}"),
        }
    }

    #[test]
    fn plain_letter() {
        let n = note("C");
        assert_eq!(
            n.value,
            NoteValue::Pitch {
                offset: 0,
                octave: None
            }
        );
        assert!(n.duration.is_none());
        assert_eq!(n.placement, Placement::Sequential);
    }

    #[test]
    fn accidentals_and_octave() {
        assert_eq!(
            note("D#5").value,
            NoteValue::Pitch {
                offset: 3,
                octave: Some(Expr::Literal(5))
            }
        );
        assert_eq!(
            note("Cb").value,
            NoteValue::Pitch {
                offset: -1,
                octave: None
            }
        );
        assert_eq!(
            note("F#n10").value,
            NoteValue::Pitch {
                offset: 5,
                octave: Some(Expr::Literal(10))
            }
        );
    }

    #[test]
    fn long_accidental_runs() {
        let twelve = format!("C{}", "#".repeat(12));
        assert_eq!(
            note(&twelve).value,
            NoteValue::Pitch {
                offset: 12,
                octave: None
            }
        );

        let cancelled = format!("C{}n", "b".repeat(40));
        assert_eq!(
            note(&cancelled).value,
            NoteValue::Pitch {
                offset: 0,
                octave: None
            }
        );

        let err = parse(&format!("B{}", "#".repeat(117))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueOutOfRange);
        assert_eq!(err.position, 0);

        let err = parse(&format!("C{}", "#".repeat(256))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueOutOfRange);
    }

    #[test]
    fn dotted_and_summed_durations() {
        assert_approx_eq!(literal_duration(&note("Eb6h.")), 0.75);
        assert_approx_eq!(literal_duration(&note("Cq..")), 0.4375);
        assert_approx_eq!(literal_duration(&note("Cwh")), 1.5);
        assert_approx_eq!(literal_duration(&note("Co")), 0.0078125);
    }

    #[test]
    fn numeric_duration() {
        assert_approx_eq!(literal_duration(&note("C/0.3")), 0.3);
        assert_eq!(note("C/[D]").duration, Some(Expr::dict_ref("D")));
    }

    #[test]
    fn tuplets() {
        assert_eq!(note("Ci*").tuplet, Some(Tuplet { count: 3, span: 2 }));
        assert_eq!(note("Ci*5:4").tuplet, Some(Tuplet { count: 5, span: 4 }));
        assert!(parse("Ci*0:4").is_err());
        assert!(parse("Ci*5").is_err());
    }

    #[test]
    fn ties() {
        let n = note("C5q-");
        assert!(n.tie_start && !n.tie_end);
        let n = note("C5-q");
        assert!(n.tie_end && !n.tie_start);
        let n = note("C5-q-");
        assert!(n.tie_end && n.tie_start);
    }

    #[test]
    fn velocity() {
        let n = note("C5qa100d40");
        assert_eq!(n.attack, Some(Expr::Literal(100)));
        assert_eq!(n.decay, Some(Expr::Literal(40)));
        let n = note("Cd[SOFT]");
        assert_eq!(n.decay, Some(Expr::dict_ref("SOFT")));
    }

    #[test]
    fn chords_and_inversions() {
        let n = note("Cmaj^^w");
        let chord = n.chord.unwrap();
        assert_eq!(chord.name, "maj");
        assert_eq!(chord.inversion, 2);
        assert_eq!(chord.intervals.len(), 3);

        let n = note("Cmaj7");
        assert_eq!(n.chord.unwrap().name, "maj7");
        let n = note("Gdom7<5>9h");
        assert_eq!(n.chord.unwrap().name, "dom7<5>9");
    }

    #[test]
    fn sixteenth_is_not_a_chord() {
        let n = note("Cs");
        assert!(n.chord.is_none());
        assert_approx_eq!(literal_duration(&n), 0.0625);
    }

    #[test]
    fn numeric_and_named_values() {
        assert_eq!(note("[60]i").value, NoteValue::Numeric(Expr::Literal(60)));
        assert_eq!(
            note("[ACOUSTIC_SNARE]q").value,
            NoteValue::Numeric(Expr::dict_ref("ACOUSTIC_SNARE"))
        );
        assert_eq!(parse("[300]").unwrap_err().kind, ErrorKind::Grammar);
    }

    #[test]
    fn rest() {
        let n = note("Rq");
        assert_eq!(n.value, NoteValue::Rest);
        assert!(n.chord.is_none());
    }

    #[test]
    fn collections() {
        let Element::NoteCollection(notes) = parse("C+E+G").unwrap() else {
            panic!("expected collection");
        };
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[0].placement, Placement::Sequential);
        assert_eq!(notes[1].placement, Placement::Parallel);
        assert_eq!(notes[2].placement, Placement::Parallel);

        let Element::NoteCollection(notes) = parse("Cq_Dq_Eh").unwrap() else {
            panic!("expected collection");
        };
        assert!(notes.iter().all(|n| n.placement == Placement::Sequential));
    }

    #[test]
    fn dangling_connector_fails() {
        let err = parse("C+").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Grammar);
        assert_eq!(err.position, 2);
    }
}
