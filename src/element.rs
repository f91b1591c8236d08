//! Element model — what the grammar produces for each token.
//!
//! Elements hold [`Expr`]s, so a dictionary reference read early in a
//! pattern picks up whatever the dictionary holds when the element is fired.
//! [`Element::evaluate`] turns an element into an [`Event`] and performs
//! every range check.

use crate::dictionary::{Dictionary, Role};
use crate::environment::Defaults;
use crate::event::{
    ChannelPressureEvent, ChordEvent, CommentEvent, ControllerEvent, DictionaryAddEvent, Event,
    InstrumentEvent, KeySignatureEvent, LayerEvent, NoteCollectionEvent, NoteEvent, Placement,
    PitchBendEvent, PolyphonicPressureEvent, PropertyEvent, Scale, SystemExclusiveEvent, TempoEvent,
    TimeEvent, VoiceEvent,
};
use crate::expression::{lsb, msb, ByteExpr, DoubleExpr, IntExpr, LongExpr, Value, MAX_14_BIT};
use crate::parser::error::EvalError;

pub const MAX_NOTE: u8 = 127;
pub const MAX_OCTAVE: u8 = 10;
pub const MAX_VOICE: u8 = 15;
pub const MAX_LAYER: u8 = 15;
pub const MAX_DATA_BYTE: u8 = 127;

/// What a note token names before octaves and defaults are applied.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteValue {
    /// A letter name. `offset` is semitones above C after accidentals, so
    /// `Cb` is -1 and `B#` is 12.
    Pitch { offset: i8, octave: Option<ByteExpr> },
    /// An explicit note number, `[60]` or `[NAME]`.
    Numeric(ByteExpr),
    Rest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChordSpec {
    pub name: String,
    pub intervals: Vec<ByteExpr>,
    pub inversion: u8,
}

/// Tuplet ratio: `count` notes in the time of `span`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuplet {
    pub count: u32,
    pub span: u32,
}

impl Default for Tuplet {
    fn default() -> Self {
        Self { count: 3, span: 2 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteElement {
    pub value: NoteValue,
    pub chord: Option<ChordSpec>,
    /// `None` uses the environment's default duration.
    pub duration: Option<DoubleExpr>,
    pub tuplet: Option<Tuplet>,
    pub attack: Option<ByteExpr>,
    pub decay: Option<ByteExpr>,
    pub tie_start: bool,
    pub tie_end: bool,
    pub placement: Placement,
}

impl NoteElement {
    pub fn new(value: NoteValue) -> Self {
        Self {
            value,
            chord: None,
            duration: None,
            tuplet: None,
            attack: None,
            decay: None,
            tie_start: false,
            tie_end: false,
            placement: Placement::Sequential,
        }
    }

    pub fn evaluate(
        &self,
        dictionary: &Dictionary,
        defaults: &Defaults,
    ) -> Result<NoteEvent, EvalError> {
        let rest = matches!(self.value, NoteValue::Rest);
        let value = match &self.value {
            NoteValue::Rest => 0,
            NoteValue::Numeric(expr) => check_max("note", expr.eval(dictionary)?, MAX_NOTE)?,
            NoteValue::Pitch { offset, octave } => {
                let octave = match octave {
                    Some(expr) => check_max("octave", expr.eval(dictionary)?, MAX_OCTAVE)?,
                    None if self.chord.is_some() => defaults.chord_octave,
                    None => defaults.octave,
                };
                let note = i32::from(octave) * 12 + i32::from(*offset);
                u8::try_from(note)
                    .ok()
                    .filter(|n| *n <= MAX_NOTE)
                    .ok_or_else(|| EvalError::out_of_range("note", note, 0, MAX_NOTE))?
            }
        };

        let mut duration = match &self.duration {
            Some(expr) => expr.eval(dictionary)?,
            None => defaults.duration,
        };
        if let Some(tuplet) = self.tuplet {
            duration *= f64::from(tuplet.span) / f64::from(tuplet.count);
        }
        if !(duration > 0.0 && duration.is_finite()) {
            return Err(EvalError::out_of_range("duration", duration, "0 (exclusive)", "inf"));
        }

        let attack = match &self.attack {
            Some(expr) => check_max("attack velocity", expr.eval(dictionary)?, MAX_DATA_BYTE)?,
            None => defaults.attack,
        };
        let decay = match &self.decay {
            Some(expr) => check_max("decay velocity", expr.eval(dictionary)?, MAX_DATA_BYTE)?,
            None => defaults.decay,
        };

        let chord = match &self.chord {
            Some(spec) => Some(evaluate_chord(spec, value, dictionary)?),
            None => None,
        };

        Ok(NoteEvent {
            value,
            rest,
            duration,
            attack,
            decay,
            tie_start: self.tie_start,
            tie_end: self.tie_end,
            placement: self.placement,
            voice: defaults.voice,
            layer: defaults.layer,
            chord,
        })
    }
}

fn evaluate_chord(
    spec: &ChordSpec,
    root: u8,
    dictionary: &Dictionary,
) -> Result<ChordEvent, EvalError> {
    let intervals = spec
        .intervals
        .iter()
        .map(|expr| expr.eval(dictionary))
        .collect::<Result<Vec<u8>, _>>()?;
    if usize::from(spec.inversion) >= intervals.len() {
        return Err(EvalError::out_of_range(
            "chord inversion",
            spec.inversion,
            0,
            intervals.len().saturating_sub(1),
        ));
    }

    let mut notes = intervals
        .iter()
        .map(|i| u16::from(root) + u16::from(*i))
        .collect::<Vec<_>>();
    // Each inversion lifts the lowest remaining note by an octave.
    for _ in 0..spec.inversion {
        notes.sort_unstable();
        notes[0] += 12;
    }
    notes.sort_unstable();

    let notes = notes
        .into_iter()
        .map(|n| {
            u8::try_from(n)
                .ok()
                .filter(|n| *n <= MAX_NOTE)
                .ok_or_else(|| EvalError::out_of_range("chord note", n, 0, MAX_NOTE))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ChordEvent {
        name: spec.name.clone(),
        intervals,
        inversion: spec.inversion,
        notes,
    })
}

fn check_max<T>(field: &'static str, value: T, max: T) -> Result<T, EvalError>
where
    T: PartialOrd + std::fmt::Display + Default,
{
    if value > max {
        Err(EvalError::out_of_range(field, value, T::default(), max))
    } else {
        Ok(value)
    }
}

fn check_range(field: &'static str, value: i32, min: i32, max: i32) -> Result<i32, EvalError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(EvalError::out_of_range(field, value, min, max))
    }
}

/// One parsed token, fields still unevaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Note(NoteElement),
    NoteCollection(Vec<NoteElement>),
    Tempo { bpm: IntExpr },
    KeySignature { root: ByteExpr, fifths: IntExpr, scale: Scale },
    Controller { index: IntExpr, value: IntExpr },
    Instrument { program: ByteExpr },
    Voice { voice: ByteExpr },
    Layer { layer: ByteExpr },
    Measure,
    Time { time: LongExpr },
    SystemExclusive { bytes: Vec<ByteExpr> },
    PitchBend { value: IntExpr },
    ChannelPressure { pressure: ByteExpr },
    PolyphonicPressure { note: ByteExpr, pressure: ByteExpr },
    Comment { text: String },
    Property { key: String, value: String },
    DictionaryAdd { name: String, value: Value, role: Role },
}

impl Element {
    /// Resolve every expression and validate every field.
    pub fn evaluate(
        &self,
        dictionary: &Dictionary,
        defaults: &Defaults,
    ) -> Result<Event, EvalError> {
        let event = match self {
            Element::Note(note) => Event::Note(note.evaluate(dictionary, defaults)?),
            Element::NoteCollection(notes) => Event::NoteCollection(NoteCollectionEvent {
                notes: notes
                    .iter()
                    .map(|note| note.evaluate(dictionary, defaults))
                    .collect::<Result<_, _>>()?,
            }),
            Element::Tempo { bpm } => {
                let bpm = bpm.eval(dictionary)?;
                if bpm <= 0 {
                    return Err(EvalError::out_of_range("tempo", bpm, 1, i32::MAX));
                }
                Event::Tempo(TempoEvent { bpm })
            }
            Element::KeySignature {
                root,
                fifths,
                scale,
            } => {
                let root = root.eval(dictionary)? % 12;
                let fifths = check_range("key signature accidentals", fifths.eval(dictionary)?, -7, 7)?;
                Event::KeySignature(KeySignatureEvent {
                    root,
                    scale: *scale,
                    accidentals: fifths as i8,
                })
            }
            Element::Controller { index, value } => {
                let index = check_range("controller index", index.eval(dictionary)?, 0, MAX_14_BIT)?;
                let raw = value.eval(dictionary)?;
                let messages = if index > i32::from(MAX_DATA_BYTE) {
                    let value = check_range("controller value", raw, 0, MAX_14_BIT)?;
                    vec![(msb(index), msb(value)), (lsb(index), lsb(value))]
                } else {
                    let value = check_range("controller value", raw, 0, i32::from(MAX_DATA_BYTE))?;
                    vec![(index as u8, value as u8)]
                };
                Event::Controller(ControllerEvent {
                    voice: defaults.voice,
                    index,
                    value: raw,
                    messages,
                })
            }
            Element::Instrument { program } => Event::Instrument(InstrumentEvent {
                voice: defaults.voice,
                program: check_max("instrument", program.eval(dictionary)?, MAX_DATA_BYTE)?,
            }),
            Element::Voice { voice } => Event::Voice(VoiceEvent {
                voice: check_max("voice", voice.eval(dictionary)?, MAX_VOICE)?,
            }),
            Element::Layer { layer } => Event::Layer(LayerEvent {
                layer: check_max("layer", layer.eval(dictionary)?, MAX_LAYER)?,
            }),
            Element::Measure => Event::Measure,
            Element::Time { time } => {
                let time = time.eval(dictionary)?;
                if time < 0 {
                    return Err(EvalError::out_of_range("time", time, 0, i64::MAX));
                }
                Event::Time(TimeEvent { time })
            }
            Element::SystemExclusive { bytes } => Event::SystemExclusive(SystemExclusiveEvent {
                bytes: bytes
                    .iter()
                    .map(|b| b.eval(dictionary))
                    .collect::<Result<_, _>>()?,
            }),
            Element::PitchBend { value } => {
                let value = check_range("pitch bend", value.eval(dictionary)?, 0, MAX_14_BIT)?;
                Event::PitchBend(PitchBendEvent {
                    voice: defaults.voice,
                    value,
                    lsb: lsb(value),
                    msb: msb(value),
                })
            }
            Element::ChannelPressure { pressure } => {
                Event::ChannelPressure(ChannelPressureEvent {
                    voice: defaults.voice,
                    pressure: check_max("pressure", pressure.eval(dictionary)?, MAX_DATA_BYTE)?,
                })
            }
            Element::PolyphonicPressure { note, pressure } => {
                Event::PolyphonicPressure(PolyphonicPressureEvent {
                    voice: defaults.voice,
                    note: check_max("note", note.eval(dictionary)?, MAX_NOTE)?,
                    pressure: check_max("pressure", pressure.eval(dictionary)?, MAX_DATA_BYTE)?,
                })
            }
            Element::Comment { text } => Event::Comment(CommentEvent { text: text.clone() }),
            Element::Property { key, value } => Event::Property(PropertyEvent {
                key: key.clone(),
                value: value.clone(),
            }),
            Element::DictionaryAdd { name, value, role } => {
                Event::DictionaryAdd(DictionaryAddEvent {
                    name: name.clone(),
                    value: *value,
                    role: *role,
                })
            }
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn pitch(offset: i8) -> NoteElement {
        NoteElement::new(NoteValue::Pitch {
            offset,
            octave: None,
        })
    }

    fn eval(element: &Element) -> Result<Event, EvalError> {
        element.evaluate(&Dictionary::standard(), &Defaults::default())
    }

    #[test]
    fn note_uses_default_octave() {
        let event = pitch(0).evaluate(&Dictionary::new(), &Defaults::default()).unwrap();
        assert_eq!(event.value, 60);
        assert_approx_eq!(event.duration, 0.25);
        assert_eq!(event.attack, 64);
        assert!(!event.rest);
    }

    #[test]
    fn octave_ten_overflows_above_g() {
        let mut note = pitch(7);
        note.value = NoteValue::Pitch {
            offset: 7,
            octave: Some(ByteExpr::Literal(10)),
        };
        assert_eq!(note.evaluate(&Dictionary::new(), &Defaults::default()).unwrap().value, 127);

        note.value = NoteValue::Pitch {
            offset: 9,
            octave: Some(ByteExpr::Literal(10)),
        };
        assert!(note.evaluate(&Dictionary::new(), &Defaults::default()).is_err());
    }

    #[test]
    fn c_flat_zero_is_out_of_range() {
        let note = NoteElement::new(NoteValue::Pitch {
            offset: -1,
            octave: Some(ByteExpr::Literal(0)),
        });
        let err = note.evaluate(&Dictionary::new(), &Defaults::default()).unwrap_err();
        assert!(matches!(err, EvalError::OutOfRange { field: "note", .. }));
    }

    #[test]
    fn triplet_shortens_duration() {
        let mut note = pitch(0);
        note.duration = Some(DoubleExpr::Literal(0.25));
        note.tuplet = Some(Tuplet::default());
        let event = note.evaluate(&Dictionary::new(), &Defaults::default()).unwrap();
        assert_approx_eq!(event.duration, 0.25 * 2.0 / 3.0);
    }

    #[test]
    fn zero_duration_rejected() {
        let mut note = pitch(0);
        note.duration = Some(DoubleExpr::Literal(0.0));
        assert!(note.evaluate(&Dictionary::new(), &Defaults::default()).is_err());
    }

    #[test]
    fn chord_inversion_lifts_lowest_notes() {
        let mut note = pitch(0);
        note.chord = Some(ChordSpec {
            name: "maj".into(),
            intervals: [0u8, 4, 7].iter().map(|i| ByteExpr::Literal(*i)).collect(),
            inversion: 1,
        });
        let event = note.evaluate(&Dictionary::new(), &Defaults::default()).unwrap();
        assert_eq!(event.value, 36);
        assert_eq!(event.chord.unwrap().notes, vec![40, 43, 48]);
    }

    #[test]
    fn too_many_inversions_rejected() {
        let mut note = pitch(0);
        note.chord = Some(ChordSpec {
            name: "maj".into(),
            intervals: [0u8, 4, 7].iter().map(|i| ByteExpr::Literal(*i)).collect(),
            inversion: 3,
        });
        assert!(note.evaluate(&Dictionary::new(), &Defaults::default()).is_err());
    }

    #[test]
    fn combined_controller_splits() {
        let element = Element::Controller {
            index: IntExpr::dict_ref("VOLUME"),
            value: IntExpr::Literal(10200),
        };
        let Event::Controller(event) = eval(&element).unwrap() else {
            panic!("expected controller");
        };
        assert_eq!(event.messages, vec![(7, 79), (39, 88)]);
    }

    #[test]
    fn single_controller_limits_value() {
        let element = Element::Controller {
            index: IntExpr::Literal(64),
            value: IntExpr::Literal(128),
        };
        assert!(eval(&element).is_err());
        let element = Element::Controller {
            index: IntExpr::Literal(64),
            value: IntExpr::dict_ref("ON"),
        };
        let Event::Controller(event) = eval(&element).unwrap() else {
            panic!("expected controller");
        };
        assert_eq!(event.messages, vec![(64, 127)]);
    }

    #[test]
    fn voice_range_checked() {
        assert!(eval(&Element::Voice { voice: ByteExpr::Literal(15) }).is_ok());
        let err = eval(&Element::Voice { voice: ByteExpr::Literal(16) }).unwrap_err();
        assert_eq!(err, EvalError::out_of_range("voice", 16, 0, 15));
    }

    #[test]
    fn pitch_bend_split() {
        let Event::PitchBend(event) = eval(&Element::PitchBend {
            value: IntExpr::Literal(8192),
        })
        .unwrap() else {
            panic!("expected pitch bend");
        };
        assert_eq!((event.msb, event.lsb), (64, 0));
        assert!(eval(&Element::PitchBend {
            value: IntExpr::Literal(16384)
        })
        .is_err());
    }

    #[test]
    fn tempo_must_be_positive() {
        assert!(eval(&Element::Tempo { bpm: IntExpr::Literal(0) }).is_err());
        assert_eq!(
            eval(&Element::Tempo { bpm: IntExpr::dict_ref("ADAGIO") }).unwrap(),
            Event::Tempo(TempoEvent { bpm: 60 })
        );
    }

    #[test]
    fn key_signature_limits_accidentals() {
        let element = Element::KeySignature {
            root: ByteExpr::Literal(5),
            fifths: IntExpr::Literal(-11),
            scale: Scale::Minor,
        };
        assert!(eval(&element).is_err());
    }

    #[test]
    fn undefined_reference_surfaces() {
        let err = eval(&Element::Instrument {
            program: ByteExpr::dict_ref("KAZOO"),
        })
        .unwrap_err();
        assert_eq!(err, EvalError::UndefinedKey("KAZOO".into()));
    }
}
