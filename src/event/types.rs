//! Event data model — the fully evaluated form of every element.
//!
//! Events carry plain values only: every dictionary reference has been
//! resolved and every omitted field filled from the environment's defaults,
//! so a listener never needs the dictionary.

use serde::Serialize;

use crate::dictionary::Role;
use crate::expression::Value;

/// Whether a note advances the timeline or sounds with the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    Major,
    Minor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordEvent {
    pub name: String,
    pub intervals: Vec<u8>,
    pub inversion: u8,
    /// Note numbers after the inversion is applied, lowest first.
    pub notes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteEvent {
    /// Note number (0–127). Zero for rests.
    pub value: u8,
    pub rest: bool,
    /// Length in whole notes.
    pub duration: f64,
    pub attack: u8,
    pub decay: u8,
    pub tie_start: bool,
    pub tie_end: bool,
    pub placement: Placement,
    pub voice: u8,
    pub layer: u8,
    pub chord: Option<ChordEvent>,
}

/// Notes joined with `+` or `_` inside one token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteCollectionEvent {
    pub notes: Vec<NoteEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TempoEvent {
    pub bpm: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeySignatureEvent {
    /// Pitch class of the tonic (0 = C).
    pub root: u8,
    pub scale: Scale,
    /// Sharps (positive) or flats (negative) in the signature.
    pub accidentals: i8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerEvent {
    pub voice: u8,
    pub index: i32,
    pub value: i32,
    /// `(controller number, data byte)` pairs to transmit. A combined 14-bit
    /// controller yields its coarse number with the MSB, then its fine number
    /// with the LSB.
    pub messages: Vec<(u8, u8)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstrumentEvent {
    pub voice: u8,
    pub program: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoiceEvent {
    pub voice: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerEvent {
    pub layer: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeEvent {
    pub time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PitchBendEvent {
    pub voice: u8,
    pub value: i32,
    pub lsb: u8,
    pub msb: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelPressureEvent {
    pub voice: u8,
    pub pressure: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolyphonicPressureEvent {
    pub voice: u8,
    pub note: u8,
    pub pressure: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemExclusiveEvent {
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentEvent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyEvent {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryAddEvent {
    pub name: String,
    pub value: Value,
    pub role: Role,
}

/// One decoded musical construct, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Note(NoteEvent),
    NoteCollection(NoteCollectionEvent),
    Tempo(TempoEvent),
    KeySignature(KeySignatureEvent),
    Controller(ControllerEvent),
    Instrument(InstrumentEvent),
    Voice(VoiceEvent),
    Layer(LayerEvent),
    Measure,
    Time(TimeEvent),
    SystemExclusive(SystemExclusiveEvent),
    PitchBend(PitchBendEvent),
    ChannelPressure(ChannelPressureEvent),
    PolyphonicPressure(PolyphonicPressureEvent),
    Comment(CommentEvent),
    Property(PropertyEvent),
    DictionaryAdd(DictionaryAddEvent),
}

impl Event {
    /// Short name of the variant, for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Note(_) => "note",
            Event::NoteCollection(_) => "note collection",
            Event::Tempo(_) => "tempo",
            Event::KeySignature(_) => "key signature",
            Event::Controller(_) => "controller",
            Event::Instrument(_) => "instrument",
            Event::Voice(_) => "voice",
            Event::Layer(_) => "layer",
            Event::Measure => "measure",
            Event::Time(_) => "time",
            Event::SystemExclusive(_) => "system exclusive",
            Event::PitchBend(_) => "pitch bend",
            Event::ChannelPressure(_) => "channel pressure",
            Event::PolyphonicPressure(_) => "polyphonic pressure",
            Event::Comment(_) => "comment",
            Event::Property(_) => "property",
            Event::DictionaryAdd(_) => "dictionary add",
        }
    }

    pub fn as_note(&self) -> Option<&NoteEvent> {
        match self {
            Event::Note(note) => Some(note),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(Event::Measure.kind(), "measure");
        assert_eq!(Event::Tempo(TempoEvent { bpm: 90 }).kind(), "tempo");
    }

    #[test]
    fn serializes_with_type_tag() {
        let yaml = serde_yaml::to_string(&Event::Tempo(TempoEvent { bpm: 120 })).unwrap();
        assert!(yaml.contains("type: tempo"));
        assert!(yaml.contains("bpm: 120"));

        let yaml = serde_yaml::to_string(&Event::Measure).unwrap();
        assert!(yaml.contains("type: measure"));
    }

    #[test]
    fn as_note_only_for_notes() {
        assert!(Event::Measure.as_note().is_none());
    }
}
