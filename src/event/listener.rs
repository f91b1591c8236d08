//! Listener (visitor) protocol.
//!
//! A listener overrides only the callbacks it cares about; everything else
//! is a no-op. Returning an error aborts the parse at the firing token.

use std::error::Error;
use std::sync::{Arc, Mutex};

use super::types::*;

pub type ListenerResult = Result<(), Box<dyn Error + Send + Sync>>;

pub trait Listener: Send {
    /// Catch-all for single notes. The placement and chord callbacks forward
    /// here unless overridden.
    fn note(&mut self, _note: &NoteEvent) -> ListenerResult {
        Ok(())
    }

    fn sequential_note(&mut self, note: &NoteEvent) -> ListenerResult {
        self.note(note)
    }

    fn parallel_note(&mut self, note: &NoteEvent) -> ListenerResult {
        self.note(note)
    }

    fn chord(&mut self, note: &NoteEvent) -> ListenerResult {
        self.note(note)
    }

    /// Visits each member in order by default.
    fn note_collection(&mut self, collection: &NoteCollectionEvent) -> ListenerResult {
        for note in &collection.notes {
            visit_note(self, note)?;
        }
        Ok(())
    }

    fn tempo(&mut self, _tempo: &TempoEvent) -> ListenerResult {
        Ok(())
    }

    fn key_signature(&mut self, _key: &KeySignatureEvent) -> ListenerResult {
        Ok(())
    }

    fn controller(&mut self, _controller: &ControllerEvent) -> ListenerResult {
        Ok(())
    }

    fn instrument(&mut self, _instrument: &InstrumentEvent) -> ListenerResult {
        Ok(())
    }

    fn voice(&mut self, _voice: &VoiceEvent) -> ListenerResult {
        Ok(())
    }

    fn layer(&mut self, _layer: &LayerEvent) -> ListenerResult {
        Ok(())
    }

    fn measure(&mut self) -> ListenerResult {
        Ok(())
    }

    fn time(&mut self, _time: &TimeEvent) -> ListenerResult {
        Ok(())
    }

    fn pitch_bend(&mut self, _bend: &PitchBendEvent) -> ListenerResult {
        Ok(())
    }

    fn channel_pressure(&mut self, _pressure: &ChannelPressureEvent) -> ListenerResult {
        Ok(())
    }

    fn polyphonic_pressure(&mut self, _pressure: &PolyphonicPressureEvent) -> ListenerResult {
        Ok(())
    }

    fn system_exclusive(&mut self, _sysex: &SystemExclusiveEvent) -> ListenerResult {
        Ok(())
    }

    fn comment(&mut self, _comment: &CommentEvent) -> ListenerResult {
        Ok(())
    }

    fn property(&mut self, _property: &PropertyEvent) -> ListenerResult {
        Ok(())
    }

    fn dictionary_add(&mut self, _add: &DictionaryAddEvent) -> ListenerResult {
        Ok(())
    }
}

/// Route a note to `chord`, `parallel_note` or `sequential_note`.
pub fn visit_note<L: Listener + ?Sized>(listener: &mut L, note: &NoteEvent) -> ListenerResult {
    if note.chord.is_some() {
        listener.chord(note)
    } else {
        match note.placement {
            Placement::Sequential => listener.sequential_note(note),
            Placement::Parallel => listener.parallel_note(note),
        }
    }
}

impl Event {
    /// Call the one listener callback matching this event.
    pub fn accept(&self, listener: &mut dyn Listener) -> ListenerResult {
        match self {
            Event::Note(note) => visit_note(listener, note),
            Event::NoteCollection(collection) => listener.note_collection(collection),
            Event::Tempo(tempo) => listener.tempo(tempo),
            Event::KeySignature(key) => listener.key_signature(key),
            Event::Controller(controller) => listener.controller(controller),
            Event::Instrument(instrument) => listener.instrument(instrument),
            Event::Voice(voice) => listener.voice(voice),
            Event::Layer(layer) => listener.layer(layer),
            Event::Measure => listener.measure(),
            Event::Time(time) => listener.time(time),
            Event::SystemExclusive(sysex) => listener.system_exclusive(sysex),
            Event::PitchBend(bend) => listener.pitch_bend(bend),
            Event::ChannelPressure(pressure) => listener.channel_pressure(pressure),
            Event::PolyphonicPressure(pressure) => listener.polyphonic_pressure(pressure),
            Event::Comment(comment) => listener.comment(comment),
            Event::Property(property) => listener.property(property),
            Event::DictionaryAdd(add) => listener.dictionary_add(add),
        }
    }
}

/// Records every event it receives. Clones share one buffer, so a clone kept
/// by the caller sees what the registered copy recorded.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<Event> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.events.lock() {
            Ok(events) => events.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        match self.events.lock() {
            Ok(mut events) => events.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    fn record(&self, event: Event) -> ListenerResult {
        self.events
            .lock()
            .map_err(|_| "event log mutex poisoned")?
            .push(event);
        Ok(())
    }
}

impl Listener for EventLog {
    fn note(&mut self, note: &NoteEvent) -> ListenerResult {
        self.record(Event::Note(note.clone()))
    }

    fn note_collection(&mut self, collection: &NoteCollectionEvent) -> ListenerResult {
        self.record(Event::NoteCollection(collection.clone()))
    }

    fn tempo(&mut self, tempo: &TempoEvent) -> ListenerResult {
        self.record(Event::Tempo(*tempo))
    }

    fn key_signature(&mut self, key: &KeySignatureEvent) -> ListenerResult {
        self.record(Event::KeySignature(*key))
    }

    fn controller(&mut self, controller: &ControllerEvent) -> ListenerResult {
        self.record(Event::Controller(controller.clone()))
    }

    fn instrument(&mut self, instrument: &InstrumentEvent) -> ListenerResult {
        self.record(Event::Instrument(*instrument))
    }

    fn voice(&mut self, voice: &VoiceEvent) -> ListenerResult {
        self.record(Event::Voice(*voice))
    }

    fn layer(&mut self, layer: &LayerEvent) -> ListenerResult {
        self.record(Event::Layer(*layer))
    }

    fn measure(&mut self) -> ListenerResult {
        self.record(Event::Measure)
    }

    fn time(&mut self, time: &TimeEvent) -> ListenerResult {
        self.record(Event::Time(*time))
    }

    fn pitch_bend(&mut self, bend: &PitchBendEvent) -> ListenerResult {
        self.record(Event::PitchBend(*bend))
    }

    fn channel_pressure(&mut self, pressure: &ChannelPressureEvent) -> ListenerResult {
        self.record(Event::ChannelPressure(*pressure))
    }

    fn polyphonic_pressure(&mut self, pressure: &PolyphonicPressureEvent) -> ListenerResult {
        self.record(Event::PolyphonicPressure(*pressure))
    }

    fn system_exclusive(&mut self, sysex: &SystemExclusiveEvent) -> ListenerResult {
        self.record(Event::SystemExclusive(sysex.clone()))
    }

    fn comment(&mut self, comment: &CommentEvent) -> ListenerResult {
        self.record(Event::Comment(comment.clone()))
    }

    fn property(&mut self, property: &PropertyEvent) -> ListenerResult {
        self.record(Event::Property(property.clone()))
    }

    fn dictionary_add(&mut self, add: &DictionaryAddEvent) -> ListenerResult {
        self.record(Event::DictionaryAdd(add.clone()))
    }
}
