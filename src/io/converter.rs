use crate::event::{KeyEvent, PitchEvent};
use crate::io::midi::MidiEvent;
use crate::synth::message::SynthMessage;

/// Translate a MIDI message on `channel_filter` into a synth message.
///
/// Note-on with velocity 0 is a note-off. Pitch bend maps to `-1.0..=1.0`.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    if midi.channel() != channel_filter {
        return None;
    }

    match midi {
        MidiEvent::NoteOn { key, velocity: 0, .. } | MidiEvent::NoteOff { key, .. } => {
            Some(SynthMessage::Key(KeyEvent::off(key)))
        }
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::Key(KeyEvent::on(key, velocity))),
        MidiEvent::PitchBend { value, .. } => Some(SynthMessage::Pitch(PitchEvent {
            amount: (value as f32 / 8192.0).clamp(-1.0, 1.0),
        })),
        // All Notes Off / All Sound Off.
        MidiEvent::ControlChange {
            controller: 120 | 123,
            ..
        } => Some(SynthMessage::AllNotesOff),
        MidiEvent::ControlChange { .. } | MidiEvent::ProgramChange { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_with_zero_velocity_releases() {
        let msg = midi_to_synth(
            MidiEvent::NoteOn {
                channel: 0,
                key: 64,
                velocity: 0,
            },
            0,
        );
        assert_eq!(msg, Some(SynthMessage::Key(KeyEvent::off(64))));
    }

    #[test]
    fn other_channels_are_filtered() {
        let on = MidiEvent::NoteOn {
            channel: 3,
            key: 60,
            velocity: 90,
        };
        assert_eq!(midi_to_synth(on, 0), None);
        assert_eq!(midi_to_synth(on, 3), Some(SynthMessage::Key(KeyEvent::on(60, 90))));
    }

    #[test]
    fn pitch_bend_spans_unit_range() {
        let bend = |value| midi_to_synth(MidiEvent::PitchBend { channel: 0, value }, 0);
        assert_eq!(bend(-8192), Some(SynthMessage::Pitch(PitchEvent { amount: -1.0 })));
        assert_eq!(bend(0), Some(SynthMessage::Pitch(PitchEvent { amount: 0.0 })));
        match bend(8191) {
            Some(SynthMessage::Pitch(p)) => assert!(p.amount > 0.999 && p.amount <= 1.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn all_notes_off_controller() {
        let cc = MidiEvent::ControlChange {
            channel: 0,
            controller: 123,
            value: 0,
        };
        assert_eq!(midi_to_synth(cc, 0), Some(SynthMessage::AllNotesOff));
    }
}
