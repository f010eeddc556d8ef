#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::event::{KeyEvent, PitchEvent};

/// Performance messages queued for the render thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    Key(KeyEvent),
    Pitch(PitchEvent),
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Receiver that never has anything queued, for offline rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMessages;

impl MessageReceiver for NoMessages {
    fn pop(&mut self) -> Option<SynthMessage> {
        None
    }
}

#[cfg(all(test, feature = "rtrb"))]
mod tests {
    use super::*;
    use rtrb::RingBuffer;

    #[test]
    fn ring_buffer_delivers_in_order() {
        let (mut tx, mut rx) = RingBuffer::<SynthMessage>::new(4);
        tx.push(SynthMessage::Key(KeyEvent::on(60, 100))).unwrap();
        tx.push(SynthMessage::AllNotesOff).unwrap();

        assert_eq!(MessageReceiver::pop(&mut rx), Some(SynthMessage::Key(KeyEvent::on(60, 100))));
        assert_eq!(MessageReceiver::pop(&mut rx), Some(SynthMessage::AllNotesOff));
        assert_eq!(MessageReceiver::pop(&mut rx), None);
    }
}
