//! # Decoder
//!
//! Maps a raw `(topic, payload)` pair from the bus to a typed `Event`.
//! Unknown topics decode to `None` and are dropped by the dispatch loop.

use crate::domain::event::{Event, Intent};
use crate::domain::topics;

pub fn decode(topic: &str, payload: &str) -> Option<Event> {
    let event = match topic {
        topics::ROBOT_EVENT => Event::RobotEvent {
            name: payload.to_string(),
        },
        topics::PERSON_DETECTED => Event::PersonDetected,
        topics::FACE_RECOGNIZED => Event::FaceRecognized {
            id: payload.to_string(),
        },
        topics::AUDIO_LANGUAGE => Event::LanguageChanged {
            key: payload.to_string(),
        },
        topics::AUDIO_INTENT => Event::IntentDetected(parse_intent(payload)),
        topics::AUDIO_NEWFILE => Event::NewAudioFile {
            path: payload.to_string(),
        },
        topics::TEXT_SPEECH => Event::SpeechText {
            text: payload.to_string(),
        },
        topics::PICTURE_NEWFILE => Event::NewPictureFile {
            path: payload.to_string(),
        },
        _ => return None,
    };
    Some(event)
}

/// `name|arg1|arg2` into an intent. An empty payload is an unnamed intent with no arguments.
pub fn parse_intent(payload: &str) -> Intent {
    let mut fields = payload.split(topics::FIELD_SEPARATOR);
    let name = fields.next().unwrap_or_default().to_string();
    Intent {
        name,
        args: fields.map(str::to_string).collect(),
    }
}
