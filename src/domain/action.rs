//! # Actions
//!
//! Outbound commands for the robot and recognition backends, plus the static
//! table pairing an action with the robot event that reports its completion.

use crate::domain::event::completion;
use crate::domain::topics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub topic: String,
    pub payload: String,
}

impl Action {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// The robot event name that signals this action finished, if the
    /// backend reports one.
    pub fn completion(&self) -> Option<&'static str> {
        completion_for(&self.topic, &self.payload)
    }

    // Setup

    /// Publishes the contents of a Dialogflow key file (not its path).
    pub fn set_dialogflow_key(contents: impl Into<String>) -> Self {
        Self::new(topics::DIALOGFLOW_KEY, contents)
    }

    pub fn set_dialogflow_agent(agent: impl Into<String>) -> Self {
        Self::new(topics::DIALOGFLOW_AGENT, agent)
    }

    /// Full language key, e.g. `nl-NL` or `en-US`.
    pub fn set_language(key: impl Into<String>) -> Self {
        Self::new(topics::AUDIO_LANGUAGE, key)
    }

    pub fn set_record_audio(record: bool) -> Self {
        Self::new(topics::DIALOGFLOW_RECORD, if record { "1" } else { "0" })
    }

    /// Recognition context for the next listening window.
    pub fn set_audio_context(context: impl Into<String>) -> Self {
        Self::new(topics::AUDIO_CONTEXT, context)
    }

    /// Words the recognizer should favour.
    pub fn set_audio_hints<S: AsRef<str>>(hints: &[S]) -> Self {
        let separator = topics::FIELD_SEPARATOR.to_string();
        let joined = hints
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(separator.as_str());
        Self::new(topics::AUDIO_HINTS, joined)
    }

    // Audio / video

    pub fn start_listening() -> Self {
        Self::new(topics::ACTION_AUDIO, "start listening")
    }

    pub fn stop_listening() -> Self {
        Self::new(topics::ACTION_AUDIO, "stop listening")
    }

    pub fn start_looking() -> Self {
        Self::new(topics::ACTION_VIDEO, "start watching")
    }

    pub fn stop_looking() -> Self {
        Self::new(topics::ACTION_VIDEO, "stop watching")
    }

    pub fn take_picture() -> Self {
        Self::new(topics::ACTION_TAKE_PICTURE, "")
    }

    // Behaviour

    pub fn set_idle() -> Self {
        Self::new(topics::ACTION_IDLE, "true")
    }

    pub fn set_non_idle() -> Self {
        Self::new(topics::ACTION_IDLE, "false")
    }

    pub fn say(text: impl Into<String>) -> Self {
        Self::new(topics::ACTION_SAY, text)
    }

    /// Speech with automatic body animation; supports inline voice tags.
    pub fn say_animated(text: impl Into<String>) -> Self {
        Self::new(topics::ACTION_SAY_ANIMATED, text)
    }

    pub fn do_gesture(gesture: impl Into<String>) -> Self {
        Self::new(topics::ACTION_GESTURE, gesture)
    }

    /// An empty file name cancels whatever is playing.
    pub fn play_audio(file: impl Into<String>) -> Self {
        Self::new(topics::ACTION_PLAY_AUDIO, file)
    }

    pub fn set_eye_colour(colour: impl Into<String>) -> Self {
        Self::new(topics::ACTION_EYECOLOUR, colour)
    }

    pub fn turn_left() -> Self {
        Self::new(topics::ACTION_TURN, "left")
    }

    pub fn turn_right() -> Self {
        Self::new(topics::ACTION_TURN, "right")
    }
}

/// Static completion table keyed by outbound topic (and payload for idle).
pub fn completion_for(topic: &str, payload: &str) -> Option<&'static str> {
    match topic {
        topics::ACTION_SAY | topics::ACTION_SAY_ANIMATED => Some(completion::TEXT_DONE),
        topics::ACTION_GESTURE => Some(completion::GESTURE_DONE),
        topics::AUDIO_LANGUAGE => Some(completion::LANGUAGE_CHANGED),
        topics::ACTION_EYECOLOUR => Some(completion::EYE_COLOUR_DONE),
        topics::ACTION_PLAY_AUDIO => Some(completion::PLAY_AUDIO_DONE),
        topics::ACTION_IDLE => match payload {
            "true" => Some(completion::SET_IDLE),
            "false" => Some(completion::SET_NON_IDLE),
            _ => None,
        },
        _ => None,
    }
}
