//! # Events
//!
//! Typed notifications decoded from the bus. Each inbound topic maps to
//! exactly one variant.

use serde::{Deserialize, Serialize};

/// Completion names the robot backend echoes on the robot-event topic.
pub mod completion {
    pub const TEXT_DONE: &str = "TextDone";
    pub const GESTURE_DONE: &str = "GestureDone";
    pub const LANGUAGE_CHANGED: &str = "LanguageChanged";
    pub const EYE_COLOUR_DONE: &str = "EyeColourDone";
    pub const PLAY_AUDIO_DONE: &str = "PlayAudioDone";
    pub const SET_IDLE: &str = "SetIdle";
    pub const SET_NON_IDLE: &str = "SetNonIdle";
}

/// A recognized intent: a name plus its ordered parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    pub args: Vec<String>,
}

impl Intent {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Whether this intent answers a turn waiting on `context`.
    ///
    /// The name must match the context and at least one argument must be
    /// present; an empty recognition result never counts.
    pub fn answers(&self, context: &str) -> bool {
        self.name == context && !self.args.is_empty()
    }

    /// First argument, if any.
    pub fn first_arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    RobotEvent { name: String },
    PersonDetected,
    FaceRecognized { id: String },
    LanguageChanged { key: String },
    IntentDetected(Intent),
    NewAudioFile { path: String },
    SpeechText { text: String },
    NewPictureFile { path: String },
}

impl Event {
    /// Short variant label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::RobotEvent { .. } => "robot_event",
            Event::PersonDetected => "person_detected",
            Event::FaceRecognized { .. } => "face_recognized",
            Event::LanguageChanged { .. } => "language_changed",
            Event::IntentDetected(_) => "intent_detected",
            Event::NewAudioFile { .. } => "new_audio_file",
            Event::SpeechText { .. } => "speech_text",
            Event::NewPictureFile { .. } => "new_picture_file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_answers_requires_name_and_argument() {
        let named = Intent::new("answer_name", vec!["Alice".to_string()]);
        assert!(named.answers("answer_name"));
        assert!(!named.answers("activation"));

        let bare = Intent::new("answer_name", Vec::new());
        assert!(!bare.answers("answer_name"));

        let empty = Intent::default();
        assert!(!empty.answers(""));
    }

    #[test]
    fn test_first_arg() {
        let intent = Intent::new("schedule", vec!["2".into(), "hours".into()]);
        assert_eq!(intent.first_arg(), Some("2"));
        assert_eq!(Intent::default().first_arg(), None);
    }
}
