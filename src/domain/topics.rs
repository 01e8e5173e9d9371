//! # Bus Topics
//!
//! Single source of truth for the topic names exchanged with the robot and
//! recognition backends. Inbound topics are decoded into events, outbound
//! topics carry actions.

// Inbound (events)
pub const ROBOT_EVENT: &str = "robot-event";
pub const PERSON_DETECTED: &str = "person-detected";
pub const FACE_RECOGNIZED: &str = "face-recognized";
pub const AUDIO_LANGUAGE: &str = "audio-language";
pub const AUDIO_INTENT: &str = "audio-intent";
pub const AUDIO_NEWFILE: &str = "audio-newfile";
pub const TEXT_SPEECH: &str = "text-speech";
pub const PICTURE_NEWFILE: &str = "picture-newfile";

/// Every topic the dispatch loop subscribes to, in decoding-table order.
pub const INBOUND: [&str; 8] = [
    ROBOT_EVENT,
    PERSON_DETECTED,
    FACE_RECOGNIZED,
    AUDIO_LANGUAGE,
    AUDIO_INTENT,
    AUDIO_NEWFILE,
    TEXT_SPEECH,
    PICTURE_NEWFILE,
];

// Outbound (setup)
pub const DIALOGFLOW_KEY: &str = "dialogflow-key";
pub const DIALOGFLOW_AGENT: &str = "dialogflow-agent";
pub const DIALOGFLOW_RECORD: &str = "dialogflow-record";
pub const AUDIO_CONTEXT: &str = "audio-context";
pub const AUDIO_HINTS: &str = "audio-hints";

// Outbound (actions)
pub const ACTION_AUDIO: &str = "action-audio";
pub const ACTION_IDLE: &str = "action-idle";
pub const ACTION_VIDEO: &str = "action-video";
pub const ACTION_SAY: &str = "action-say";
pub const ACTION_SAY_ANIMATED: &str = "action-say-animated";
pub const ACTION_GESTURE: &str = "action-gesture";
pub const ACTION_PLAY_AUDIO: &str = "action-play-audio";
pub const ACTION_EYECOLOUR: &str = "action-eyecolour";
pub const ACTION_TAKE_PICTURE: &str = "action-take-picture";
pub const ACTION_TURN: &str = "action-turn";

/// Separator used by multi-field payloads (intents, audio hints).
pub const FIELD_SEPARATOR: char = '|';

pub fn is_inbound(topic: &str) -> bool {
    INBOUND.contains(&topic)
}
