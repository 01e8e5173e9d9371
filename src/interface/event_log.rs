//! # Event Logger
//!
//! Application handler that writes every decoded event to the log.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::domain::event::Intent;
use crate::domain::traits::EventHandler;

pub struct EventLog {
    verbose: bool,
    seen: AtomicUsize,
}

impl EventLog {
    /// `verbose` logs at info level, otherwise at debug.
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            seen: AtomicUsize::new(0),
        }
    }

    /// Number of events handled so far.
    pub fn seen(&self) -> usize {
        self.seen.load(Ordering::Relaxed)
    }

    fn record(&self, kind: &str, detail: &str) {
        self.seen.fetch_add(1, Ordering::Relaxed);
        if self.verbose {
            info!(kind, detail, "event");
        } else {
            debug!(kind, detail, "event");
        }
    }
}

impl EventHandler for EventLog {
    fn on_robot_event(&self, name: &str) {
        self.record("robot_event", name);
    }

    fn on_person_detected(&self) {
        self.record("person_detected", "");
    }

    fn on_face_recognized(&self, id: &str) {
        self.record("face_recognized", id);
    }

    fn on_language_changed(&self, key: &str) {
        self.record("language_changed", key);
    }

    fn on_intent(&self, intent: &Intent) {
        let detail = format!("{} {:?}", intent.name, intent.args);
        self.record("intent", &detail);
    }

    fn on_new_audio_file(&self, path: &str) {
        self.record("new_audio_file", path);
    }

    fn on_speech_text(&self, text: &str) {
        self.record("speech_text", text);
    }

    fn on_new_picture_file(&self, path: &str) {
        self.record("new_picture_file", path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::decoder::decode;
    use crate::domain::topics;

    #[test]
    fn test_counts_every_event_kind() {
        let log = EventLog::new(true);
        let messages = [
            (topics::ROBOT_EVENT, "LeftBumperPressed"),
            (topics::PERSON_DETECTED, ""),
            (topics::FACE_RECOGNIZED, "3"),
            (topics::AUDIO_INTENT, "to_do|study"),
            (topics::TEXT_SPEECH, "hello robot"),
        ];
        for (topic, payload) in messages {
            let event = decode(topic, payload).unwrap();
            log.handle(&event);
        }
        assert_eq!(log.seen(), 5);
    }
}
