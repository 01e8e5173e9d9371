//! # Domain Traits
//!
//! Abstract interfaces for the message bus and for application event handlers.
//! Allows for pluggable implementations in the Infrastructure layer.

use crate::domain::error::BusError;
use crate::domain::event::{Event, Intent};
use crate::domain::types::Message;
use async_trait::async_trait;

/// Abstract interface for a publish-subscribe bus (e.g., Redis, in-memory)
#[async_trait]
pub trait Bus: Send + Sync {
    /// Subscribe to the given topics. Must be called exactly once, before `poll`.
    async fn subscribe(&self, topics: &[&str]) -> Result<(), BusError>;

    /// Publish a payload. Fire-and-forget: there is no delivery confirmation.
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), BusError>;

    /// Return the next received message, or `None` if nothing is waiting.
    /// Never blocks for a message.
    async fn poll(&self) -> Result<Option<Message>, BusError>;

    /// Release the subscription.
    async fn close(&self) -> Result<(), BusError> {
        Ok(())
    }
}

/// Application-side event callbacks.
///
/// Every method runs on the dispatch loop, one event at a time, and must
/// return promptly: handlers never await actions or correlators. The default
/// implementations ignore the event.
pub trait EventHandler: Send + Sync {
    /// Action completions (`TextDone`, `GestureDone`, ...) and touch sensors
    /// (`RightBumperPressed`, `FrontTactilTouched`, ...).
    fn on_robot_event(&self, _name: &str) {}

    /// Sent repeatedly while a person stands in front of the camera.
    fn on_person_detected(&self) {}

    fn on_face_recognized(&self, _id: &str) {}

    fn on_language_changed(&self, _key: &str) {}

    /// Intents may keep arriving shortly after listening stopped.
    fn on_intent(&self, _intent: &Intent) {}

    fn on_new_audio_file(&self, _path: &str) {}

    /// Raw transcript; also sent when no intent matched.
    fn on_speech_text(&self, _text: &str) {}

    fn on_new_picture_file(&self, _path: &str) {}

    /// Single entry point used by the dispatch loop.
    fn handle(&self, event: &Event) {
        match event {
            Event::RobotEvent { name } => self.on_robot_event(name),
            Event::PersonDetected => self.on_person_detected(),
            Event::FaceRecognized { id } => self.on_face_recognized(id),
            Event::LanguageChanged { key } => self.on_language_changed(key),
            Event::IntentDetected(intent) => self.on_intent(intent),
            Event::NewAudioFile { path } => self.on_new_audio_file(path),
            Event::SpeechText { text } => self.on_speech_text(text),
            Event::NewPictureFile { path } => self.on_new_picture_file(path),
        }
    }
}

/// Handler that ignores everything; useful when only the core routing matters.
pub struct NoopHandler;

impl EventHandler for NoopHandler {}
