//! # In-Memory Bus
//!
//! Implements the `Bus` trait inside the process. Used by the test-suite and by
//! `--simulate`, where it can also play the robot backend: acknowledging actions
//! with their completion events and answering listening requests from a script.

use crate::domain::action::completion_for;
use crate::domain::error::BusError;
use crate::domain::topics;
use crate::domain::traits::Bus;
use crate::domain::types::Message;
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Inner {
    subscribed: Option<HashSet<String>>,
    inbox: VecDeque<Message>,
    published: Vec<Message>,
    echo_completions: bool,
    answers: VecDeque<String>,
    severed: bool,
}

impl Inner {
    /// Delivers to the subscriber if it listens on `topic`, as pub/sub would.
    fn deliver(&mut self, topic: &str, payload: &str) {
        if let Some(topics) = &self.subscribed
            && topics.contains(topic)
        {
            self.inbox.push_back(Message::new(topic, payload));
        }
    }

    fn simulate_backend(&mut self, topic: &str, payload: &str) {
        if self.echo_completions
            && let Some(done) = completion_for(topic, payload)
        {
            self.deliver(topics::ROBOT_EVENT, done);
        }
        if topic == topics::ACTION_AUDIO
            && payload == "start listening"
            && let Some(answer) = self.answers.pop_front()
        {
            self.deliver(topics::AUDIO_INTENT, &answer);
        }
    }
}

#[derive(Default)]
pub struct MemoryBus {
    inner: Mutex<Inner>,
}

impl MemoryBus {
    /// A plain loopback bus: publishes reach the subscriber only on subscribed topics.
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus whose simulated backend acknowledges every action that has a completion event.
    pub fn echoing() -> Self {
        let bus = Self::default();
        bus.lock().echo_completions = true;
        bus
    }

    /// Queues intent payloads (`name|arg...`) answered one per `start listening`.
    pub fn with_answers<I, S>(self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().answers.extend(answers.into_iter().map(Into::into));
        self
    }

    /// Simulates a message from another publisher (the robot or recognizer).
    pub fn inject(&self, topic: &str, payload: &str) {
        self.lock().deliver(topic, payload);
    }

    /// Every message published through this bus, in order.
    pub fn published(&self) -> Vec<Message> {
        self.lock().published.clone()
    }

    /// Payloads published on one topic, in order.
    pub fn published_on(&self, topic: &str) -> Vec<String> {
        self.lock()
            .published
            .iter()
            .filter(|m| m.topic == topic)
            .map(|m| m.payload.clone())
            .collect()
    }

    pub fn pending(&self) -> usize {
        self.lock().inbox.len()
    }

    /// Breaks the connection: every later call fails with `BusError::Closed`.
    pub fn sever(&self) {
        self.lock().severed = true;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Bus for MemoryBus {
    async fn subscribe(&self, topics: &[&str]) -> Result<(), BusError> {
        let mut inner = self.lock();
        if inner.severed {
            return Err(BusError::Closed);
        }
        if inner.subscribed.is_some() {
            return Err(BusError::AlreadySubscribed);
        }
        inner.subscribed = Some(topics.iter().map(|t| t.to_string()).collect());
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: &str) -> Result<(), BusError> {
        let mut inner = self.lock();
        if inner.severed {
            return Err(BusError::Closed);
        }
        inner.published.push(Message::new(topic, payload));
        inner.deliver(topic, payload);
        inner.simulate_backend(topic, payload);
        Ok(())
    }

    async fn poll(&self) -> Result<Option<Message>, BusError> {
        let mut inner = self.lock();
        if inner.severed {
            return Err(BusError::Closed);
        }
        if inner.subscribed.is_none() {
            return Err(BusError::NotSubscribed);
        }
        Ok(inner.inbox.pop_front())
    }

    async fn close(&self) -> Result<(), BusError> {
        let mut inner = self.lock();
        inner.subscribed = None;
        inner.inbox.clear();
        Ok(())
    }
}
