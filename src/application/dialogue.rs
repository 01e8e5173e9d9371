//! # Dialogue Turns
//!
//! Question/answer exchanges on top of the correlator and the intent stream.
//!
//! [`TurnState`] is the dispatch-side half: the dispatch loop feeds it every
//! decoded intent before signalling the intent cue, so once a waiter wakes the
//! verdict is already recorded. [`Dialogue`] is the foreground half that runs
//! the bounded retry loop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info};

use crate::application::correlator::Cue;
use crate::application::robot::Robot;
use crate::domain::action::Action;
use crate::domain::error::DialogueError;
use crate::domain::event::Intent;
use crate::domain::types::Outcome;

/// How an intent must look to satisfy the active turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Name equals the context and at least one argument is present.
    Answer,
    /// Name equals the context; arguments are irrelevant.
    Named,
}

#[derive(Debug)]
struct ActiveTurn {
    context: String,
    expect: Expect,
    captured: Option<Intent>,
}

impl ActiveTurn {
    fn accepts(&self, intent: &Intent) -> bool {
        match self.expect {
            Expect::Answer => intent.answers(&self.context),
            Expect::Named => intent.name == self.context,
        }
    }
}

/// Understanding state of the turn in progress, shared with the dispatch loop.
#[derive(Clone, Default)]
pub struct TurnState {
    active: Arc<Mutex<Option<ActiveTurn>>>,
}

impl TurnState {
    fn lock(&self) -> MutexGuard<'_, Option<ActiveTurn>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, context: &str, expect: Expect) {
        *self.lock() = Some(ActiveTurn {
            context: context.to_string(),
            expect,
            captured: None,
        });
    }

    fn finish(&self) -> Option<Intent> {
        self.lock().take().and_then(|turn| turn.captured)
    }

    /// Records `intent` if it satisfies the active turn. Called by the dispatch loop.
    ///
    /// The first accepted intent wins; later ones do not overwrite it.
    pub fn observe(&self, intent: &Intent) -> bool {
        let mut guard = self.lock();
        let Some(turn) = guard.as_mut() else {
            return false;
        };
        if turn.captured.is_none() && turn.accepts(intent) {
            turn.captured = Some(intent.clone());
            return true;
        }
        false
    }

    pub fn understood(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|turn| turn.captured.is_some())
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }
}

/// Ends the turn even when the foreground bails out early.
struct TurnGuard<'a>(&'a TurnState);

impl TurnGuard<'_> {
    fn conclude(self) -> Option<Intent> {
        self.0.finish()
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().take();
    }
}

/// Runs question/answer turns. One turn at a time per session.
#[derive(Clone)]
pub struct Dialogue {
    robot: Robot,
    turn: TurnState,
    repeat_prompt: String,
}

impl Dialogue {
    pub fn new(robot: Robot, turn: TurnState, repeat_prompt: impl Into<String>) -> Self {
        Self {
            robot,
            turn,
            repeat_prompt: repeat_prompt.into(),
        }
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    /// Asks `question` and listens for an intent named `context` carrying at
    /// least one argument, for at most `max_attempts` listening windows of
    /// `timeout` each. Between failed attempts the robot asks to repeat.
    ///
    /// Any intent ends the current window, matching or not; only a matching
    /// one counts as understood.
    pub async fn ask(
        &self,
        question: &str,
        context: &str,
        max_attempts: u32,
        timeout: Duration,
    ) -> Result<Vec<String>, DialogueError> {
        self.speak(question).await?;

        self.turn.begin(context, Expect::Answer);
        let guard = TurnGuard(&self.turn);

        let mut remaining = max_attempts;
        while remaining > 0 && !self.turn.understood() {
            remaining -= 1;
            let attempt = max_attempts - remaining;

            let outcome = self.listen_once(context, timeout).await?;
            debug!(
                context,
                attempt,
                ?outcome,
                understood = self.turn.understood(),
                "listening window closed"
            );
            if outcome == Outcome::Cancelled {
                return Err(self.interrupted());
            }

            if !self.turn.understood() && remaining > 0 {
                self.speak(&self.repeat_prompt).await?;
            }
        }

        match guard.conclude() {
            Some(intent) => {
                info!(context, args = ?intent.args, "answer understood");
                Ok(intent.args)
            }
            None => Err(DialogueError::TurnFailed {
                context: context.to_string(),
                attempts: max_attempts,
            }),
        }
    }

    /// Listens until an intent named `name` arrives, in windows of `poll`.
    ///
    /// Used for wake-up phrases, where the intent carries no arguments.
    pub async fn listen_for(&self, name: &str, poll: Duration) -> Result<Intent, DialogueError> {
        self.turn.begin(name, Expect::Named);
        let guard = TurnGuard(&self.turn);

        self.robot.send(&Action::set_audio_context(name)).await?;
        self.robot.send(&Action::start_listening()).await?;

        let result = loop {
            // Armed before checking, so an intent in between still wakes us.
            let handle = self.robot.correlator().arm(Cue::Intent);
            if self.turn.understood() {
                break Ok(());
            }
            if handle.wait(Some(poll)).await == Outcome::Cancelled {
                break Err(self.interrupted());
            }
        };

        // A dead bus cannot take the stop request; report why it died instead.
        let stopped = self.robot.send(&Action::stop_listening()).await;
        result?;
        stopped?;
        guard.conclude().ok_or(DialogueError::Cancelled)
    }

    async fn listen_once(
        &self,
        context: &str,
        timeout: Duration,
    ) -> Result<Outcome, DialogueError> {
        let handle = self.robot.correlator().arm(Cue::Intent);
        self.robot.send(&Action::set_audio_context(context)).await?;
        self.robot.send(&Action::start_listening()).await?;
        let outcome = handle.wait(Some(timeout)).await;
        self.robot.send(&Action::stop_listening()).await?;
        Ok(outcome)
    }

    async fn speak(&self, text: &str) -> Result<(), DialogueError> {
        match self.robot.speak(text, None, true).await? {
            Outcome::Cancelled => Err(self.interrupted()),
            Outcome::Signaled | Outcome::TimedOut => Ok(()),
        }
    }

    /// Why a wait was cancelled: a bus failure, or a requested shutdown.
    fn interrupted(&self) -> DialogueError {
        match self.robot.correlator().fault() {
            Some(err) => err.into(),
            None => DialogueError::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_without_turn_is_ignored() {
        let state = TurnState::default();
        assert!(!state.observe(&Intent::new("answer_name", vec!["Bob".into()])));
        assert!(!state.understood());
    }

    #[test]
    fn test_answer_turn_requires_matching_name_and_argument() {
        let state = TurnState::default();
        state.begin("answer_name", Expect::Answer);

        assert!(!state.observe(&Intent::new("answer_name", Vec::new())));
        assert!(!state.observe(&Intent::new("to_do", vec!["study".into()])));
        assert!(!state.understood());

        assert!(state.observe(&Intent::new("answer_name", vec!["Alice".into()])));
        assert!(!state.observe(&Intent::new("answer_name", vec!["Eve".into()])));
        assert_eq!(state.finish().unwrap().args, vec!["Alice"]);
        assert!(!state.is_active());
    }

    #[test]
    fn test_named_turn_accepts_bare_intent() {
        let state = TurnState::default();
        state.begin("activation", Expect::Named);
        assert!(state.observe(&Intent::new("activation", Vec::new())));
        assert!(state.understood());
    }

    #[test]
    fn test_guard_ends_turn_on_drop() {
        let state = TurnState::default();
        state.begin("answer_name", Expect::Answer);
        drop(TurnGuard(&state));
        assert!(!state.is_active());
    }
}
