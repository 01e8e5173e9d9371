//! # Session
//!
//! Wires a bus, the dispatch loop, the correlator and the dialogue controller
//! together for one application run.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::application::correlator::Correlator;
use crate::application::dialogue::{Dialogue, TurnState};
use crate::application::dispatcher::{DispatchHandle, Dispatcher, Router};
use crate::application::robot::Robot;
use crate::domain::action::Action;
use crate::domain::config::AppConfig;
use crate::domain::error::{ActionError, BusError};
use crate::domain::traits::{Bus, EventHandler};
use crate::domain::types::{DispatchState, Outcome};
use crate::strings::logs;

/// Recognition and language setup published at the start of a session.
#[derive(Debug, Clone, Default)]
pub struct Setup {
    /// Contents of the Dialogflow key file.
    pub dialogflow_key: Option<String>,
    pub dialogflow_agent: Option<String>,
    pub language: String,
    pub language_timeout: Duration,
}

impl Setup {
    /// Setup from configuration; the key file contents are passed in by the caller.
    pub fn from_config(config: &AppConfig, dialogflow_key: Option<String>) -> Self {
        Self {
            dialogflow_key,
            dialogflow_agent: config.dialogflow.agent.clone(),
            language: config.language.clone(),
            language_timeout: config.language_timeout(),
        }
    }
}

pub struct Session {
    robot: Robot,
    dialogue: Dialogue,
    dispatch: DispatchHandle,
    cancel: CancellationToken,
}

impl Session {
    /// Subscribes, spawns the dispatch loop and returns the foreground handles.
    pub async fn start(
        bus: Arc<dyn Bus>,
        handler: Arc<dyn EventHandler>,
        config: &AppConfig,
    ) -> Result<Self, BusError> {
        let cancel = CancellationToken::new();
        let correlator = Correlator::new(bus.clone(), cancel.clone());
        let turn = TurnState::default();

        let router = Router::new(correlator.clone(), turn.clone(), handler);
        let dispatch = Dispatcher::new(bus.clone(), router, config.bus.idle_wait(), cancel.clone())
            .start()
            .await?;

        let robot = Robot::new(bus, correlator);
        let dialogue = Dialogue::new(robot.clone(), turn, config.dialogue.repeat_prompt.clone());
        Ok(Self {
            robot,
            dialogue,
            dispatch,
            cancel,
        })
    }

    /// Publishes the recognition setup and switches language, waiting for
    /// `LanguageChanged` up to the configured timeout.
    pub async fn setup(&self, setup: &Setup) -> Result<Outcome, ActionError> {
        if let Some(key) = &setup.dialogflow_key {
            self.robot.send(&Action::set_dialogflow_key(key.as_str())).await?;
        }
        if let Some(agent) = &setup.dialogflow_agent {
            self.robot.send(&Action::set_dialogflow_agent(agent.as_str())).await?;
        }
        let outcome = self
            .robot
            .perform(&Action::set_language(setup.language.as_str()), Some(setup.language_timeout))
            .await?;
        if outcome == Outcome::TimedOut {
            warn!("{}", logs::language_timeout(&setup.language));
        }
        Ok(outcome)
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn dialogue(&self) -> &Dialogue {
        &self.dialogue
    }

    /// Token that ends the session when cancelled (e.g. on Ctrl-C).
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> DispatchState {
        self.dispatch.state()
    }

    /// Stops the dispatch loop and returns how it ended.
    pub async fn stop(self) -> Result<(), BusError> {
        self.dispatch.stop();
        self.dispatch.join().await
    }
}
