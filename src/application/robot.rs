//! # Robot
//!
//! Foreground handle for issuing actions: fire-and-forget with [`Robot::send`],
//! or fire-and-wait on the completion event with [`Robot::perform`].

use std::sync::Arc;
use std::time::Duration;

use crate::application::correlator::Correlator;
use crate::domain::action::Action;
use crate::domain::emotion::Emotion;
use crate::domain::error::{ActionError, BusError};
use crate::domain::traits::Bus;
use crate::domain::types::Outcome;

#[derive(Clone)]
pub struct Robot {
    bus: Arc<dyn Bus>,
    correlator: Correlator,
}

impl Robot {
    pub fn new(bus: Arc<dyn Bus>, correlator: Correlator) -> Self {
        Self { bus, correlator }
    }

    pub fn correlator(&self) -> &Correlator {
        &self.correlator
    }

    /// Publishes an action without waiting for anything.
    pub async fn send(&self, action: &Action) -> Result<(), BusError> {
        tracing::debug!(topic = %action.topic, payload = %action.payload, "sending action");
        self.bus.publish(&action.topic, &action.payload).await
    }

    /// Publishes an action and waits for its completion event.
    ///
    /// Pass a timeout whenever the backend may never answer. If the wait was
    /// cut short by a bus failure, that failure is returned instead of
    /// `Outcome::Cancelled`.
    pub async fn perform(
        &self,
        action: &Action,
        timeout: Option<Duration>,
    ) -> Result<Outcome, ActionError> {
        tracing::debug!(topic = %action.topic, payload = %action.payload, "performing action");
        let handle = self.correlator.fire(action).await?;
        let outcome = handle.wait(timeout).await;
        if outcome == Outcome::Cancelled
            && let Some(err) = self.correlator.fault()
        {
            return Err(err.into());
        }
        if outcome != Outcome::Signaled {
            tracing::warn!(topic = %action.topic, ?outcome, "action did not complete");
        }
        Ok(outcome)
    }

    /// Speaks `text` and waits until the robot finished saying it.
    pub async fn say(&self, text: &str) -> Result<Outcome, ActionError> {
        self.speak(text, None, false).await
    }

    /// Speaks with optional emotion tags, animated or not, and waits for `TextDone`.
    pub async fn speak(
        &self,
        text: &str,
        emotion: Option<Emotion>,
        animated: bool,
    ) -> Result<Outcome, ActionError> {
        let text = match emotion {
            Some(emotion) => emotion.wrap(text),
            None => text.to_string(),
        };
        let action = if animated {
            Action::say_animated(text)
        } else {
            Action::say(text)
        };
        self.perform(&action, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::correlator::Cue;
    use crate::domain::topics;
    use crate::infrastructure::memory::MemoryBus;
    use tokio_util::sync::CancellationToken;

    fn robot() -> (Arc<MemoryBus>, Robot) {
        let bus = Arc::new(MemoryBus::new());
        let correlator = Correlator::new(bus.clone(), CancellationToken::new());
        (bus.clone(), Robot::new(bus, correlator))
    }

    #[tokio::test]
    async fn test_send_publishes_on_action_topic() {
        let (bus, robot) = robot();
        robot.send(&Action::turn_left()).await.unwrap();
        robot.send(&Action::take_picture()).await.unwrap();
        assert_eq!(bus.published_on(topics::ACTION_TURN), vec!["left"]);
        assert_eq!(bus.published_on(topics::ACTION_TAKE_PICTURE), vec![""]);
    }

    #[tokio::test]
    async fn test_perform_waits_for_completion() {
        let (bus, robot) = robot();
        let signaller = robot.correlator().clone();
        let task = tokio::spawn({
            let robot = robot.clone();
            async move {
                robot
                    .perform(&Action::set_eye_colour("blue"), Some(Duration::from_secs(5)))
                    .await
            }
        });
        while bus.published_on(topics::ACTION_EYECOLOUR).is_empty() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        signaller.signal(&Cue::robot("EyeColourDone"));
        assert_eq!(task.await.unwrap().unwrap(), Outcome::Signaled);
    }

    #[tokio::test]
    async fn test_perform_times_out() {
        let (_bus, robot) = robot();
        let outcome = robot
            .perform(&Action::do_gesture("wave"), Some(Duration::from_millis(10)))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::TimedOut);
        assert_eq!(robot.correlator().armed(), 0);
    }

    #[tokio::test]
    async fn test_perform_reports_bus_failure() {
        let (_bus, robot) = robot();
        let task = tokio::spawn({
            let robot = robot.clone();
            async move { robot.perform(&Action::do_gesture("wave"), None).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        robot.correlator().fail(BusError::Closed);

        let result = task.await.unwrap();
        assert!(matches!(result, Err(ActionError::Bus(BusError::Closed))));
    }

    #[tokio::test]
    async fn test_speak_with_emotion() {
        let (bus, robot) = robot();
        robot.correlator().cancellation().cancel();
        let outcome = robot.speak("Great", Some(Emotion::Happy), true).await.unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(
            bus.published_on(topics::ACTION_SAY_ANIMATED),
            vec![Emotion::Happy.wrap("Great")]
        );
    }
}
