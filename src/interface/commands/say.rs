//! # Say Command

use anyhow::Result;
use tracing::info;

use crate::application::robot::Robot;
use crate::domain::emotion::Emotion;
use crate::domain::types::Outcome;

pub async fn handle_say(
    robot: &Robot,
    text: &str,
    emotion: Option<Emotion>,
    animated: bool,
) -> Result<Outcome> {
    let outcome = robot.speak(text, emotion, animated).await?;
    info!(?outcome, "say finished");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::Session;
    use crate::domain::config::AppConfig;
    use crate::domain::topics;
    use crate::domain::traits::NoopHandler;
    use crate::infrastructure::memory::MemoryBus;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_say_waits_for_text_done() {
        let bus = Arc::new(MemoryBus::echoing());
        let session = Session::start(bus.clone(), Arc::new(NoopHandler), &AppConfig::default())
            .await
            .unwrap();

        let outcome = handle_say(
            session.robot(),
            "Nice to meet you",
            Some(Emotion::Empathetic),
            false,
        )
        .await
        .unwrap();
        assert_eq!(outcome, Outcome::Signaled);
        assert_eq!(
            bus.published_on(topics::ACTION_SAY),
            vec![Emotion::Empathetic.wrap("Nice to meet you")]
        );
        session.stop().await.unwrap();
    }
}
