//! # Listen Command
//!
//! Keeps the session open so the event logger can report what arrives.

use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::interface::event_log::EventLog;

/// Waits for `duration`, or until shutdown when `None`. Returns the number of events seen.
pub async fn handle_listen(
    log: &EventLog,
    cancel: &CancellationToken,
    duration: Option<Duration>,
) -> Result<usize> {
    info!(?duration, "listening for events");
    match duration {
        Some(duration) => {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(duration) => {}
            }
        }
        None => cancel.cancelled().await,
    }
    let seen = log.seen();
    info!(seen, "stopped listening");
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::Session;
    use crate::domain::config::AppConfig;
    use crate::domain::topics;
    use crate::infrastructure::memory::MemoryBus;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reports_events_seen_until_deadline() {
        let bus = Arc::new(MemoryBus::new());
        let log = Arc::new(EventLog::new(false));
        let session = Session::start(bus.clone(), log.clone(), &AppConfig::default())
            .await
            .unwrap();

        bus.inject(topics::PERSON_DETECTED, "");
        bus.inject(topics::TEXT_SPEECH, "hello");
        let seen = handle_listen(&log, &session.cancellation(), Some(Duration::from_millis(100)))
            .await
            .unwrap();
        assert_eq!(seen, 2);
        session.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_unbounded_listen_ends_on_shutdown() {
        let log = EventLog::new(false);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(handle_listen(&log, &cancel, None).await.unwrap(), 0);
    }
}
