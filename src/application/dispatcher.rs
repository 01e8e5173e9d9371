//! # Dispatch Loop
//!
//! The single background task that polls the bus, decodes each message and
//! routes it: first to the application's handler, then to the core (dialogue
//! turn state and correlator signals). Routing is sequential, so handlers never
//! run concurrently and whatever they write is in place before a waiter wakes.
//!
//! Lifecycle: `Stopped -> Running -> Stopping -> Stopped`. The loop leaves
//! `Running` when the cancellation token fires or the bus fails; either way
//! the token ends up cancelled, which releases every blocked waiter.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::correlator::{Correlator, Cue};
use crate::application::decoder::decode;
use crate::application::dialogue::TurnState;
use crate::domain::error::BusError;
use crate::domain::event::Event;
use crate::domain::topics;
use crate::domain::traits::{Bus, EventHandler};
use crate::domain::types::{DispatchState, Message};
use crate::strings::logs;

/// Fans a decoded event out to the application and the core.
pub struct Router {
    correlator: Correlator,
    turn: TurnState,
    handler: Arc<dyn EventHandler>,
}

impl Router {
    pub fn new(correlator: Correlator, turn: TurnState, handler: Arc<dyn EventHandler>) -> Self {
        Self {
            correlator,
            turn,
            handler,
        }
    }

    /// Decodes and routes one message. Returns the event, or `None` if skipped.
    pub fn route(&self, message: &Message) -> Option<Event> {
        let Some(event) = decode(&message.topic, &message.payload) else {
            debug!(topic = %message.topic, "skipping message on unknown topic");
            return None;
        };
        debug!(
            kind = event.kind(),
            topic = %message.topic,
            payload = %message.payload,
            "event received"
        );

        self.handler.handle(&event);

        match &event {
            Event::RobotEvent { name } => {
                if !self.correlator.signal(&Cue::robot(name.as_str())) {
                    debug!(event = %name, "no action waiting on robot event");
                }
            }
            Event::IntentDetected(intent) => {
                self.turn.observe(intent);
                self.correlator.signal(&Cue::Intent);
            }
            _ => {}
        }
        Some(event)
    }
}

pub struct Dispatcher {
    bus: Arc<dyn Bus>,
    router: Router,
    idle_wait: Duration,
    cancel: CancellationToken,
    state: Arc<watch::Sender<DispatchState>>,
}

impl Dispatcher {
    pub fn new(
        bus: Arc<dyn Bus>,
        router: Router,
        idle_wait: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(DispatchState::Stopped);
        let state = Arc::new(state);
        Self {
            bus,
            router,
            idle_wait,
            cancel,
            state,
        }
    }

    /// Subscribes to the inbound topics and spawns the loop.
    ///
    /// Subscribing happens before this returns, so actions fired right after
    /// cannot have their completions missed.
    pub async fn start(self) -> Result<DispatchHandle, BusError> {
        self.bus.subscribe(&topics::INBOUND).await?;
        self.state.send_replace(DispatchState::Running);
        info!("{}", logs::subscribed(topics::INBOUND.len()));

        let state = self.state.clone();
        let cancel = self.cancel.clone();
        let join = tokio::spawn(self.run());
        Ok(DispatchHandle {
            join,
            cancel,
            state,
        })
    }

    async fn run(self) -> Result<(), BusError> {
        let Dispatcher {
            bus,
            router,
            idle_wait,
            cancel,
            state,
        } = self;
        let exit = ExitGuard {
            state,
            cancel: cancel.clone(),
        };

        let result = loop {
            if cancel.is_cancelled() {
                break Ok(());
            }
            match bus.poll().await {
                Ok(Some(message)) => {
                    router.route(&message);
                }
                Ok(None) => {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = tokio::time::sleep(idle_wait) => {}
                    }
                }
                Err(err) => break Err(err),
            }
        };

        exit.state.send_replace(DispatchState::Stopping);
        match &result {
            // Recorded before waiters wake, so they report the failure instead of a shutdown.
            Err(err) => router.correlator.fail(err.clone()),
            Ok(()) => cancel.cancel(),
        }
        if let Err(err) = bus.close().await {
            warn!(error = %err, "failed to release bus subscription");
        }
        drop(exit);

        match &result {
            Ok(()) => info!("{}", logs::DISPATCH_STOPPED),
            Err(err) => error!("{}", logs::dispatch_failed(&err.to_string())),
        }
        result
    }
}

/// Marks the loop stopped and trips cancellation, even if a handler panicked.
struct ExitGuard {
    state: Arc<watch::Sender<DispatchState>>,
    cancel: CancellationToken,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.state.send_replace(DispatchState::Stopped);
    }
}

/// Owner-side control of a running dispatch loop.
pub struct DispatchHandle {
    join: JoinHandle<Result<(), BusError>>,
    cancel: CancellationToken,
    state: Arc<watch::Sender<DispatchState>>,
}

impl DispatchHandle {
    pub fn state(&self) -> DispatchState {
        *self.state.borrow()
    }

    /// Observes lifecycle changes.
    pub fn subscribe(&self) -> watch::Receiver<DispatchState> {
        self.state.subscribe()
    }

    /// Requests shutdown. The in-flight handler, if any, finishes first.
    pub fn stop(&self) {
        self.state.send_if_modified(|state| {
            if *state == DispatchState::Running {
                *state = DispatchState::Stopping;
                true
            } else {
                false
            }
        });
        self.cancel.cancel();
    }

    /// Waits for the loop to exit and returns its final result.
    pub async fn join(self) -> Result<(), BusError> {
        match self.join.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::Intent;
    use crate::infrastructure::memory::MemoryBus;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Event>>,
    }

    impl EventHandler for Recorder {
        fn handle(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.clone());
        }
    }

    struct Fixture {
        bus: Arc<MemoryBus>,
        correlator: Correlator,
        recorder: Arc<Recorder>,
        cancel: CancellationToken,
    }

    fn fixture() -> (Fixture, Dispatcher) {
        let bus = Arc::new(MemoryBus::new());
        let cancel = CancellationToken::new();
        let correlator = Correlator::new(bus.clone(), cancel.clone());
        let recorder = Arc::new(Recorder::default());
        let router = Router::new(correlator.clone(), TurnState::default(), recorder.clone());
        let dispatcher =
            Dispatcher::new(bus.clone(), router, Duration::from_millis(1), cancel.clone());
        (
            Fixture {
                bus,
                correlator,
                recorder,
                cancel,
            },
            dispatcher,
        )
    }

    async fn settle(bus: &MemoryBus) {
        for _ in 0..200 {
            if bus.pending() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    #[test]
    fn test_router_handles_before_signalling() {
        let (fx, dispatcher) = fixture();
        let handle = fx.correlator.arm(Cue::robot("TextDone"));
        let routed = dispatcher
            .router
            .route(&Message::new(topics::ROBOT_EVENT, "TextDone"));
        assert_eq!(routed, Some(Event::RobotEvent { name: "TextDone".into() }));
        assert_eq!(fx.recorder.seen.lock().unwrap().len(), 1);
        assert!(handle.is_signaled());
    }

    #[test]
    fn test_router_skips_unknown_topic() {
        let (fx, dispatcher) = fixture();
        assert_eq!(dispatcher.router.route(&Message::new("action-say", "hi")), None);
        assert!(fx.recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_events_are_delivered_in_order() {
        let (fx, dispatcher) = fixture();
        let handle = dispatcher.start().await.unwrap();
        assert_eq!(handle.state(), DispatchState::Running);

        fx.bus.inject(topics::PERSON_DETECTED, "");
        fx.bus.inject(topics::FACE_RECOGNIZED, "7");
        fx.bus.inject("unknown-topic", "x");
        fx.bus.inject(topics::AUDIO_INTENT, "answer_name|Alice");
        settle(&fx.bus).await;

        handle.stop();
        handle.join().await.unwrap();

        let seen = fx.recorder.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                Event::PersonDetected,
                Event::FaceRecognized { id: "7".into() },
                Event::IntentDetected(Intent::new("answer_name", vec!["Alice".into()])),
            ]
        );
    }

    #[tokio::test]
    async fn test_completion_reaches_waiting_caller() {
        let (fx, dispatcher) = fixture();
        let dispatch = dispatcher.start().await.unwrap();

        let handle = fx.correlator.arm(Cue::robot("TextDone"));
        fx.bus.inject(topics::ROBOT_EVENT, "TextDone");
        assert_eq!(
            handle.wait(Some(Duration::from_secs(2))).await,
            crate::domain::types::Outcome::Signaled
        );

        dispatch.stop();
        dispatch.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_releases_blocked_waiters() {
        let (fx, dispatcher) = fixture();
        let dispatch = dispatcher.start().await.unwrap();
        let waiter = tokio::spawn(fx.correlator.arm(Cue::robot("GestureDone")).wait(None));
        tokio::time::sleep(Duration::from_millis(5)).await;

        dispatch.stop();
        let outcome = tokio::time::timeout(Duration::from_millis(200), waiter)
            .await
            .expect("waiter should observe shutdown")
            .unwrap();
        assert_eq!(outcome, crate::domain::types::Outcome::Cancelled);

        let state = dispatch.subscribe();
        dispatch.join().await.unwrap();
        assert_eq!(*state.borrow(), DispatchState::Stopped);
    }

    #[tokio::test]
    async fn test_stop_reports_stopping_before_exit() {
        let (_fx, dispatcher) = fixture();
        let dispatch = dispatcher.start().await.unwrap();
        assert_eq!(dispatch.state(), DispatchState::Running);

        // The loop task cannot run before the next await on this runtime.
        dispatch.stop();
        assert_eq!(dispatch.state(), DispatchState::Stopping);

        let state = dispatch.subscribe();
        dispatch.join().await.unwrap();
        assert_eq!(*state.borrow(), DispatchState::Stopped);
    }

    #[tokio::test]
    async fn test_bus_failure_stops_loop_and_cancels() {
        let (fx, dispatcher) = fixture();
        let dispatch = dispatcher.start().await.unwrap();
        fx.bus.sever();

        let result = tokio::time::timeout(Duration::from_millis(500), dispatch.join())
            .await
            .expect("loop should stop on its own");
        assert!(matches!(result, Err(BusError::Closed)));
        assert!(fx.cancel.is_cancelled());
        assert_eq!(fx.correlator.fault(), Some(BusError::Closed));
    }

    #[tokio::test]
    async fn test_requested_stop_records_no_fault() {
        let (fx, dispatcher) = fixture();
        let dispatch = dispatcher.start().await.unwrap();
        dispatch.stop();
        dispatch.join().await.unwrap();
        assert_eq!(fx.correlator.fault(), None);
    }

    #[tokio::test]
    async fn test_subscribe_failure_is_reported() {
        let (fx, dispatcher) = fixture();
        fx.bus.sever();
        assert!(matches!(dispatcher.start().await, Err(BusError::Closed)));
    }
}
