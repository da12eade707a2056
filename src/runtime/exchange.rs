use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error};

use crate::agents::{AgentCategory, AgentResponse};
use crate::app::PacingConfig;
use crate::models::AgentBackend;
use crate::session::PendingExchange;
use crate::utils::MedicoreError;

/// Progress of one exchange, as seen by the UI loop
#[derive(Debug)]
pub enum ExchangeEvent {
    /// The model picked a specialist; its answer follows after the handoff pause
    Routed(AgentCategory),
    Completed(AgentResponse),
    Failed(MedicoreError),
}

/// Run one exchange: routing pause, dispatch, handoff pause.
///
/// The pauses are cosmetic and come from `pacing`; the backend call itself
/// is made exactly once. The request slot is released before the final
/// event is sent, so the session is free to accept the next submission as
/// soon as it has folded that event in.
pub async fn run_exchange(
    backend: Arc<dyn AgentBackend>,
    pending: PendingExchange,
    pacing: PacingConfig,
    events: mpsc::Sender<ExchangeEvent>,
) {
    let PendingExchange { submission, permit } = pending;

    pause(pacing.routing_delay()).await;

    let result = backend
        .dispatch(&submission.text, submission.image.as_ref())
        .await;

    let last = match result {
        Ok(response) => {
            // The receiver may be gone if the UI quit mid-exchange
            let _ = events.send(ExchangeEvent::Routed(response.category)).await;
            pause(pacing.handoff_delay()).await;
            ExchangeEvent::Completed(response)
        }
        Err(error) => ExchangeEvent::Failed(error),
    };

    drop(permit);
    if events.send(last).await.is_err() {
        debug!("Exchange finished after the UI went away");
    }
}

/// Run an exchange on its own task and watch it.
///
/// If the task dies before reporting back (a panicking backend), a
/// `Failed` event is sent in its place so the session never stays busy.
/// The request slot is freed by the unwind.
pub fn spawn_exchange(
    backend: Arc<dyn AgentBackend>,
    pending: PendingExchange,
    pacing: PacingConfig,
    events: mpsc::Sender<ExchangeEvent>,
) -> JoinHandle<()> {
    let task = tokio::spawn(run_exchange(backend, pending, pacing, events.clone()));
    tokio::spawn(async move {
        if let Err(err) = task.await {
            error!("Exchange task stopped: {}", err);
            let reason = if err.is_panic() { "agent task panicked" } else { "agent task cancelled" };
            let _ = events
                .send(ExchangeEvent::Failed(MedicoreError::Aborted(reason.to_string())))
                .await;
        }
    })
}

async fn pause(duration: std::time::Duration) {
    if !duration.is_zero() {
        sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::{reply, ScriptedBackend};
    use crate::session::Session;
    use std::time::Duration;

    async fn drain(rx: &mut mpsc::Receiver<ExchangeEvent>) -> Vec<ExchangeEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_success_emits_routed_then_completed() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(reply(
            AgentCategory::Education,
            "Rest well.",
        ))]));
        let mut session = Session::new();
        session.input = "wound care".to_string();
        let pending = session.begin_submit().unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        run_exchange(backend.clone(), pending, PacingConfig::disabled(), tx).await;

        let events = drain(&mut rx).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ExchangeEvent::Routed(AgentCategory::Education)));
        assert!(matches!(events[1], ExchangeEvent::Completed(ref r) if r.content == "Rest well."));
        assert_eq!(backend.calls(), 1);
        assert_eq!(backend.sent()[0].0, "wound care");
    }

    #[tokio::test]
    async fn test_failure_emits_only_failed() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(MedicoreError::Network(
            "connection refused".to_string(),
        ))]));
        let mut session = Session::new();
        session.input = "hello".to_string();
        let pending = session.begin_submit().unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        run_exchange(backend, pending, PacingConfig::disabled(), tx).await;

        let events = drain(&mut rx).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ExchangeEvent::Failed(MedicoreError::Network(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_happens_outside_the_backend() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(reply(AgentCategory::Admin, "ok"))]));
        let mut session = Session::new();
        session.input = "aging".to_string();
        let pending = session.begin_submit().unwrap();

        let pacing = PacingConfig {
            routing_delay_ms: 1500,
            handoff_delay_ms: 800,
        };
        let (tx, mut rx) = mpsc::channel(8);
        let started = tokio::time::Instant::now();
        let task = tokio::spawn(run_exchange(backend.clone(), pending, pacing, tx));

        // Nothing is dispatched during the routing pause
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(backend.calls(), 0);

        assert!(matches!(rx.recv().await, Some(ExchangeEvent::Routed(AgentCategory::Admin))));
        assert_eq!(backend.calls(), 1);
        assert!(matches!(rx.recv().await, Some(ExchangeEvent::Completed(_))));
        assert!(started.elapsed() >= Duration::from_millis(2300));
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_slot_is_released_when_exchange_ends() {
        let backend = Arc::new(
            ScriptedBackend::new(vec![
                Ok(reply(AgentCategory::Rme, "one")),
                Ok(reply(AgentCategory::Clinical, "two")),
            ])
            .with_latency(Duration::from_millis(20)),
        );
        let mut session = Session::new();

        for text in ["first", "second"] {
            session.input = text.to_string();
            let pending = session.begin_submit().expect("slot should be free");
            let (tx, mut rx) = mpsc::channel(8);
            tokio::spawn(run_exchange(
                backend.clone(),
                pending,
                PacingConfig::disabled(),
                tx,
            ));

            // A second send while this one is in flight goes nowhere
            session.input = "impatient".to_string();
            assert!(session.begin_submit().is_none());
            session.input.clear();

            while let Some(event) = rx.recv().await {
                session.apply(event);
            }
        }

        assert_eq!(backend.calls(), 2);
        assert_eq!(session.transcript().len(), 4);
        assert_eq!(session.highlighted(), AgentCategory::Clinical);
    }

    struct PanickingBackend;

    #[async_trait::async_trait]
    impl AgentBackend for PanickingBackend {
        async fn dispatch(
            &self,
            _text: &str,
            _image: Option<&crate::input::ImagePayload>,
        ) -> Result<AgentResponse, MedicoreError> {
            panic!("backend bug");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[tokio::test]
    async fn test_panicking_exchange_reports_failure_and_frees_slot() {
        let mut session = Session::new();
        session.input = "vitals".to_string();
        let pending = session.begin_submit().unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        spawn_exchange(Arc::new(PanickingBackend), pending, PacingConfig::disabled(), tx)
            .await
            .unwrap();

        let events = drain(&mut rx).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ExchangeEvent::Failed(MedicoreError::Aborted(_))));

        for event in events {
            session.apply(event);
        }
        assert!(!session.is_processing());
        assert!(session.transcript().last().unwrap().is_error());

        session.input = "again".to_string();
        assert!(session.begin_submit().is_some());
    }
}
