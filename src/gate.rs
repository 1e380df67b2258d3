//! Gate request coordination.
//!
//! A slash command triggers the gate, the gate controller polls
//! `shouldOpen`, and the controller later confirms that the gate opened.
//! The coordinator tracks the single outstanding request and reports the
//! outcome to the channel that asked for it:
//!
//! ```text
//!   Idle ──trigger──▶ AwaitingConfirmation ──confirm──▶ Idle   (success reply)
//!                       │   ▲                 timeout──▶ Idle   (failure reply)
//!                       └───┘ trigger (callback replaced, new deadline)
//! ```
//!
//! Every trigger spawns a deadline task that is never cancelled. When it
//! fires it takes the lock and resolves the request only if the request is
//! still pending and still belongs to the trigger that scheduled it.
//! Resolution is check-and-clear under the lock, so a confirmation racing
//! a timeout produces exactly one reply.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::models::reply::{ConfirmAck, SlackReply};
use crate::notification::Notifier;

/// Default confirmation window.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct GateRequestState {
    pending: bool,
    callback: Option<String>,
    /// Bumped on every accepted trigger; scopes a deadline to its trigger.
    generation: u64,
}

/// What a resolution attempt found.
#[derive(Debug, PartialEq, Eq)]
enum Resolution {
    NotPending,
    Pending { callback: Option<String> },
}

impl GateRequestState {
    /// Clears the outstanding request. `pending == false` always leaves the
    /// callback cleared as well.
    fn resolve(&mut self) -> Resolution {
        let was_pending = std::mem::replace(&mut self.pending, false);
        let callback = self.callback.take();
        if was_pending {
            Resolution::Pending { callback }
        } else {
            Resolution::NotPending
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Opened,
    TimedOut,
}

impl Outcome {
    fn reply(self) -> SlackReply {
        match self {
            Outcome::Opened => SlackReply::success(),
            Outcome::TimedOut => SlackReply::failure(),
        }
    }
}

/// Owns the gate request state. Shared across handlers behind an `Arc`.
pub struct GateCoordinator {
    state: Mutex<GateRequestState>,
    notifier: Arc<dyn Notifier>,
    confirm_timeout: Duration,
}

impl GateCoordinator {
    pub fn new(notifier: Arc<dyn Notifier>, confirm_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(GateRequestState::default()),
            notifier,
            confirm_timeout,
        })
    }

    pub fn confirm_timeout(&self) -> Duration {
        self.confirm_timeout
    }

    /// Marks the gate as requested and starts the confirmation deadline.
    ///
    /// A trigger while another is pending replaces the callback address;
    /// only the newest trigger's deadline can resolve the request.
    /// Returns the acknowledgement to send back to the slash command.
    pub async fn trigger_open(self: &Arc<Self>, callback: Option<String>) -> SlackReply {
        let has_callback = callback.is_some();
        let generation = {
            let mut state = self.state.lock().await;
            let superseded = state.pending;
            state.pending = true;
            state.callback = callback;
            state.generation = state.generation.wrapping_add(1);
            if superseded {
                debug!(generation = state.generation, "trigger replaced a pending request");
            }
            state.generation
        };

        info!(
            generation,
            has_callback,
            timeout_ms = self.confirm_timeout.as_millis() as u64,
            "gate open requested"
        );

        let coordinator = Arc::clone(self);
        let deadline = self.confirm_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            coordinator.check_timeout(generation).await;
        });

        SlackReply::ack()
    }

    /// Records that the gate opened. Always succeeds; the success reply is
    /// sent in the background when a request was pending.
    pub async fn confirm_opened(&self) -> ConfirmAck {
        let resolution = self.state.lock().await.resolve();

        match resolution {
            Resolution::Pending { callback } => {
                info!("gate confirmed open");
                self.deliver(Outcome::Opened, callback);
            }
            Resolution::NotPending => {
                debug!("gate confirmation with no pending request, nothing to report");
            }
        }

        ConfirmAck::ok()
    }

    /// Whether the gate controller should open the gate right now.
    pub async fn query_status(&self) -> bool {
        self.state.lock().await.pending
    }

    /// Deadline handler for the trigger numbered `generation`.
    async fn check_timeout(&self, generation: u64) {
        let resolution = {
            let mut state = self.state.lock().await;
            if state.generation != generation {
                debug!(generation, current = state.generation, "stale gate deadline ignored");
                return;
            }
            state.resolve()
        };

        if let Resolution::Pending { callback } = resolution {
            warn!(generation, "gate was not confirmed open before the deadline");
            self.deliver(Outcome::TimedOut, callback);
        }
    }

    /// Sends the outcome reply without holding the lock or blocking the caller.
    fn deliver(&self, outcome: Outcome, callback: Option<String>) {
        let Some(address) = callback else {
            match outcome {
                Outcome::Opened => {
                    warn!("gate confirmed open, but there is no reply URL for Slack")
                }
                Outcome::TimedOut => {
                    error!("gate failed to open, but there is no reply URL for Slack")
                }
            }
            return;
        };

        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&address, &outcome.reply()).await {
                error!(url = %address, ?outcome, error = %e, "could not reply to slack");
            }
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NotifyError;
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: std::sync::Mutex<Vec<(String, SlackReply)>>,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<(String, SlackReply)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, address: &str, body: &SlackReply) -> Result<(), NotifyError> {
            self.sent
                .lock()
                .unwrap()
                .push((address.to_string(), body.clone()));
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn notify(&self, address: &str, _body: &SlackReply) -> Result<(), NotifyError> {
            Err(NotifyError::InvalidAddress(address.to_string()))
        }
    }

    fn setup() -> (Arc<GateCoordinator>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let coordinator = GateCoordinator::new(notifier.clone(), DEFAULT_CONFIRM_TIMEOUT);
        (coordinator, notifier)
    }

    /// Lets spawned reply tasks run. With a paused clock the runtime only
    /// advances time once every ready task has been polled.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    fn addr(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_resolve_clears_state() {
        let mut state = GateRequestState {
            pending: true,
            callback: addr("https://a"),
            generation: 3,
        };
        assert_eq!(
            state.resolve(),
            Resolution::Pending { callback: addr("https://a") }
        );
        assert!(!state.pending);
        assert!(state.callback.is_none());
        assert_eq!(state.resolve(), Resolution::NotPending);
        assert_eq!(state.generation, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_returns_ack_and_sets_pending() {
        let (gate, notifier) = setup();
        assert!(!gate.query_status().await);

        let reply = gate.trigger_open(addr("https://a")).await;
        assert_eq!(reply, SlackReply::ack());
        assert!(gate.query_status().await);

        settle().await;
        // The ack is the synchronous response, never a callback
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_before_deadline_sends_one_success() {
        let (gate, notifier) = setup();

        gate.trigger_open(addr("https://a")).await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(gate.confirm_opened().await, ConfirmAck::ok());
        assert!(!gate.query_status().await);

        // Let the deadline fire; it must find nothing to do
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(
            notifier.sent(),
            vec![("https://a".to_string(), SlackReply::success())]
        );
        assert!(!gate.query_status().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_sends_one_failure_and_late_confirm_is_noop() {
        let (gate, notifier) = setup();

        gate.trigger_open(addr("https://b")).await;
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert!(!gate.query_status().await);
        assert_eq!(
            notifier.sent(),
            vec![("https://b".to_string(), SlackReply::failure())]
        );

        assert_eq!(gate.confirm_opened().await, ConfirmAck::ok());
        settle().await;
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_true_only_while_awaiting() {
        let (gate, _notifier) = setup();

        assert!(!gate.query_status().await);
        gate.trigger_open(None).await;

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(gate.query_status().await);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!gate.query_status().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_trigger_wins() {
        let (gate, notifier) = setup();

        gate.trigger_open(addr("https://first")).await;
        gate.trigger_open(addr("https://second")).await;
        gate.trigger_open(addr("https://third")).await;
        gate.confirm_opened().await;
        settle().await;

        assert_eq!(
            notifier.sent(),
            vec![("https://third".to_string(), SlackReply::success())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_without_callback_clears_old_address() {
        let (gate, notifier) = setup();

        gate.trigger_open(addr("https://old")).await;
        gate.trigger_open(None).await;
        gate.confirm_opened().await;
        settle().await;

        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_without_callback_sends_nothing() {
        let (gate, notifier) = setup();

        gate.trigger_open(None).await;
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert!(!gate.query_status().await);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_confirm_sends_at_most_one_success() {
        let (gate, notifier) = setup();

        gate.trigger_open(addr("https://a")).await;
        gate.confirm_opened().await;
        gate.confirm_opened().await;
        settle().await;

        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_when_idle_sends_nothing() {
        let (gate, notifier) = setup();

        assert_eq!(gate.confirm_opened().await, ConfirmAck::ok());
        settle().await;

        assert!(notifier.sent().is_empty());
        assert!(!gate.query_status().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_deadline_does_not_resolve_newer_trigger() {
        let (gate, notifier) = setup();

        gate.trigger_open(addr("https://a")).await;
        tokio::time::sleep(Duration::from_secs(3)).await;
        gate.trigger_open(addr("https://b")).await;

        // First deadline (t=5s) has passed; the newer request is still open
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert!(gate.query_status().await);
        assert!(notifier.sent().is_empty());

        // Second deadline (t=8s)
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!gate.query_status().await);
        assert_eq!(
            notifier.sent(),
            vec![("https://b".to_string(), SlackReply::failure())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifier_failure_does_not_affect_ack() {
        let gate = GateCoordinator::new(Arc::new(FailingNotifier), DEFAULT_CONFIRM_TIMEOUT);

        gate.trigger_open(addr("not a url")).await;
        assert_eq!(gate.confirm_opened().await, ConfirmAck::ok());
        settle().await;

        assert!(!gate.query_status().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_timeout() {
        let notifier = Arc::new(RecordingNotifier::default());
        let gate = GateCoordinator::new(notifier.clone(), Duration::from_secs(30));
        assert_eq!(gate.confirm_timeout(), Duration::from_secs(30));

        gate.trigger_open(addr("https://slow")).await;
        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(gate.query_status().await);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!gate.query_status().await);
        assert_eq!(notifier.sent().len(), 1);
    }
}
