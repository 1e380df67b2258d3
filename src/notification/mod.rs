pub mod slack;

use async_trait::async_trait;

use crate::errors::NotifyError;
use crate::models::reply::SlackReply;

/// Delivers an outcome message to a callback address.
///
/// The coordinator calls this from a detached task, so an implementation
/// may take as long as its own timeouts allow.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, address: &str, body: &SlackReply) -> Result<(), NotifyError>;
}
