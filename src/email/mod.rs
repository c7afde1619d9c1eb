//! Outbound email collaborator.
//!
//! Invitation delivery is best-effort and fire-and-forget: the invitation
//! record is committed before any send is attempted, and a failed send is
//! logged and swallowed rather than surfaced to the inviter. Use
//! [`dispatch_invitation`] from async contexts; it hands the blocking send
//! to a worker thread and never awaits the result.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email endpoint request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Email endpoint rejected the message: HTTP {0}")]
    Rejected(u16),
}

/// Collaborator interface for sending partner invitations.
pub trait EmailSender: Send + Sync {
    /// Deliver one invitation. Implementations may block; callers dispatch
    /// through [`dispatch_invitation`] so the request path never waits.
    fn send_invitation(
        &self,
        recipient: &str,
        inviter_name: &str,
        invitation_url: &str,
    ) -> Result<(), EmailError>;
}

/// Mailer that only logs the invitation link.
///
/// The default when no delivery endpoint is configured; the link returned
/// by the invite API remains shareable by other means.
#[derive(Debug, Default)]
pub struct LogOnlyMailer;

impl EmailSender for LogOnlyMailer {
    fn send_invitation(
        &self,
        recipient: &str,
        inviter_name: &str,
        invitation_url: &str,
    ) -> Result<(), EmailError> {
        tracing::info!(
            recipient,
            inviter = inviter_name,
            url = invitation_url,
            "email delivery not configured; invitation link logged only"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct InvitationMessage<'a> {
    to: &'a str,
    subject: String,
    inviter: &'a str,
    invitation_url: &'a str,
}

/// Mailer that posts invitations as JSON to a transactional-email HTTP
/// endpoint.
pub struct WebhookMailer {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl WebhookMailer {
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl EmailSender for WebhookMailer {
    fn send_invitation(
        &self,
        recipient: &str,
        inviter_name: &str,
        invitation_url: &str,
    ) -> Result<(), EmailError> {
        let message = InvitationMessage {
            to: recipient,
            subject: format!("{inviter_name} wants you as their Wingman partner!"),
            inviter: inviter_name,
            invitation_url,
        };
        let response = self.client.post(&self.endpoint).json(&message).send()?;
        if !response.status().is_success() {
            return Err(EmailError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Fire-and-forget invitation dispatch.
///
/// Spawns the (possibly blocking) send on a worker thread and returns
/// immediately; failures are logged at warn level and never reach the
/// caller. Must not be able to unwind the transaction that created the
/// invitation, so call it only after the store commit.
pub fn dispatch_invitation(
    mailer: Arc<dyn EmailSender>,
    recipient: String,
    inviter_name: String,
    invitation_url: String,
) {
    tokio::task::spawn_blocking(move || {
        if let Err(error) = mailer.send_invitation(&recipient, &inviter_name, &invitation_url) {
            tracing::warn!(%error, recipient, "invitation email send failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingMailer {
        sent: AtomicUsize,
    }

    impl EmailSender for CountingMailer {
        fn send_invitation(&self, _: &str, _: &str, _: &str) -> Result<(), EmailError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_log_only_mailer_always_succeeds() {
        let mailer = LogOnlyMailer;
        assert!(mailer
            .send_invitation("a@b.co", "Alice", "http://localhost/register?invite_token=x")
            .is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_dispatch_does_not_block_caller() {
        let mailer = Arc::new(CountingMailer {
            sent: AtomicUsize::new(0),
        });
        dispatch_invitation(
            mailer.clone(),
            "a@b.co".to_string(),
            "Alice".to_string(),
            "http://localhost".to_string(),
        );

        // The send happens on a worker thread; give it a moment
        for _ in 0..50 {
            if mailer.sent.load(Ordering::SeqCst) == 1 {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("dispatched invitation was never sent");
    }
}
