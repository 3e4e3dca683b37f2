//! Error types used by the supervisor and its broker collaborator.
//!
//! This module defines three types:
//!
//! - [`BrokerError`]: a protocol exception as reported by the broker collaborator.
//! - [`SupervisorError`]: errors returned to callers of the [`Supervisor`](crate::Supervisor).
//! - [`LossCause`]: why a ready connection epoch ended (passed to `on_connection_lost`).
//!
//! `SupervisorError` and `LossCause` provide `as_label` for logs/metrics.

use std::borrow::Cow;

use thiserror::Error;

/// Reply code for "channel/connection is not open".
const CHANNEL_ERROR: u16 = 504;

/// # Protocol exception reported by the broker collaborator.
///
/// Mirrors the shape of an AMQP close reason: a reply code, a reason text, and
/// whether the exception came from the server and is recoverable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("exception ({code}) reason: {reason:?}")]
pub struct BrokerError {
    /// Protocol reply code.
    pub code: u16,
    /// Human-readable reason.
    pub reason: Cow<'static, str>,
    /// `true` when the exception was raised by the server.
    pub server: bool,
    /// `true` when the operation may succeed if retried.
    pub recover: bool,
}

impl BrokerError {
    /// Creates a client-side, non-recoverable exception.
    pub fn new(code: u16, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            reason: reason.into(),
            server: false,
            recover: false,
        }
    }

    /// Creates a server-initiated exception.
    pub fn server(code: u16, reason: impl Into<Cow<'static, str>>, recover: bool) -> Self {
        Self {
            code,
            reason: reason.into(),
            server: true,
            recover,
        }
    }

    /// The "channel/connection is not open" exception.
    ///
    /// Used when a close notification fires without carrying an error.
    pub const fn closed() -> Self {
        Self {
            code: CHANNEL_ERROR,
            reason: Cow::Borrowed("channel/connection is not open"),
            server: false,
            recover: false,
        }
    }

    /// Returns `true` for the [`BrokerError::closed`] exception.
    pub fn is_closed(&self) -> bool {
        self.code == CHANNEL_ERROR && !self.server
    }
}

/// # Errors returned by the supervisor.
///
/// Dial failures are never returned from accessors: the reconnect loop retries
/// them and reports each one as an [`EventKind::DialFailed`](crate::EventKind::DialFailed) event.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// No usable connection is installed right now.
    #[error("not connected to a server")]
    NotConnected,

    /// `close` was called while the supervisor was not ready (or already closed).
    #[error("already closed: not connected to the server")]
    AlreadyClosed,

    /// The configuration was rejected at build time.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong.
        reason: &'static str,
    },

    /// One dial attempt failed; transient and retried by the loop.
    #[error("dial attempt {attempt} failed: {source}")]
    DialFailed {
        /// Lifetime attempt number (starting from 1).
        attempt: u32,
        /// The collaborator's error.
        #[source]
        source: BrokerError,
    },

    /// Opening a channel on the current connection failed.
    #[error(transparent)]
    OpenChannel(BrokerError),

    /// The collaborator failed to close the connection.
    #[error(transparent)]
    CloseFailed(BrokerError),
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use brokervisor::SupervisorError;
    ///
    /// assert_eq!(SupervisorError::NotConnected.as_label(), "not_connected");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::NotConnected => "not_connected",
            SupervisorError::AlreadyClosed => "already_closed",
            SupervisorError::InvalidConfig { .. } => "invalid_config",
            SupervisorError::DialFailed { .. } => "dial_failed",
            SupervisorError::OpenChannel(_) => "open_channel_failed",
            SupervisorError::CloseFailed(_) => "close_failed",
        }
    }

    /// Indicates whether waiting and trying again may succeed.
    ///
    /// `NotConnected` and `DialFailed` clear up once the loop reconnects; the rest do not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SupervisorError::NotConnected | SupervisorError::DialFailed { .. }
        )
    }
}

/// # Why a ready epoch ended.
///
/// Handed to `on_connection_lost` once per transition out of the ready state.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LossCause {
    /// The broker or the network closed the connection.
    #[error("connection closed: {0}")]
    Closed(BrokerError),

    /// The owner shut the supervisor down.
    #[error("closed by caller")]
    ClosedByCaller,
}

impl LossCause {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LossCause::Closed(_) => "connection_closed",
            LossCause::ClosedByCaller => "closed_by_caller",
        }
    }

    /// Returns the broker error behind the loss, if any.
    pub fn broker_error(&self) -> Option<&BrokerError> {
        match self {
            LossCause::Closed(e) => Some(e),
            LossCause::ClosedByCaller => None,
        }
    }

    /// Returns `true` when the owner requested the shutdown.
    pub fn is_closed_by_caller(&self) -> bool {
        matches!(self, LossCause::ClosedByCaller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_exception_is_recognised() {
        let err = BrokerError::closed();
        assert!(err.is_closed());
        assert_eq!(err.code, 504);
        assert!(!BrokerError::server(504, "forced", false).is_closed());
    }

    #[test]
    fn broker_errors_propagate_verbatim() {
        let inner = BrokerError::server(320, "CONNECTION_FORCED", true);
        let err = SupervisorError::CloseFailed(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(
            SupervisorError::OpenChannel(inner.clone()).to_string(),
            inner.to_string()
        );
    }

    #[test]
    fn transient_errors() {
        assert!(SupervisorError::NotConnected.is_transient());
        assert!(
            SupervisorError::DialFailed {
                attempt: 3,
                source: BrokerError::new(501, "refused"),
            }
            .is_transient()
        );
        assert!(!SupervisorError::AlreadyClosed.is_transient());
    }

    #[test]
    fn loss_cause_labels() {
        let lost = LossCause::Closed(BrokerError::closed());
        assert_eq!(lost.as_label(), "connection_closed");
        assert_eq!(lost.broker_error(), Some(&BrokerError::closed()));
        assert!(LossCause::ClosedByCaller.is_closed_by_caller());
        assert_eq!(LossCause::ClosedByCaller.broker_error(), None);
    }
}
