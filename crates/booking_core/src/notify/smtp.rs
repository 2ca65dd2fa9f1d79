//! SMTP notifier.
//!
//! Sends one plain-text email per booking to a fixed recipient, usually an
//! SMS-gateway alias, over an authenticated STARTTLS relay.
//!
//! # Invariants
//! - Relay host, port, username and password come from `SmtpConfig` only.
//! - Every send is bounded by the configured timeout.

use super::{BookingNotifier, NotificationMessage, NotifyError};
use crate::config::SmtpConfig;
use crate::model::booking::Booking;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use log::info;
use std::time::{Duration, Instant};

/// Booking notifier backed by an SMTP relay.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
    default_service: String,
}

impl SmtpNotifier {
    /// Builds the transport from configuration without connecting.
    ///
    /// # Errors
    /// - `Address` when the sender or recipient cannot be parsed.
    /// - `Transport` when the relay host is unusable for TLS.
    pub fn from_config(
        config: &SmtpConfig,
        default_service: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let sender = config
            .from_address
            .as_deref()
            .unwrap_or(config.username.as_str());
        let sender: Address = sender
            .parse()
            .map_err(|err| NotifyError::Address(format!("sender `{sender}`: {err}")))?;
        let from = Mailbox::new(config.from_name.clone(), sender);
        let to: Mailbox = config
            .to
            .parse()
            .map_err(|err| NotifyError::Address(format!("recipient `{}`: {err}", config.to)))?;

        let transport = SmtpTransport::starttls_relay(&config.host)
            .map_err(|err| NotifyError::Transport(err.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.expose().to_string(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Ok(Self {
            transport,
            from,
            to,
            default_service: default_service.into(),
        })
    }

    fn build_email(&self, message: NotificationMessage) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body)
            .map_err(|err| NotifyError::Build(err.to_string()))
    }
}

impl BookingNotifier for SmtpNotifier {
    fn booking_created(&self, booking: &Booking) -> Result<(), NotifyError> {
        let started_at = Instant::now();
        let email = self.build_email(NotificationMessage::for_booking(
            booking,
            &self.default_service,
        ))?;

        self.transport
            .send(&email)
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        info!(
            "event=notify_send module=notify status=ok channel=smtp id={} duration_ms={}",
            booking.id,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}
