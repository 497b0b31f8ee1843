//! Booking notification mail.
//!
//! Best-effort: sends are spawned off the request path and failures are
//! logged, never propagated into the booking operation that triggered
//! them.

use crate::config::SmtpConfig;
use crate::models::{Booking, Tutor};
use crate::services::error::AppError;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

#[derive(Clone)]
pub struct Notifier {
    config: SmtpConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl Notifier {
    pub fn new(config: SmtpConfig) -> Result<Self, AppError> {
        if !config.enabled {
            return Ok(Self {
                config,
                transport: None,
            });
        }

        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| {
                AppError::Config(anyhow::anyhow!("Failed to create SMTP relay: {}", e))
            })?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            config,
            transport: Some(transport),
        })
    }

    /// Notify both parties of a new booking. Fire-and-forget.
    pub fn notify_booking_created(&self, booking: &Booking, tutor: &Tutor, student_email: &str) {
        let tutor_mail = self.booking_created_mail(
            &tutor.email,
            "New booking request",
            format!(
                "<p>You have a new {} booking for {} at {}.</p>\
                 <p>Amount: ₹{:.2}. Accept or reject it from your dashboard.</p>",
                if booking.is_trial { "trial" } else { "session" },
                booking.session_date,
                booking.session_time,
                booking.amount,
            ),
        );
        let student_mail = self.booking_created_mail(
            student_email,
            "Booking request received",
            format!(
                "<p>Your booking with {} for {} at {} has been created.</p>\
                 <p>Amount: ₹{:.2}. Complete the payment to unlock chat.</p>",
                tutor.name, booking.session_date, booking.session_time, booking.amount,
            ),
        );

        for mail in [tutor_mail, student_mail] {
            let notifier = self.clone();
            tokio::spawn(async move {
                if let Err(e) = notifier.send(mail).await {
                    tracing::warn!(error = %e, "Failed to send booking notification");
                }
            });
        }
    }

    fn booking_created_mail(&self, to: &str, subject: &str, html: String) -> MailJob {
        MailJob {
            to: to.to_string(),
            subject: subject.to_string(),
            html,
        }
    }

    async fn send(&self, mail: MailJob) -> Result<(), AppError> {
        let transport = match &self.transport {
            Some(t) => t,
            None => {
                tracing::debug!(to = %mail.to, subject = %mail.subject, "SMTP disabled, skipping mail");
                return Ok(());
            }
        };

        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid from address: {}", e)))?;
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid recipient: {}", e)))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html)?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Email(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

struct MailJob {
    to: String,
    subject: String,
    html: String,
}
