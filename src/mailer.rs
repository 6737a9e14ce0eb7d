use thiserror::Error;

#[derive(Debug, Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

/// Outbound transactional email. The production deployment plugs a real
/// provider in here; the default implementation below only logs, which is
/// enough for development and tests.
pub trait Mailer: Send + Sync {
    fn send_otp(&self, to: &str, recipient_name: &str, code: &str) -> Result<(), MailError>;
}

pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_otp(&self, to: &str, recipient_name: &str, code: &str) -> Result<(), MailError> {
        log::info!(
            "password reset OTP for {} <{}>: {} (valid 10 minutes)",
            recipient_name,
            to,
            code
        );
        Ok(())
    }
}
