use async_trait::async_trait;

use arena_shared::models::User;

#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, phone: &str, body: &str) -> Result<(), NotifyError>;
}

/// Transport that only logs. Stands in for the SMTP relay in
/// development and in tests; the real relay is deployment wiring.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(to, subject, body, "email dispatched");
        Ok(())
    }
}

pub struct LogSms;

#[async_trait]
impl SmsSender for LogSms {
    async fn send(&self, phone: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(phone, body, "sms dispatched");
        Ok(())
    }
}

/// Channel fan-out for transactional messages. Email always; SMS when
/// the recipient registered a phone number. Fire-and-forget: failures
/// are logged, never propagated to the triggering operation.
pub struct Notifier {
    mailer: std::sync::Arc<dyn Mailer>,
    sms: std::sync::Arc<dyn SmsSender>,
    office_email: String,
}

impl Notifier {
    pub fn new(
        mailer: std::sync::Arc<dyn Mailer>,
        sms: std::sync::Arc<dyn SmsSender>,
        office_email: String,
    ) -> Self {
        Self { mailer, sms, office_email }
    }

    pub fn office_email(&self) -> &str {
        &self.office_email
    }

    pub async fn notify_office(&self, subject: &str, body: &str) {
        if let Err(e) = self.mailer.send(&self.office_email, subject, body).await {
            tracing::error!("office notification failed: {}", e);
        }
    }

    pub async fn notify_user(&self, user: &User, subject: &str, body: &str) {
        if let Err(e) = self.mailer.send(&user.email, subject, body).await {
            tracing::error!("email to user {} failed: {}", user.id, e);
        }
        if let Some(phone) = &user.phone {
            if let Err(e) = self.sms.send(phone, body).await {
                tracing::error!("sms to user {} failed: {}", user.id, e);
            }
        }
    }

    /// Contact-form relay. Unlike booking notifications this is the
    /// primary effect of its operation, so the failure is returned.
    pub async fn relay_contact(
        &self,
        from_name: &str,
        from_email: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        let body = format!("{} <{}>: {}", from_name, from_email, message);
        self.mailer.send(&self.office_email, "Kontaktanfrage", &body).await
    }
}
