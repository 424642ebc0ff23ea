use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{NotificationSender, SenderError};
use crate::notifications::models::AlertMessage;

/// Sends alerts as multipart emails through an authenticated STARTTLS relay.
pub struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpSender {
    pub fn new(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        from_name: &str,
    ) -> Result<Self, SenderError> {
        if host.trim().is_empty() {
            return Err(SenderError::InvalidConfiguration(
                "SMTP host is empty".to_string(),
            ));
        }
        if username.trim().is_empty() || password.is_empty() {
            return Err(SenderError::InvalidConfiguration(
                "SMTP username and password are required".to_string(),
            ));
        }

        let from = Mailbox::new(Some(from_name.to_string()), username.trim().parse()?);
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host.trim())?
            .port(port)
            .credentials(Credentials::new(
                username.trim().to_string(),
                password.to_string(),
            ))
            .build();

        Ok(Self { transport, from })
    }

    fn build_email(&self, message: &AlertMessage) -> Result<Message, SenderError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(message.to.trim().parse()?)
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text_body.clone(),
                message.html_body.clone(),
            ))?;
        Ok(email)
    }
}

#[async_trait]
impl NotificationSender for SmtpSender {
    async fn send(&self, message: &AlertMessage) -> Result<(), SenderError> {
        let email = self.build_email(message)?;
        let response = self.transport.send(email).await?;
        if !response.is_positive() {
            return Err(SenderError::SendFailed(format!(
                "SMTP server answered {}",
                response.code()
            )));
        }
        Ok(())
    }
}
