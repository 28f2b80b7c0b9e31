// src/services/mailer.rs

use async_trait::async_trait;

use crate::common::error::AppError;

/// Mensagem de recuperação de acesso (reset de senha ou magic link).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryEmail {
    pub to: String,
    pub subject: &'static str,
    pub link: String,
}

/// Entrega de e-mails transacionais.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: RecoveryEmail) -> Result<(), AppError>;
}

/// Implementação padrão: só registra o link no log (ambiente de desenvolvimento).
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: RecoveryEmail) -> Result<(), AppError> {
        tracing::info!(to = %email.to, subject = email.subject, link = %email.link, "📧 E-mail de recuperação");
        Ok(())
    }
}
