use axum::async_trait;
use tracing::info;

/// Outbound mail seam. Password-reset codes go through here; the
/// concrete transport is swapped at `AppState` construction.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, to: &str, code: &str) -> anyhow::Result<()>;
}

/// Default transport: writes the mail to the log instead of sending it.
/// Good enough for development and for deployments that read codes from
/// the server log; production wires a real transport behind the trait.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp(&self, to: &str, code: &str) -> anyhow::Result<()> {
        info!(recipient = %to, %code, "password reset code issued");
        Ok(())
    }
}
