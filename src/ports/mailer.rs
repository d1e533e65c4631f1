use color_eyre::eyre::Result;

/// Port trait for outgoing account email.
///
/// Implementations live in `services::mailer` (log and HTTP relay) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, to: &str, username: &str, link: &str) -> Result<()>;
}
