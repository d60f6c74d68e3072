mod smtp;

pub use smtp::SmtpNotifier;

use uuid::Uuid;

use crate::entity::{Category, Status};
use crate::error::Result;

/// Outbound email seam. Implementations are injected into the API layer so a
/// no-op or recording double can stand in during tests; callers treat every
/// send as fire-and-forget and only log failures.
pub trait Notifier: Send + Sync {
    /// Confirmation sent to the owner right after a complaint is raised
    fn complaint_confirmation(&self, to: &str, complaint_id: Uuid, category: Category)
        -> Result<()>;

    /// Status-change notice sent to the owner after an admin update
    fn status_update(
        &self,
        to: &str,
        complaint_id: Uuid,
        status: Status,
        admin_remarks: &str,
    ) -> Result<()>;
}

/// Discards every notification. Used when no SMTP relay is configured.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn complaint_confirmation(
        &self,
        to: &str,
        complaint_id: Uuid,
        _category: Category,
    ) -> Result<()> {
        tracing::debug!(%to, %complaint_id, "email disabled, dropping confirmation");
        Ok(())
    }

    fn status_update(
        &self,
        to: &str,
        complaint_id: Uuid,
        _status: Status,
        _admin_remarks: &str,
    ) -> Result<()> {
        tracing::debug!(%to, %complaint_id, "email disabled, dropping status update");
        Ok(())
    }
}
