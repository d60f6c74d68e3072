// src/notify/smtp.rs
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use uuid::Uuid;

use crate::config::SmtpConfig;
use crate::entity::{Category, Status};
use crate::error::{AppError, Result};
use crate::notify::Notifier;

/// Sends the hostel-management transactional emails over an SMTP relay.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| AppError::Notify(format!("Bad SMTP from address: {}", e)))?;

        let transport = SmtpTransport::relay(&config.relay)
            .map_err(|e| AppError::Notify(format!("SMTP relay setup failed: {}", e)))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }

    fn send(&self, to: &str, subject: &str, body: String) -> Result<()> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| AppError::Notify(format!("Bad recipient address: {}", e)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| AppError::Notify(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(&email)
            .map_err(|e| AppError::Notify(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

impl Notifier for SmtpNotifier {
    fn complaint_confirmation(
        &self,
        to: &str,
        complaint_id: Uuid,
        category: Category,
    ) -> Result<()> {
        let body = format!(
            "<h2>Complaint Received</h2>\
             <p>Your complaint has been successfully registered.</p>\
             <p><strong>Complaint ID:</strong> {}</p>\
             <p><strong>Category:</strong> {}</p>\
             <p>Our admin team will review your complaint shortly.</p>\
             <p>Best regards,<br>Hostel Management</p>",
            complaint_id, category
        );
        self.send(to, "Complaint Received - Hostel Management System", body)
    }

    fn status_update(
        &self,
        to: &str,
        complaint_id: Uuid,
        status: Status,
        admin_remarks: &str,
    ) -> Result<()> {
        let remarks = if admin_remarks.is_empty() {
            "No remarks"
        } else {
            admin_remarks
        };
        let body = format!(
            "<h2>Complaint Status Updated</h2>\
             <p>Your complaint status has been updated.</p>\
             <p><strong>Complaint ID:</strong> {}</p>\
             <p><strong>New Status:</strong> {}</p>\
             <p><strong>Admin Remarks:</strong> {}</p>\
             <p>Best regards,<br>Hostel Management</p>",
            complaint_id, status, remarks
        );
        self.send(to, "Complaint Status Update - Hostel Management System", body)
    }
}
