use crate::config::AppConfig;
use crate::models::{Attachment, OrderSubmission, OutboundEmail, UploadedPart};
use crate::services::cart::parse_manifest;
use crate::services::dispatch::{DispatchPlan, EmailRole};
use crate::services::email::{EmailError, EmailSender};
use crate::services::report::{Customer, REPORT_TITLE, format_report};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub const REPORT_FILENAME: &str = "bestellung.txt";
pub const CONFIRMATION_SUBJECT: &str = "Bestätigung Ihrer Bestellung";

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Invalid cart manifest: {0}")]
    Cart(#[from] serde_json::Error),

    #[error("Failed to send {role}: {source}")]
    Email {
        role: EmailRole,
        #[source]
        source: EmailError,
    },

    #[error("Email dispatch ended without a result for {0}")]
    Incomplete(EmailRole),
}

/// Provider answers for both emails of a successful order
#[derive(Debug, Clone)]
pub struct OrderReceipt {
    pub admin_response: Value,
    pub customer_response: Value,
}

pub struct OrderService {
    sender: Arc<dyn EmailSender>,
    from: String,
    admin_to: String,
}

impl OrderService {
    pub fn new(sender: Arc<dyn EmailSender>, config: &AppConfig) -> Self {
        Self {
            sender,
            from: config.from.clone(),
            admin_to: config.admin_to.clone(),
        }
    }

    /// Parse the cart, render the report and send both order emails.
    pub async fn process(&self, submission: &OrderSubmission) -> Result<OrderReceipt, OrderError> {
        let items = parse_manifest(&submission.cart.data)?;

        let report = format_report(
            &Customer {
                name: &submission.name,
                address: &submission.address,
                email: &submission.email,
            },
            &items,
        );

        tracing::info!(
            "📦 Order from {} with {} item(s) and {} upload(s)",
            submission.name,
            items.len(),
            submission.extra_files.len()
        );

        let plan = self.build_plan(submission, &report);
        let outcomes = plan.run(self.sender.as_ref()).await;

        let mut admin_response = None;
        let mut customer_response = None;

        for outcome in outcomes {
            match outcome.result {
                Ok(value) => match outcome.role {
                    EmailRole::AdminNotification => admin_response = Some(value),
                    EmailRole::CustomerConfirmation => customer_response = Some(value),
                },
                Err(source) => {
                    if admin_response.is_some() {
                        tracing::warn!(
                            "⚠️ Admin notification for {} was accepted but the {} failed",
                            submission.name,
                            outcome.role
                        );
                    }
                    return Err(OrderError::Email {
                        role: outcome.role,
                        source,
                    });
                }
            }
        }

        Ok(OrderReceipt {
            admin_response: admin_response
                .ok_or(OrderError::Incomplete(EmailRole::AdminNotification))?,
            customer_response: customer_response
                .ok_or(OrderError::Incomplete(EmailRole::CustomerConfirmation))?,
        })
    }

    pub fn build_plan(&self, submission: &OrderSubmission, report: &str) -> DispatchPlan {
        let mut attachments = vec![Attachment {
            filename: REPORT_FILENAME.to_string(),
            content: report.to_string(),
            content_type: None,
        }];
        attachments.extend(submission.extra_files.iter().map(upload_attachment));

        let admin = OutboundEmail {
            from: self.from.clone(),
            to: self.admin_to.clone(),
            subject: REPORT_TITLE.to_string(),
            text: format!("Neue Bestellung von {}\n\n{}", submission.name, report),
            attachments,
        };

        let customer = OutboundEmail {
            from: self.from.clone(),
            to: submission.email.clone(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            text: confirmation_text(&submission.name),
            attachments: vec![],
        };

        DispatchPlan::new()
            .push(EmailRole::AdminNotification, admin)
            .push(EmailRole::CustomerConfirmation, customer)
    }
}

pub fn confirmation_text(name: &str) -> String {
    format!(
        "Hallo {name},\n\n\
         vielen Dank für Ihre Bestellung. Wir haben Ihre Bestellung erhalten und bearbeiten sie so schnell wie möglich.\n\n\
         Mit freundlichen Grüßen,\nIhr Team"
    )
}

/// Image uploads travel base64 encoded. Unnamed uploads are named after their field.
pub fn upload_attachment(part: &UploadedPart) -> Attachment {
    let filename = match part.file_name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("{}.png", part.field_name),
    };

    Attachment {
        filename,
        content: BASE64.encode(&part.data),
        content_type: Some(
            part.content_type
                .clone()
                .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    struct FixedSender;

    #[async_trait::async_trait]
    impl EmailSender for FixedSender {
        async fn send(&self, email: &OutboundEmail) -> Result<Value, EmailError> {
            Ok(serde_json::json!({ "to": email.to }))
        }
    }

    fn part(field: &str, file_name: Option<&str>, data: &'static [u8]) -> UploadedPart {
        UploadedPart {
            field_name: field.to_string(),
            file_name: file_name.map(str::to_string),
            content_type: Some("image/png".to_string()),
            data: Bytes::from_static(data),
        }
    }

    fn submission(cart: &'static [u8], extra_files: Vec<UploadedPart>) -> OrderSubmission {
        OrderSubmission {
            name: "Max Muster".to_string(),
            email: "max@example.com".to_string(),
            address: "Ringstr. 5".to_string(),
            cart: part("cart", Some("cart.json"), cart),
            extra_files,
        }
    }

    fn service() -> OrderService {
        let config = AppConfig {
            admin_to: "admin@example.com".to_string(),
            from: "shop@example.com".to_string(),
            ..AppConfig::default()
        };
        OrderService::new(Arc::new(FixedSender), &config)
    }

    #[test]
    fn test_unnamed_upload_uses_field_name() {
        let attachment = upload_attachment(&part("img1", Some(""), b"\x89PNG"));
        assert_eq!(attachment.filename, "img1.png");
        assert_eq!(attachment.content, BASE64.encode(b"\x89PNG"));
        assert_eq!(attachment.content_type.as_deref(), Some("image/png"));

        let attachment = upload_attachment(&part("img2", None, b"x"));
        assert_eq!(attachment.filename, "img2.png");
    }

    #[test]
    fn test_upload_without_type_defaults_to_octet_stream() {
        let mut upload = part("img1", Some("front.jpg"), b"x");
        upload.content_type = None;
        let attachment = upload_attachment(&upload);
        assert_eq!(attachment.filename, "front.jpg");
        assert_eq!(attachment.content_type.as_deref(), Some("application/octet-stream"));
    }

    #[test]
    fn test_plan_contents() {
        let service = service();
        let order = submission(b"[]", vec![part("img1", Some("front.png"), b"abc")]);
        let plan = service.build_plan(&order, "REPORT");
        let steps = plan.steps();

        assert_eq!(steps.len(), 2);

        let admin = &steps[0];
        assert_eq!(admin.role, EmailRole::AdminNotification);
        assert_eq!(admin.email.to, "admin@example.com");
        assert_eq!(admin.email.from, "shop@example.com");
        assert_eq!(admin.email.subject, "Neue Bestellung");
        assert_eq!(admin.email.text, "Neue Bestellung von Max Muster\n\nREPORT");
        assert_eq!(admin.email.attachments.len(), 2);
        assert_eq!(admin.email.attachments[0].filename, "bestellung.txt");
        assert_eq!(admin.email.attachments[0].content, "REPORT");
        assert_eq!(admin.email.attachments[1].filename, "front.png");

        let customer = &steps[1];
        assert_eq!(customer.role, EmailRole::CustomerConfirmation);
        assert_eq!(customer.email.to, "max@example.com");
        assert_eq!(customer.email.subject, "Bestätigung Ihrer Bestellung");
        assert!(customer.email.text.starts_with("Hallo Max Muster,\n\nvielen Dank"));
        assert!(customer.email.text.ends_with("Mit freundlichen Grüßen,\nIhr Team"));
        assert!(customer.email.attachments.is_empty());
    }

    #[tokio::test]
    async fn test_process_returns_both_responses() {
        let receipt = service()
            .process(&submission(br#"[{"width": 1, "height": 1}]"#, vec![]))
            .await
            .unwrap();

        assert_eq!(receipt.admin_response["to"], "admin@example.com");
        assert_eq!(receipt.customer_response["to"], "max@example.com");
    }

    #[tokio::test]
    async fn test_process_rejects_bad_manifest() {
        let err = service()
            .process(&submission(b"not json", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Cart(_)));
    }
}
