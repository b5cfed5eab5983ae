use crate::models::OutboundEmail;
use crate::services::email::{EmailError, EmailSender};
use serde_json::Value;
use std::fmt;

/// Which of the order emails a step sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailRole {
    AdminNotification,
    CustomerConfirmation,
}

impl fmt::Display for EmailRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailRole::AdminNotification => write!(f, "admin notification"),
            EmailRole::CustomerConfirmation => write!(f, "customer confirmation"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchStep {
    pub role: EmailRole,
    pub email: OutboundEmail,
}

#[derive(Debug)]
pub struct StepOutcome {
    pub role: EmailRole,
    pub result: Result<Value, EmailError>,
}

/// Ordered list of emails for one order.
///
/// Steps run one after another. The first failing step ends the plan, so the
/// outcome list holds every step up to and including the failure.
#[derive(Debug, Clone, Default)]
pub struct DispatchPlan {
    steps: Vec<DispatchStep>,
}

impl DispatchPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, role: EmailRole, email: OutboundEmail) -> Self {
        self.steps.push(DispatchStep { role, email });
        self
    }

    pub fn steps(&self) -> &[DispatchStep] {
        &self.steps
    }

    pub async fn run(self, sender: &dyn EmailSender) -> Vec<StepOutcome> {
        let mut outcomes = Vec::with_capacity(self.steps.len());

        for step in self.steps {
            let result = sender.send(&step.email).await;
            let failed = result.is_err();

            match &result {
                Ok(_) => tracing::info!("📧 Sent {} to {}", step.role, step.email.to),
                Err(e) => tracing::error!("❌ Failed to send {}: {}", step.role, e),
            }

            outcomes.push(StepOutcome {
                role: step.role,
                result,
            });

            if failed {
                break;
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records recipients and fails for one of them
    struct RecordingSender {
        sent: Mutex<Vec<String>>,
        fail_for: Option<String>,
    }

    #[async_trait::async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, email: &OutboundEmail) -> Result<Value, EmailError> {
            self.sent.lock().unwrap().push(email.to.clone());
            if self.fail_for.as_deref() == Some(email.to.as_str()) {
                return Err(EmailError::Rejected {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(serde_json::json!({ "id": email.to }))
        }
    }

    fn email_to(to: &str) -> OutboundEmail {
        OutboundEmail {
            from: "shop@example.com".to_string(),
            to: to.to_string(),
            subject: "Test".to_string(),
            text: String::new(),
            attachments: vec![],
        }
    }

    fn plan() -> DispatchPlan {
        DispatchPlan::new()
            .push(EmailRole::AdminNotification, email_to("admin@example.com"))
            .push(EmailRole::CustomerConfirmation, email_to("kunde@example.com"))
    }

    #[tokio::test]
    async fn test_steps_run_in_order() {
        let sender = RecordingSender {
            sent: Mutex::new(vec![]),
            fail_for: None,
        };

        let outcomes = plan().run(&sender).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].role, EmailRole::AdminNotification);
        assert_eq!(outcomes[1].role, EmailRole::CustomerConfirmation);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
        assert_eq!(
            *sender.sent.lock().unwrap(),
            vec!["admin@example.com", "kunde@example.com"]
        );
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_plan() {
        let sender = RecordingSender {
            sent: Mutex::new(vec![]),
            fail_for: Some("admin@example.com".to_string()),
        };

        let outcomes = plan().run(&sender).await;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].result.is_err());
        assert_eq!(sender.sent.lock().unwrap().len(), 1);
    }
}
