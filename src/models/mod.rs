use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors};

/// Field name of the multipart part carrying the cart manifest
pub const CART_FIELD: &str = "cart";

/// A binary part of the order form, held fully in memory
#[derive(Debug, Clone)]
pub struct UploadedPart {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Raw order form as decoded from the multipart body
#[derive(Debug, Default, Validate)]
pub struct OrderForm {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub address: Option<String>,
    pub cart: Option<UploadedPart>,
    pub extra_files: Vec<UploadedPart>,
}

impl OrderForm {
    /// Check required fields and turn the form into a complete submission.
    pub fn into_submission(self) -> Result<OrderSubmission, ValidationErrors> {
        self.validate()?;

        let (Some(name), Some(email), Some(address), Some(cart)) =
            (self.name, self.email, self.address, self.cart)
        else {
            return Err(ValidationErrors::new());
        };

        Ok(OrderSubmission {
            name,
            email,
            address,
            cart,
            extra_files: self.extra_files,
        })
    }
}

#[derive(Debug, Clone)]
pub struct OrderSubmission {
    pub name: String,
    pub email: String,
    pub address: String,
    pub cart: UploadedPart,
    pub extra_files: Vec<UploadedPart>,
}

/// One product configuration from the cart manifest. Dimensions are in meters.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    #[serde(default = "not_a_number", deserialize_with = "loose_number")]
    pub width: f64,
    #[serde(default = "not_a_number", deserialize_with = "loose_number")]
    pub height: f64,
    #[serde(default)]
    pub front: Option<Design>,
    #[serde(default)]
    pub back: Option<Design>,
}

/// Print design of one side of a product
#[derive(Debug, Clone, Deserialize)]
pub struct Design {
    #[serde(rename = "type", default)]
    pub kind: Option<DesignKind>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignKind {
    Color,
    Image,
    #[serde(other)]
    Other,
}

impl Design {
    pub fn is_color(&self) -> bool {
        self.kind == Some(DesignKind::Color)
    }
}

fn not_a_number() -> f64 {
    f64::NAN
}

/// Accepts whatever the shop front end put into a dimension field.
/// Anything that is not recognisably numeric becomes NaN instead of an error.
fn loose_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::Null => 0.0,
        Value::Bool(b) => {
            if b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    })
}

/// Email attachment as understood by the email API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub filename: String,
    /// Raw text or base64 encoded bytes
    pub content: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Request body for one email
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}
