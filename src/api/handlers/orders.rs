use crate::AppState;
use crate::api::error::AppError;
use crate::models::{CART_FIELD, OrderForm, UploadedPart};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub success: bool,
    /// Email API answer for the admin notification
    #[schema(value_type = Object)]
    pub admin_response: Value,
    /// Email API answer for the customer confirmation
    #[schema(value_type = Object)]
    pub customer_response: Value,
}

/// Multipart layout of an order submission
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct OrderUpload {
    pub name: String,
    pub email: String,
    pub address: String,
    /// JSON cart manifest
    #[schema(value_type = String, format = Binary)]
    pub cart: Vec<u8>,
    /// Any other file field is forwarded to the shop as an attachment
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

#[utoipa::path(
    post,
    path = "/send-order",
    request_body(content = OrderUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Both emails sent", body = OrderResponse),
        (status = 400, description = "Required field missing", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Cart or email delivery failed", body = crate::api::error::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn send_order(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OrderResponse>, AppError> {
    let form = match multipart {
        Ok(multipart) => read_order_form(multipart).await?,
        Err(rejection) => {
            tracing::warn!("Order request is not multipart: {}", rejection);
            OrderForm::default()
        }
    };

    let submission = form.into_submission().map_err(|e| {
        tracing::warn!("Rejected incomplete order: {}", e);
        AppError::MissingData
    })?;

    let receipt = state.order_service.process(&submission).await?;

    Ok(Json(OrderResponse {
        success: true,
        admin_response: receipt.admin_response,
        customer_response: receipt.customer_response,
    }))
}

/// Collect text fields and file parts. Only the first `cart` part counts;
/// later ones are dropped.
async fn read_order_form(mut multipart: Multipart) -> Result<OrderForm, AppError> {
    let mut form = OrderForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        if file_name.is_some() || field_name == CART_FIELD {
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(multipart_error)?;
            let part = UploadedPart {
                field_name,
                file_name,
                content_type,
                data,
            };

            if part.field_name != CART_FIELD {
                form.extra_files.push(part);
            } else if form.cart.is_none() {
                form.cart = Some(part);
            }
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        match field_name.as_str() {
            "name" => form.name = Some(value),
            "email" => form.email = Some(value),
            "address" => form.address = Some(value),
            other => tracing::debug!("Ignoring form field '{}'", other),
        }
    }

    Ok(form)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}
