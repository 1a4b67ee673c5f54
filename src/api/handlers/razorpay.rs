use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::Amount;
use crate::services::razorpay::{NewOrder, SharedRazorpayService};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    #[validate(length(equal = 3, message = "Currency must be 3 characters"))]
    pub currency: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 40, message = "Receipt must be 1-40 characters"))]
    pub receipt: Option<String>,
    #[serde(default)]
    pub notes: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    /// Public key the checkout widget is opened with.
    pub key_id: String,
}

pub async fn create_order(
    State(razorpay): State<SharedRazorpayService>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> AppResult<Json<CreateOrderResponse>> {
    let Json(request) = payload?;
    tracing::info!(amount = ?request.amount, currency = ?request.currency, "New order request");

    // Amount is checked first so nothing reaches the gateway without it.
    let amount = Amount::from_json(request.amount.as_ref()).map_err(|e| {
        tracing::warn!("Invalid amount received");
        e
    })?;

    request
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))?;

    let result = razorpay
        .create_order(NewOrder {
            amount,
            currency: request.currency,
            receipt: request.receipt,
            notes: request.notes,
        })
        .await?;

    let order = result.value;
    Ok(Json(CreateOrderResponse {
        success: true,
        order_id: order.order_id,
        amount: order.amount,
        currency: order.currency,
        receipt: order.receipt,
        key_id: razorpay.key_id().to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerificationErrorBody {
    pub status: String,
    pub error: String,
    pub message: String,
}

/// Error shapes of the verification endpoint. Missing fields keep the
/// common error body; anything else is reported as a verification error.
pub struct VerificationError(pub AppError);

impl From<AppError> for VerificationError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for VerificationError {
    fn into_response(self) -> Response {
        match self.0 {
            err @ AppError::MissingParameters(_) => err.into_response(),
            err => {
                tracing::error!(error = %err, "Error during verification");
                let body = Json(VerificationErrorBody {
                    status: "error".to_string(),
                    error: "VERIFICATION_FAILED".to_string(),
                    message: err.client_message(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

pub async fn verify_payment(
    State(razorpay): State<SharedRazorpayService>,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<Response, VerificationError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Unreadable verification request");
        AppError::MissingParameters(
            "razorpay_order_id, razorpay_payment_id and razorpay_signature are required"
                .to_string(),
        )
    })?;
    let (Some(order_id), Some(payment_id), Some(signature)) = (
        required(request.razorpay_order_id),
        required(request.razorpay_payment_id),
        required(request.razorpay_signature),
    ) else {
        tracing::warn!("Missing required parameters for verification");
        return Err(AppError::MissingParameters(
            "razorpay_order_id, razorpay_payment_id and razorpay_signature are required"
                .to_string(),
        )
        .into());
    };

    let result = razorpay
        .verify_payment(&order_id, &payment_id, &signature)
        .await?;

    if !result.value {
        let body = Json(VerifyPaymentResponse {
            status: "verification_failed".to_string(),
            order_id: None,
            payment_id: None,
            message: Some("Invalid signature provided".to_string()),
        });
        return Ok((StatusCode::BAD_REQUEST, body).into_response());
    }

    Ok(Json(VerifyPaymentResponse {
        status: "ok".to_string(),
        order_id: Some(order_id),
        payment_id: Some(payment_id),
        message: None,
    })
    .into_response())
}
