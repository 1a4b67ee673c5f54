use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::models::Amount;
use crate::services::billdesk::SharedBillDeskService;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRedirectRequest {
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Invalid payment option"))]
    pub payment_option: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRedirectResponse {
    pub redirect_url: String,
}

#[derive(Debug, Serialize)]
pub struct RedirectErrorBody {
    pub error: String,
    pub details: String,
}

/// Error body used by the redirect endpoint.
pub struct RedirectError(pub AppError);

impl From<AppError> for RedirectError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for RedirectError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        tracing::error!(error = %self.0, "Failed to create redirect URL");

        let body = Json(RedirectErrorBody {
            error: "Failed to create encoded redirect".to_string(),
            details: self.0.client_message(),
        });
        (status, body).into_response()
    }
}

pub async fn create_redirect(
    State(billdesk): State<SharedBillDeskService>,
    payload: Result<Json<CreateRedirectRequest>, JsonRejection>,
) -> Result<Json<CreateRedirectResponse>, RedirectError> {
    let Json(request) = payload.map_err(AppError::from)?;
    tracing::info!(amount = ?request.amount, "Received redirect request");

    request
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))?;

    let amount = Amount::from_json(request.amount.as_ref())?;

    let result = billdesk
        .create_redirect(&amount, request.payment_option)
        .await?;

    tracing::info!(
        merchant_transaction_id = %result.value.merchant_transaction_id,
        persisted = result.persistence.is_stored(),
        "Generated redirect URL"
    );

    Ok(Json(CreateRedirectResponse {
        redirect_url: result.value.redirect_url,
    }))
}
