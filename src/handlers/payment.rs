use actix_web::web::{Data, Json};
use actix_web::{get, post, HttpRequest, HttpResponse};
use bytes::Bytes;

use crate::error::ApiError;
use crate::models::payment::CreateOrderRequest;
use crate::models::user::AuthUser;
use crate::services::reconciler::PaymentReconciler;

const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Payment history plus open obligations for the caller.
#[get("")]
pub async fn list_payments(
    user: AuthUser,
    reconciler: Data<PaymentReconciler>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "payments": reconciler.history_for(user.user_id),
        "pending_payments": reconciler.pending_for(user.user_id),
    })))
}

#[post("/order")]
pub async fn create_order(
    user: AuthUser,
    reconciler: Data<PaymentReconciler>,
    payload: Json<CreateOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    let order = reconciler.create_order(&user, payload.pending_payment_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// Gateway-initiated. Authenticated by the HMAC signature over the raw body,
/// not by a bearer token.
#[post("/webhook")]
pub async fn payment_webhook(
    req: HttpRequest,
    body: Bytes,
    reconciler: Data<PaymentReconciler>,
) -> Result<HttpResponse, ApiError> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let outcome = reconciler.process_webhook(&body, signature)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "outcome": outcome,
    })))
}
