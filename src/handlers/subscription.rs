use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, put, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::models::subscription::{CreateSubscriptionRequest, UpdateSubscriptionRequest};
use crate::models::user::AuthUser;
use crate::services::subscriptions::SubscriptionRegistry;

#[get("")]
pub async fn list_subscriptions(
    user: AuthUser,
    subscriptions: Data<SubscriptionRegistry>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "subscriptions": subscriptions.list_for_owner(user.user_id),
    })))
}

#[post("")]
pub async fn create_subscription(
    user: AuthUser,
    subscriptions: Data<SubscriptionRegistry>,
    payload: Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;
    let subscription = subscriptions.create(user.user_id, payload.into_inner())?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Subscription created successfully",
        "subscription": subscription,
    })))
}

#[get("/{subscription_id}")]
pub async fn get_subscription(
    user: AuthUser,
    subscriptions: Data<SubscriptionRegistry>,
    path: Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let subscription = subscriptions.get_owned(path.into_inner(), user.user_id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "subscription": subscription })))
}

#[put("/{subscription_id}")]
pub async fn update_subscription(
    user: AuthUser,
    subscriptions: Data<SubscriptionRegistry>,
    path: Path<Uuid>,
    payload: Json<UpdateSubscriptionRequest>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;
    let subscription = subscriptions.update(path.into_inner(), user.user_id, payload.into_inner())?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Subscription updated successfully",
        "subscription": subscription,
    })))
}

#[delete("/{subscription_id}")]
pub async fn delete_subscription(
    user: AuthUser,
    subscriptions: Data<SubscriptionRegistry>,
    path: Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    subscriptions.delete(path.into_inner(), user.user_id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Subscription deleted successfully",
    })))
}
