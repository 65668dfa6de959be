use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, put, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::models::group::{AvailableGroupView, CreateGroupRequest};
use crate::models::membership::{DecideRequest, JoinGroupRequest};
use crate::models::user::AuthUser;
use crate::services::groups::GroupRegistry;
use crate::services::membership::MembershipLedger;

/// Owner dashboard: groups the caller runs, groups they joined, and the
/// pending requests waiting on their decision.
#[get("")]
pub async fn my_groups(
    user: AuthUser,
    groups: Data<GroupRegistry>,
    memberships: Data<MembershipLedger>,
) -> Result<HttpResponse, ApiError> {
    let owned_groups: Vec<_> = groups
        .owned_by(user.user_id)
        .iter()
        .map(|g| g.to_owned_view())
        .collect();

    let joined_groups: Vec<_> = memberships
        .active_group_ids_for(user.user_id)
        .into_iter()
        .filter_map(|group_id| groups.get(group_id))
        .collect();

    let pending_requests = memberships.list_for_owner(user.user_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "owned_groups": owned_groups,
        "joined_groups": joined_groups,
        "pending_requests": pending_requests,
    })))
}

#[post("")]
pub async fn create_group(
    user: AuthUser,
    groups: Data<GroupRegistry>,
    payload: Json<CreateGroupRequest>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;
    let group = groups.create_group(&user, payload.into_inner())?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Group created successfully",
        "group": group,
    })))
}

/// Groups open to the caller: everything they don't own, flagged with
/// whether they already have a request in flight.
#[get("/browse")]
pub async fn browse_groups(
    user: AuthUser,
    groups: Data<GroupRegistry>,
    memberships: Data<MembershipLedger>,
) -> Result<HttpResponse, ApiError> {
    let available: Vec<AvailableGroupView> = groups
        .list_available(user.user_id)
        .into_iter()
        .map(|group| {
            let has_requested = memberships.has_open_request(group.id, user.user_id);
            AvailableGroupView { group, has_requested }
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({ "groups": available })))
}

#[post("/join")]
pub async fn join_group(
    user: AuthUser,
    memberships: Data<MembershipLedger>,
    payload: Json<JoinGroupRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = memberships.request_join(&user, payload.group_id)?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Join request sent successfully",
        "request": request,
    })))
}

#[put("/requests/{request_id}")]
pub async fn decide_request(
    user: AuthUser,
    memberships: Data<MembershipLedger>,
    path: Path<Uuid>,
    payload: Json<DecideRequest>,
) -> Result<HttpResponse, ApiError> {
    let member = memberships.decide(path.into_inner(), &user, payload.action)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Request handled successfully",
        "member": member,
    })))
}

/// A member leaving, or the owner removing them.
#[delete("/{group_id}/members/{user_id}")]
pub async fn remove_member(
    user: AuthUser,
    memberships: Data<MembershipLedger>,
    path: Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (group_id, target_user_id) = path.into_inner();
    let member = memberships.remove_member(group_id, target_user_id, user.user_id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Member removed successfully",
        "member": member,
    })))
}

#[delete("/{group_id}")]
pub async fn delete_group(
    user: AuthUser,
    groups: Data<GroupRegistry>,
    path: Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    groups.delete_group(path.into_inner(), user.user_id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Group deleted successfully",
    })))
}
