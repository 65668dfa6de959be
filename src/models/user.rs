use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity resolved from a bearer token by the session service. Every core
/// endpoint requires one; a missing or invalid token uniformly yields
/// `Unauthenticated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}
