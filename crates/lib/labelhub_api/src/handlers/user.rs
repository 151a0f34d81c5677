//! Current-user handler.

use axum::{Extension, Json};
use labelhub_core::models::auth::User;

use crate::middleware::auth::AuthenticatedUser;

/// `GET /user` — the signed-in user.
pub async fn current_user_handler(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Json<User> {
    Json(user)
}
