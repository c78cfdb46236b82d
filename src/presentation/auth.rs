use crate::domain::user::{Registration, User};
use crate::presentation::handlers::{AdminUser, ApiError, AppState, InsertResponse};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Serialize)]
pub struct AdminResponse {
    pub admin: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum RegisterResponse {
    Inserted(InsertResponse),
    Existing {
        message: &'static str,
        #[serde(rename = "insertedId")]
        inserted_id: Option<String>,
    },
}

#[instrument(skip(state, claims))]
pub async fn issue_jwt(
    state: web::Data<AppState>,
    claims: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let token = state.auth_service.issue_token(claims.into_inner())?;
    info!("Token issued");
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

#[instrument(skip(state, user), fields(email = %user.email))]
pub async fn register_user(
    state: web::Data<AppState>,
    user: web::Json<User>,
) -> Result<HttpResponse, ApiError> {
    let response = match state.auth_service.register_user(user.into_inner()).await? {
        Registration::Created { id } => RegisterResponse::Inserted(InsertResponse::inserted(id)),
        Registration::AlreadyExists => RegisterResponse::Existing {
            message: "User already exists",
            inserted_id: None,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(state, caller), fields(email = %*path))]
pub async fn check_admin(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let admin = state.auth_service.is_admin(&caller.0, &path).await?;
    Ok(HttpResponse::Ok().json(AdminResponse { admin }))
}

#[instrument(skip(state, admin), fields(caller = %admin.0.email))]
pub async fn list_users(
    state: web::Data<AppState>,
    admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    let users = state.auth_service.list_users().await?;
    info!(count = users.len(), "Listed users");
    Ok(HttpResponse::Ok().json(users))
}
