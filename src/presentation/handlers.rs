use crate::application::auth_service::AuthService;
use crate::application::shopping_service::ShoppingService;
use crate::domain::error::DomainError;
use crate::domain::repository::{ShoppingListRepository, ShoppingRepository, UserRepository};
use crate::domain::shopping::{CheckedItem, Fields, ItemUpdate};
use crate::domain::user::User;
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError, web};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub struct AppState {
    pub auth_service: AuthService,
    pub shopping_service: ShoppingService,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        trips: Arc<dyn ShoppingRepository>,
        shopping_list: Arc<dyn ShoppingListRepository>,
        jwt_secret: String,
    ) -> Self {
        Self {
            auth_service: AuthService::new(users, jwt_secret),
            shopping_service: ShoppingService::new(trips, shopping_list),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Auth failures answer with `message`, resource failures with `error`.
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            ApiError::Validation(msg) | ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) => {
                warn!(error = %self, status = %status, "Request rejected");
                serde_json::json!({ "message": msg })
            }
            ApiError::NotFound(msg) => {
                warn!(error = %self, status = %status, "Resource not found");
                serde_json::json!({ "error": msg })
            }
            ApiError::Database(_) => {
                error!(error = %self, status = %status, "Database error");
                serde_json::json!({ "error": "Internal server error" })
            }
            ApiError::Internal(msg) => {
                error!(error = %self, status = %status, "Internal error");
                serde_json::json!({ "error": msg })
            }
        };
        HttpResponse::build(status).json(body)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::Validation(msg)) => ApiError::Validation(msg.clone()),
            Some(DomainError::NotFound(msg)) => ApiError::NotFound(msg.clone()),
            Some(DomainError::Forbidden(msg)) => ApiError::Forbidden(msg.clone()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Database(format!("{:#}", err)),
        }
    }
}

/// Driver failures in item handlers surface as a generic per-action 500.
fn item_failure(action: &'static str) -> impl Fn(anyhow::Error) -> ApiError {
    move |err| match ApiError::from(err) {
        ApiError::Database(detail) => {
            error!(action, error = %detail, "Item operation failed");
            ApiError::Internal(format!("Failed to {} item", action))
        }
        other => other,
    }
}

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!(path = %req.path(), error = %err, "Rejected request body");
    ApiError::Validation(err.to_string()).into()
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        Box::pin(async move {
            user.ok_or_else(|| ApiError::Unauthorized("Forbidden access".to_string()))
        })
    }
}

/// Resolves only when the token holder's stored role is `admin`.
pub struct AdminUser(pub User);

impl FromRequest for AdminUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let caller = req.extensions().get::<AuthenticatedUser>().cloned();
        Box::pin(async move {
            let state =
                state.ok_or_else(|| ApiError::Internal("Application state missing".to_string()))?;
            let AuthenticatedUser(claims) =
                caller.ok_or_else(|| ApiError::Unauthorized("Forbidden access".to_string()))?;
            let user = state.auth_service.require_admin(&claims).await?;
            Ok(AdminUser(user))
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResponse {
    pub acknowledged: bool,
    pub inserted_id: Option<String>,
}

impl InsertResponse {
    pub fn inserted(id: String) -> Self {
        Self {
            acknowledged: true,
            inserted_id: Some(id),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(Serialize)]
pub struct ItemResponse {
    pub message: &'static str,
    pub item: CheckedItem,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hello jonogon")
}

#[instrument(skip(state))]
pub async fn shopping_list(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let entries = state.shopping_service.shopping_list().await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[instrument(skip(state))]
pub async fn list_trips(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let trips = state.shopping_service.list_trips().await?;
    info!(count = trips.len(), "Listed shopping trips");
    Ok(HttpResponse::Ok().json(trips))
}

#[instrument(skip(state), fields(trip_id = %*path))]
pub async fn get_trip(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let trip = state.shopping_service.get_trip(&path).await?;
    Ok(HttpResponse::Ok().json(trip))
}

#[instrument(skip(state, body))]
pub async fn create_trip(
    state: web::Data<AppState>,
    body: web::Json<Fields>,
) -> Result<HttpResponse, ApiError> {
    let id = state.shopping_service.create_trip(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(InsertResponse::inserted(id)))
}

#[instrument(skip(state), fields(trip_id = %*path))]
pub async fn delete_trip(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let deleted_count = state.shopping_service.delete_trip(&path).await?;
    Ok(HttpResponse::Ok().json(DeleteResponse {
        acknowledged: true,
        deleted_count,
    }))
}

#[instrument(skip(state, body), fields(trip_id = %*path))]
pub async fn add_item(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<Fields>,
) -> Result<HttpResponse, ApiError> {
    let item = state
        .shopping_service
        .add_item(&path, body.into_inner())
        .await
        .map_err(item_failure("add"))?;
    info!(item_id = ?item.id(), "Item added");
    Ok(HttpResponse::Ok().json(ItemResponse {
        message: "Item added successfully",
        item,
    }))
}

#[instrument(skip(state))]
pub async fn get_item(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (trip_id, item_id) = path.into_inner();
    let item = state
        .shopping_service
        .get_item(&trip_id, &item_id)
        .await
        .map_err(item_failure("retrieve"))?;
    Ok(HttpResponse::Ok().json(ItemResponse {
        message: "Item retrieved successfully",
        item,
    }))
}

#[instrument(skip(state, body))]
pub async fn update_item(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Json<ItemUpdate>,
) -> Result<HttpResponse, ApiError> {
    let (trip_id, item_id) = path.into_inner();
    state
        .shopping_service
        .update_item(&trip_id, &item_id, body.into_inner())
        .await
        .map_err(item_failure("update"))?;
    info!(trip_id = %trip_id, item_id = %item_id, "Item updated");
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Item updated successfully",
    }))
}

#[instrument(skip(state))]
pub async fn delete_item(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (trip_id, item_id) = path.into_inner();
    state
        .shopping_service
        .delete_item(&trip_id, &item_id)
        .await
        .map_err(item_failure("delete"))?;
    info!(trip_id = %trip_id, item_id = %item_id, "Item deleted");
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Item deleted successfully",
    }))
}
