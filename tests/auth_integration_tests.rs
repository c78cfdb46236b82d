use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::Utc;
use serde_json::{Value, json};
use shopping_expense_api::data::memory::{
    InMemoryShoppingListRepository, InMemoryShoppingRepository,
};
use shopping_expense_api::data::user_repository::InMemoryUserRepository;
use shopping_expense_api::domain::repository::UserRepository;
use shopping_expense_api::domain::shopping::Fields;
use shopping_expense_api::infrastructure::security::{Claims, TOKEN_TTL_SECS, sign_claims};
use shopping_expense_api::presentation::handlers::AppState;
use shopping_expense_api::presentation::routes::configure;
use std::sync::Arc;

const SECRET: &str = "test-secret-key-for-auth-tests";

macro_rules! setup_auth_test {
    () => {{
        let users = Arc::new(InMemoryUserRepository::new());
        let state = web::Data::new(AppState::new(
            users.clone(),
            Arc::new(InMemoryShoppingRepository::new()),
            Arc::new(InMemoryShoppingListRepository::new()),
            SECRET.to_string(),
        ));

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(|cfg| configure(cfg, SECRET)),
        )
        .await;

        (app, users)
    }};
}

macro_rules! token_for {
    ($app:expr, $claims:expr) => {{
        let req = test::TestRequest::post()
            .uri("/jwt")
            .set_json($claims)
            .to_request();
        let resp: Value = test::call_and_read_body_json(&$app, req).await;
        resp["token"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn test_register_jwt_and_admin_check_flow() {
    let (app, _users) = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({"email": "boss@example.com", "name": "Boss", "role": "admin"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["acknowledged"], true);
    assert_eq!(body["insertedId"].as_str().unwrap().len(), 24);

    let token = token_for!(app, json!({"email": "boss@example.com"}));

    let req = test::TestRequest::get()
        .uri("/users/admin/boss@example.com")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp, json!({"admin": true}));
}

#[actix_web::test]
async fn test_admin_check_for_regular_and_unknown_users() {
    let (app, users) = setup_auth_test!();
    users
        .insert_user(serde_json::from_value(json!({"email": "member@example.com", "role": "member"})).unwrap())
        .await
        .unwrap();

    for email in ["member@example.com", "ghost@example.com"] {
        let token = token_for!(app, json!({ "email": email }));
        let req = test::TestRequest::get()
            .uri(&format!("/users/admin/{}", email))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp, json!({"admin": false}));
    }
}

#[actix_web::test]
async fn test_register_duplicate_email() {
    let (app, users) = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({"email": "duplicate@example.com"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({"email": "duplicate@example.com", "name": "Again"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"message": "User already exists", "insertedId": null})
    );

    assert_eq!(users.list_users().await.unwrap().len(), 1);
}

#[actix_web::test]
async fn test_register_without_email_is_rejected() {
    let (app, users) = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({"name": "Nobody"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(users.list_users().await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_missing_authorization_header() {
    let (app, _users) = setup_auth_test!();

    let req = test::TestRequest::get()
        .uri("/users/admin/a@example.com")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"message": "Forbidden access"}));
}

#[actix_web::test]
async fn test_invalid_token() {
    let (app, _users) = setup_auth_test!();

    let req = test::TestRequest::get()
        .uri("/users/admin/a@example.com")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"message": "unauthorised access"}));
}

#[actix_web::test]
async fn test_token_signed_with_other_secret() {
    let (app, _users) = setup_auth_test!();
    let token = shopping_expense_api::infrastructure::security::issue_token(
        json!({"email": "a@example.com"}),
        "some-other-secret",
    )
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/users/admin/a@example.com")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_expired_token() {
    let (app, _users) = setup_auth_test!();
    let now = Utc::now().timestamp();
    let mut fields = Fields::new();
    fields.insert("email".to_string(), json!("a@example.com"));
    let token = sign_claims(
        &Claims {
            iat: now - TOKEN_TTL_SECS - 5,
            exp: now - 5,
            fields,
        },
        SECRET,
    )
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/users/admin/a@example.com")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "unauthorised access");
}

#[actix_web::test]
async fn test_admin_check_for_other_email_halts_with_forbidden() {
    let (app, users) = setup_auth_test!();
    users
        .insert_user(serde_json::from_value(json!({"email": "boss@example.com", "role": "admin"})).unwrap())
        .await
        .unwrap();
    let token = token_for!(app, json!({"email": "snoop@example.com"}));

    let req = test::TestRequest::get()
        .uri("/users/admin/boss@example.com")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"message": "forbidden access"}));
}

#[actix_web::test]
async fn test_user_listing_requires_admin_role() {
    let (app, users) = setup_auth_test!();
    users
        .insert_user(serde_json::from_value(json!({"email": "boss@example.com", "role": "admin"})).unwrap())
        .await
        .unwrap();
    users
        .insert_user(serde_json::from_value(json!({"email": "member@example.com"})).unwrap())
        .await
        .unwrap();

    let req = test::TestRequest::get().uri("/users").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let member_token = token_for!(app, json!({"email": "member@example.com"}));
    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(("Authorization", format!("Bearer {}", member_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admin_token = token_for!(app, json!({"email": "boss@example.com"}));
    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(("Authorization", format!("Bearer {}", admin_token)))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    let emails: Vec<&str> = resp
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails.len(), 2);
    assert!(emails.contains(&"boss@example.com"));
    assert!(emails.contains(&"member@example.com"));
}

#[actix_web::test]
async fn test_jwt_rejects_non_object_claims() {
    let (app, _users) = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/jwt")
        .set_json(json!(["not", "claims"]))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
