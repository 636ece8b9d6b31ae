//! Account service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, panic_response},
    extract::{JsonBody, PathParam, QueryString},
    models::{AuthenticateQuery, NewAccount, Profile, SignupResponse},
    repositories::Credentials,
    state::AppState,
    validation::{validate_email, validate_name, validate_password},
};

/// Create the router for the account service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/signup", post(signup))
        .route("/authenticate", get(authenticate))
        .route("/user/profile/:id", get(get_profile).put(update_profile))
        .route("/user/data/:id", get(get_data).put(update_data))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe
pub async fn root() -> &'static str {
    "OK"
}

/// Readiness probe, checks the store connection
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.accounts.health_check().await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "accounts-service"
            })),
        ),
        result => {
            if let Err(e) = result {
                error!("Store health check failed: {}", e);
            }
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "service": "accounts-service"
                })),
            )
        }
    }
}

/// Register a new account
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewAccount>,
) -> ApiResult<Json<SignupResponse>> {
    validate_email(&payload.email).map_err(ApiError::BadRequest)?;
    validate_name(&payload.name).map_err(ApiError::BadRequest)?;
    validate_password(&payload.password).map_err(ApiError::BadRequest)?;

    let id = state.accounts.create(&payload).await?;

    Ok(Json(SignupResponse { id }))
}

/// Check an email/password pair
pub async fn authenticate(
    State(state): State<AppState>,
    QueryString(query): QueryString<AuthenticateQuery>,
) -> ApiResult<StatusCode> {
    info!("Authentication attempt for email: {}", query.email);

    match state
        .accounts
        .verify_credentials(&query.email, &query.password)
        .await?
    {
        Credentials::Valid(id) => {
            info!(account_id = %id, "Authentication succeeded");
            Ok(StatusCode::OK)
        }
        Credentials::Invalid => Err(ApiError::InvalidCredentials),
        Credentials::UnknownEmail => Err(ApiError::EmailNotFound),
    }
}

/// Get a profile; `null` when none was stored
pub async fn get_profile(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<Option<Profile>>> {
    Ok(Json(state.accounts.get_profile(id).await?))
}

/// Replace a profile
pub async fn update_profile(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(profile): JsonBody<Profile>,
) -> ApiResult<StatusCode> {
    validate_email(&profile.email).map_err(ApiError::BadRequest)?;
    validate_name(&profile.name).map_err(ApiError::BadRequest)?;

    state.accounts.put_profile(id, &profile).await?;

    Ok(StatusCode::OK)
}

/// Get the data blob; `null` when none was stored
pub async fn get_data(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Json<Option<Value>>> {
    Ok(Json(state.accounts.get_data(id).await?))
}

/// Overwrite the data blob with the request body
pub async fn update_data(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(data): JsonBody<Value>,
) -> ApiResult<StatusCode> {
    state.accounts.put_data(id, &data).await?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{Body, Bytes},
        http::Request,
    };
    use tower::ServiceExt;

    use crate::{
        password::{HashCost, PasswordHasher},
        repositories::AccountRepository,
        store::memory::MemoryStore,
    };

    fn test_app() -> (Arc<MemoryStore>, Router) {
        let store = Arc::new(MemoryStore::new());
        let hasher = PasswordHasher::new(HashCost {
            iterations: 1,
            memory_kib: 1024,
            parallelism: 1,
        })
        .unwrap();
        let state = AppState {
            accounts: AccountRepository::new(store.clone(), hasher),
        };
        (store, create_router(state))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Bytes) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    fn json_body(bytes: &Bytes) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    async fn signup_a(app: &Router) -> Uuid {
        let (status, body) = send(
            app,
            "POST",
            "/signup",
            Some(json!({"email": "a@x.com", "name": "A", "password": "p"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        Uuid::parse_str(json_body(&body)["id"].as_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_root_returns_ok() {
        let (_, app) = test_app();
        let (status, body) = send(&app, "GET", "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_signup_then_get_profile() {
        let (_, app) = test_app();
        let id = signup_a(&app).await;

        let (status, body) = send(&app, "GET", &format!("/user/profile/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body), json!({"email": "a@x.com", "name": "A"}));
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_rejected_without_writes() {
        let (store, app) = test_app();
        signup_a(&app).await;
        let writes = store.writes();

        let (status, body) = send(
            &app,
            "POST",
            "/signup",
            Some(json!({"email": "a@x.com", "name": "Other", "password": "q"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"], "user already exists");
        assert_eq!(store.writes(), writes);
    }

    #[tokio::test]
    async fn test_concurrent_signups_for_one_email_create_one_account() {
        let (_, app) = test_app();

        let mut handles = Vec::new();
        for i in 0..8 {
            let app = app.clone();
            handles.push(tokio::spawn(async move {
                send(
                    &app,
                    "POST",
                    "/signup",
                    Some(json!({"email": "a@x.com", "name": format!("A{}", i), "password": "p"})),
                )
                .await
                .0
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                StatusCode::OK => created += 1,
                status => assert_eq!(status, StatusCode::BAD_REQUEST),
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_signup_validates_input() {
        let (store, app) = test_app();

        let (status, body) = send(
            &app,
            "POST",
            "/signup",
            Some(json!({"email": "not-an-email", "name": "A", "password": "p"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"], "Invalid email format");

        let (status, _) = send(
            &app,
            "POST",
            "/signup",
            Some(json!({"email": "a@x.com", "name": "A", "password": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (_, app) = test_app();
        signup_a(&app).await;

        let (status, body) = send(&app, "GET", "/authenticate?email=a@x.com&password=p", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());

        for wrong in ["q", "pp", "P"] {
            let uri = format!("/authenticate?email=a@x.com&password={}", wrong);
            let (status, body) = send(&app, "GET", &uri, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email_is_not_found() {
        let (_, app) = test_app();

        let (status, body) =
            send(&app, "GET", "/authenticate?email=nobody@x.com&password=p", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_body(&body)["error"], "user email does not exist");
    }

    #[tokio::test]
    async fn test_unknown_profile_and_data_are_null() {
        let (_, app) = test_app();
        let id = Uuid::new_v4();

        let (status, body) = send(&app, "GET", &format!("/user/profile/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body), Value::Null);

        let (status, body) = send(&app, "GET", &format!("/user/data/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body), Value::Null);
    }

    #[tokio::test]
    async fn test_update_profile_overwrites_record() {
        let (_, app) = test_app();
        let id = signup_a(&app).await;
        let uri = format!("/user/profile/{}", id);

        let (status, body) = send(
            &app,
            "PUT",
            &uri,
            Some(json!({"email": "b@x.com", "name": "B"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());

        let (_, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(json_body(&body), json!({"email": "b@x.com", "name": "B"}));
    }

    #[tokio::test]
    async fn test_data_round_trip() {
        let (store, app) = test_app();
        let id = signup_a(&app).await;
        let uri = format!("/user/data/{}", id);

        for _ in 0..2 {
            let (status, body) = send(&app, "PUT", &uri, Some(json!({"k": 1}))).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.is_empty());

            let (status, body) = send(&app, "GET", &uri, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json_body(&body), json!({"k": 1}));
        }

        assert_eq!(
            store.raw(&format!("user:data:{}", id)).unwrap(),
            r#"{"k":1}"#
        );
    }

    #[tokio::test]
    async fn test_signup_accepts_any_addressable_email_and_long_password() {
        let (_, app) = test_app();
        let long_password = "p".repeat(200);
        let accounts = [
            ("user@localhost", "p"),
            ("josé@exemple.fr", "p"),
            ("o'brien@x.com", "p"),
            ("a@x.com", long_password.as_str()),
        ];

        for (email, password) in accounts {
            let (status, body) = send(
                &app,
                "POST",
                "/signup",
                Some(json!({"email": email, "name": "A", "password": password})),
            )
            .await;
            assert_eq!(status, StatusCode::OK, "{}", email);
            assert!(json_body(&body)["id"].is_string());
        }

        let uri = format!("/authenticate?email=a@x.com&password={}", long_password);
        let (status, _) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_update_profile_accepts_unicode_email() {
        let (_, app) = test_app();
        let id = signup_a(&app).await;
        let uri = format!("/user/profile/{}", id);

        let (status, _) = send(
            &app,
            "PUT",
            &uri,
            Some(json!({"email": "josé@localhost", "name": "José"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(json_body(&body)["email"], "josé@localhost");
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected() {
        let (_, app) = test_app();
        let (status, body) = send(&app, "GET", "/user/profile/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_body(&body)["error"].is_string());
    }

    #[tokio::test]
    async fn test_extraction_failures_use_error_envelope() {
        let (store, app) = test_app();

        // Body without a JSON content type
        let request = Request::builder()
            .method("POST")
            .uri("/signup")
            .body(Body::from(r#"{"email":"a@x.com","name":"A","password":"p"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(json_body(&bytes)["error"].is_string());

        // Body missing a field
        let (status, body) = send(
            &app,
            "POST",
            "/signup",
            Some(json!({"email": "a@x.com", "name": "A"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json_body(&body)["error"].is_string());

        // Query string missing a parameter
        let (status, body) = send(&app, "GET", "/authenticate?email=a@x.com", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_body(&body)["error"].is_string());

        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_returns_opaque_error() {
        let (store, app) = test_app();
        store.go_offline();

        let (status, body) = send(&app, "GET", &format!("/user/data/{}", Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(&body);
        assert_eq!(body["error"], "store_unavailable");
        assert!(body["correlationId"].is_string());
        assert!(!body.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_health_reports_store_state() {
        let (store, app) = test_app();

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["status"], "ok");

        store.go_offline();
        let (status, _) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
