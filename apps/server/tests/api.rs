use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use ladle::domain::config::ApiConfig;
use ladle::kernel::prelude::ApiState;
use ladle_database::Database;
use ladle_media::MediaStore;
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;

const PIXEL_PNG: &[u8] = include_bytes!("../../../infra/media/tests/fixtures/pixel.png");

struct TestApp {
    app: Router,
    media: MediaStore,
    _tmp: TempDir,
}

async fn spawn_app() -> TestApp {
    let tmp = tempdir().expect("tempdir");

    let mut cfg = ApiConfig::default();
    cfg.media.media_dir = tmp.path().join("media");
    cfg.media.static_dir = tmp.path().join("static");
    cfg.security.identity.jwt.secret = "integration-test-secret".to_owned();

    let db = Database::builder()
        .url("mem://")
        .session("ladle", "server_tests")
        .init()
        .await
        .expect("mem database");

    let media = MediaStore::builder()
        .media_dir(&cfg.media.media_dir)
        .static_dir(&cfg.media.static_dir)
        .init()
        .await
        .expect("media store");

    let slices = ladle::init(&cfg, &db, &media).expect("feature init");
    let state = slices
        .into_iter()
        .fold(ApiState::builder().config(cfg).db(db).media(media.clone()), |builder, slice| {
            builder.register_slice(slice)
        })
        .build()
        .expect("api state");

    TestApp { app: ladle_server::router::init(state), media, _tmp: tmp }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    json_request("POST", uri, token, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

async fn register_and_login(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        post_json(
            "/api/user",
            None,
            &json!({"email": email, "password": "Testpass12", "name": "Test Name"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        post_json("/api/user/token", None, &json!({"email": email, "password": "Testpass12"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("token in body").to_owned()
}

#[tokio::test]
async fn health_endpoint_reports_up() {
    let test = spawn_app().await;

    let (status, body) = send(&test.app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");
}

#[tokio::test]
async fn registration_validates_and_hides_password() {
    let test = spawn_app().await;

    let (status, body) = send(
        &test.app,
        post_json(
            "/api/user",
            None,
            &json!({"email": "testuser@gmail.com", "password": "Testpass12", "name": "Test Name"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "testuser@gmail.com");
    assert_eq!(body["name"], "Test Name");
    assert!(body.get("password").is_none(), "password never leaves the server");
    assert!(body.get("password_hash").is_none());

    // Duplicate email
    let (status, _) = send(
        &test.app,
        post_json(
            "/api/user",
            None,
            &json!({"email": "testuser@gmail.com", "password": "Testpass12", "name": "Test Name"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Short password
    let (status, _) = send(
        &test.app,
        post_json(
            "/api/user",
            None,
            &json!({"email": "other@gmail.com", "password": "pw", "name": "Test Name"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_flow_and_me_endpoint() {
    let test = spawn_app().await;
    let token = register_and_login(&test.app, "testuser@gmail.com").await;

    // Bad login credentials are a 400; only bearer-token failures are 401.
    let (status, _) = send(
        &test.app,
        post_json(
            "/api/user/token",
            None,
            &json!({"email": "testuser@gmail.com", "password": "WrongPass99"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Me requires a token.
    let (status, _) = send(&test.app, get("/api/user/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&test.app, get("/api/user/me", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&test.app, get("/api/user/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "testuser@gmail.com");

    let (status, body) = send(
        &test.app,
        json_request("PATCH", "/api/user/me", Some(&token), &json!({"name": "Renamed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");
}

#[tokio::test]
async fn recipe_crud_over_http() {
    let test = spawn_app().await;
    let token = register_and_login(&test.app, "cook@gmail.com").await;

    // Catalog endpoints require authentication.
    let (status, _) = send(&test.app, get("/api/recipe/recipes", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, tag) = send(
        &test.app,
        post_json("/api/recipe/tags", Some(&token), &json!({"name": "Vegan"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tag_id = tag["id"].as_str().expect("tag id").to_owned();

    let (status, recipe) = send(
        &test.app,
        post_json(
            "/api/recipe/recipes",
            Some(&token),
            &json!({
                "title": "Lentil soup",
                "time_minutes": 30,
                "price": 5.5,
                "tags": [tag_id],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(recipe["tags"][0]["name"], "Vegan");
    let recipe_id = recipe["id"].as_str().expect("recipe id").to_owned();

    let (status, listing) = send(&test.app, get("/api/recipe/recipes", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().map(Vec::len), Some(1));
    assert_eq!(listing[0]["tags"][0], tag_id, "listing carries attribute ids");

    let filtered_out = send(
        &test.app,
        get("/api/recipe/recipes?tags=unknown-id", Some(&token)),
    )
    .await;
    assert_eq!(filtered_out.1.as_array().map(Vec::len), Some(0));

    let (status, detail) =
        send(&test.app, get(&format!("/api/recipe/recipes/{recipe_id}"), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "Lentil soup");

    let (status, patched) = send(
        &test.app,
        json_request(
            "PATCH",
            &format!("/api/recipe/recipes/{recipe_id}"),
            Some(&token),
            &json!({"title": "Renamed soup"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "Renamed soup");

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/recipe/recipes/{recipe_id}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    let response = test.app.clone().oneshot(delete).await.expect("delete");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) =
        send(&test.app, get(&format!("/api/recipe/recipes/{recipe_id}"), Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn users_cannot_see_each_other() {
    let test = spawn_app().await;
    let alice = register_and_login(&test.app, "alice@gmail.com").await;
    let bob = register_and_login(&test.app, "bob@gmail.com").await;

    let (status, recipe) = send(
        &test.app,
        post_json(
            "/api/recipe/recipes",
            Some(&alice),
            &json!({"title": "Secret stew", "time_minutes": 10, "price": 3.0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let recipe_id = recipe["id"].as_str().expect("id").to_owned();

    let (status, listing) = send(&test.app, get("/api/recipe/recipes", Some(&bob))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().map(Vec::len), Some(0));

    let (status, _) =
        send(&test.app, get(&format!("/api/recipe/recipes/{recipe_id}"), Some(&bob))).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "foreign recipes read as absent");
}

fn multipart_image(uri: &str, token: &str, payload: &[u8]) -> Request<Body> {
    let boundary = "ladle-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"image\"; filename=\"pixel.png\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .expect("request")
}

#[tokio::test]
async fn image_upload_and_media_serving() {
    let test = spawn_app().await;
    let token = register_and_login(&test.app, "photo@gmail.com").await;

    let (status, recipe) = send(
        &test.app,
        post_json(
            "/api/recipe/recipes",
            Some(&token),
            &json!({"title": "Photogenic", "time_minutes": 5, "price": 1.0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let recipe_id = recipe["id"].as_str().expect("id").to_owned();
    let upload_uri = format!("/api/recipe/recipes/{recipe_id}/image");

    let (status, body) =
        send(&test.app, multipart_image(&upload_uri, &token, PIXEL_PNG)).await;
    assert_eq!(status, StatusCode::OK);
    let image_path = body["image"].as_str().expect("image path").to_owned();
    assert!(test.media.media_root().join(&image_path).is_file());

    // The stored file is reachable through the media route.
    let media_response = test
        .app
        .clone()
        .oneshot(get(&format!("/media/{image_path}"), None))
        .await
        .expect("media request");
    assert_eq!(media_response.status(), StatusCode::OK);

    // Garbage payloads are rejected before touching disk.
    let (status, _) =
        send(&test.app, multipart_image(&upload_uri, &token, b"not an image")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
