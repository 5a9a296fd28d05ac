use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use tandem::config::Config;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let db_path =
        std::env::temp_dir().join(format!("tandem-tasks-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.tasks.database_path = format!("sqlite:{}", db_path.display());

    let state = tandem::api::tasks::create_state_from_config(&config, None)
        .await
        .expect("Failed to create app state");

    tandem::api::tasks::router(state)
}

async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &Router, uri: &str, form: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn list(app: &Router) -> String {
    let response = get(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn assert_redirects_home(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_empty_list() {
    let app = spawn_app().await;
    let body = list(&app).await;
    assert!(body.contains("<h1>To-Do</h1>"));
    assert!(!body.contains("data-id="));
}

#[tokio::test]
async fn test_add_and_complete() {
    let app = spawn_app().await;

    let response = post_form(&app, "/add", "task=buy+milk").await;
    assert_redirects_home(&response);

    let body = list(&app).await;
    assert!(body.contains(r#"data-id="1" data-done="false""#));
    assert!(body.contains("<span>buy milk</span>"));

    assert_redirects_home(&get(&app, "/complete/1").await);
    let body = list(&app).await;
    assert!(body.contains(r#"data-id="1" data-done="true""#));
    assert!(body.contains(r#"<span class="done">buy milk</span>"#));

    // Completing again changes nothing.
    assert_redirects_home(&get(&app, "/complete/1").await);
    assert_eq!(list(&app).await, body);
}

#[tokio::test]
async fn test_tasks_listed_in_insertion_order() {
    let app = spawn_app().await;
    post_form(&app, "/add", "task=first").await;
    post_form(&app, "/add", "task=second").await;

    let body = list(&app).await;
    let first = body.find("first").unwrap();
    let second = body.find("second").unwrap();
    assert!(first < second);
    assert!(body.contains(r#"data-id="2" data-done="false""#));
}

#[tokio::test]
async fn test_edit_task() {
    let app = spawn_app().await;
    post_form(&app, "/add", "task=buy+milk").await;

    let response = post_form(&app, "/edit/1", "task=buy+oat+milk").await;
    assert_redirects_home(&response);

    let body = list(&app).await;
    assert!(body.contains("<span>buy oat milk</span>"));
    assert!(!body.contains("<span>buy milk</span>"));
}

#[tokio::test]
async fn test_text_kept_exactly_as_submitted() {
    let app = spawn_app().await;
    post_form(&app, "/add", "task=+padded+").await;
    assert!(list(&app).await.contains("<span> padded </span>"));

    post_form(&app, "/edit/1", "task=++two+spaces++").await;
    let body = list(&app).await;
    assert!(body.contains("<span>  two spaces  </span>"));
    assert!(body.contains(r#"value="  two spaces  ""#));
}

#[tokio::test]
async fn test_delete_task() {
    let app = spawn_app().await;
    post_form(&app, "/add", "task=buy+milk").await;
    post_form(&app, "/add", "task=walk+dog").await;

    assert_redirects_home(&get(&app, "/delete/1").await);

    let body = list(&app).await;
    assert!(!body.contains("buy milk"));
    assert!(body.contains(r#"data-id="2""#));
}

#[tokio::test]
async fn test_missing_ids_are_no_ops() {
    let app = spawn_app().await;
    post_form(&app, "/add", "task=buy+milk").await;
    let before = list(&app).await;

    assert_redirects_home(&get(&app, "/complete/42").await);
    assert_redirects_home(&get(&app, "/delete/42").await);
    assert_redirects_home(&post_form(&app, "/edit/42", "task=other").await);

    assert_eq!(list(&app).await, before);
}

#[tokio::test]
async fn test_blank_text_is_ignored() {
    let app = spawn_app().await;

    assert_redirects_home(&post_form(&app, "/add", "task=+++").await);
    assert_redirects_home(&post_form(&app, "/add", "").await);
    assert!(!list(&app).await.contains("data-id="));

    post_form(&app, "/add", "task=buy+milk").await;
    assert_redirects_home(&post_form(&app, "/edit/1", "task=").await);
    assert!(list(&app).await.contains("<span>buy milk</span>"));
}

#[tokio::test]
async fn test_task_text_is_escaped() {
    let app = spawn_app().await;
    post_form(&app, "/add", "task=%3Cb%3Ebold%3C%2Fb%3E").await;

    let body = list(&app).await;
    assert!(body.contains("&lt;b&gt;bold&lt;/b&gt;"));
    assert!(!body.contains("<b>bold</b>"));
}

#[tokio::test]
async fn test_invalid_id_and_unknown_route() {
    let app = spawn_app().await;

    let response = get(&app, "/complete/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}
