use std::sync::Arc;

use axum::{middleware, routing::get, Router};

pub mod audit;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod docs;
pub mod envelope;
pub mod errors;
pub mod http;
pub mod logging;
pub mod methods;
pub mod registry;

use dispatcher::Dispatcher;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(http::handlers::health))
        .route("/.well-known/api", get(http::handlers::discovery))
        .route(
            http::handlers::DISPATCH_PATH,
            get(http::handlers::dispatch_endpoint).post(http::handlers::dispatch_endpoint),
        )
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::docs::ApiDocs;

    fn dispatcher() -> Dispatcher {
        let mut dispatcher = Dispatcher::default();
        let mut docs = ApiDocs::new();
        methods::register_builtin(&mut dispatcher, &mut docs);
        dispatcher
    }

    fn app() -> Router {
        build_app(AppState::new(Arc::new(dispatcher())))
    }

    fn app_with_key(key: &str) -> Router {
        let mut dispatcher = dispatcher();
        dispatcher.set_secure_key(key);
        build_app(AppState::new(Arc::new(dispatcher)))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.oneshot(request).await.expect("request execution");
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        (
            status,
            String::from_utf8(body.to_vec()).expect("utf-8 response body"),
        )
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("GET")
            .body(Body::empty())
            .expect("request build")
    }

    fn post_request(uri: &str, content_type: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("request build")
    }

    fn parse(body: &str) -> Value {
        serde_json::from_str(body).expect("valid json response")
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, body) = send(app_with_key("abc123"), get_request("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{\"status\":\"ok\"}");
    }

    #[tokio::test]
    async fn discovery_lists_versions() {
        let (status, body) = send(app(), get_request("/.well-known/api")).await;

        assert_eq!(status, StatusCode::OK);
        let body_json = parse(&body);
        assert_eq!(body_json["endpoint"], "/api");
        assert_eq!(body_json["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(body_json["versions"], json!(["1.0", "2.0", "default"]));
        assert_eq!(body_json["access_control"], json!(false));
    }

    #[tokio::test]
    async fn get_dispatches_query_fields() {
        let (status, body) = send(app(), get_request("/api?method=echo&text=hi")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"ok":true,"result":{"text":"hi"}}"#);
    }

    #[tokio::test]
    async fn missing_method_field_targets_default_method() {
        let (status, body) = send(app(), get_request("/api")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"ok":false,"error":{"code":1,"msg":"unknown method"}}"#);
    }

    #[tokio::test]
    async fn errors_are_returned_with_status_ok() {
        let (status, body) = send(app(), get_request("/api?method=echo")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            parse(&body),
            json!({ "ok": false, "error": { "code": 2, "msg": "text is a required parameter" } })
        );
    }

    #[tokio::test]
    async fn post_json_body_is_dispatched() {
        let (status, body) = send(
            app(),
            post_request(
                "/api",
                "application/json",
                r#"{"method":"echo","v":"2.0","text":"ab","repeat":2}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body), json!({ "ok": true, "result": { "text": "abab" } }));
    }

    #[tokio::test]
    async fn post_form_body_overrides_query_fields() {
        let (status, body) = send(
            app(),
            post_request(
                "/api?method=echo&text=from-query",
                "application/x-www-form-urlencoded",
                "text=from-body",
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            parse(&body),
            json!({ "ok": true, "result": { "text": "from-body" } })
        );
    }

    #[tokio::test]
    async fn malformed_json_body_is_bad_request() {
        let (status, body) = send(
            app(),
            post_request("/api", "application/json", r#"{"method":"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse(&body)["code"], "invalid_json");
    }

    #[tokio::test]
    async fn access_key_gates_every_method() {
        let (status, body) = send(app_with_key("abc123"), get_request("/api?method=nope")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"ok":false,"error":{"code":3,"msg":"access denied"}}"#);

        let (_, body) = send(
            app_with_key("abc123"),
            get_request("/api?method=ping&key=abc123"),
        )
        .await;
        assert_eq!(body, r#"{"ok":true,"result":{"pong":true}}"#);
    }

    #[tokio::test]
    async fn multibyte_text_is_written_literally() {
        let (_, body) = send(
            app(),
            post_request(
                "/api",
                "application/json",
                r#"{"method":"echo","text":"привет"}"#,
            ),
        )
        .await;

        assert_eq!(body, r#"{"ok":true,"result":{"text":"привет"}}"#);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (status, _) = send(app(), get_request("/mcp")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
