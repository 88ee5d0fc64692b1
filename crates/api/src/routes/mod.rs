pub mod blobs;
pub mod categories;
pub mod form;
pub mod health;
pub mod listen;
pub mod taxonomy;
pub mod variations;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::middleware::auth::require_admin;
use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .merge(taxonomy::routes())
        .merge(categories::routes())
        .merge(variations::routes())
        .merge(listen::routes())
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let mut router = Router::new().merge(health::routes()).merge(admin);
    if state.memory_blobs().is_some() {
        router = router.merge(blobs::routes());
    }

    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config().max_request_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use catalog_core::events::EventBus;
    use catalog_core::mutation::CategoryService;
    use catalog_core::store::{MemoryBlobStore, MemoryDocumentStore};
    use catalog_core::taxonomy::Taxonomy;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{AppConfig, BlobBackend, StoreBackend};
    use crate::middleware::auth::{issue_token, ADMIN_ROLE};

    const SECRET: &str = "router-test-secret";
    const BOUNDARY: &str = "catalog-test-boundary";
    const BASE_URL: &str = "http://localhost:3030/blobs";

    fn test_app() -> Router {
        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 3030,
            jwt_secret: SECRET.into(),
            event_bus_capacity: 64,
            log_level: "debug".into(),
            max_request_bytes: 6 * 1024 * 1024,
            store: StoreBackend::Memory,
            blobs: BlobBackend::Memory {
                public_base_url: BASE_URL.into(),
            },
            taxonomy_path: None,
            cors_origins: Vec::new(),
        };
        let bus = EventBus::new(config.event_bus_capacity);
        let blobs = MemoryBlobStore::new(BASE_URL);
        let documents = MemoryDocumentStore::new(bus.clone());
        let service = CategoryService::new(
            Arc::new(blobs.clone()),
            Arc::new(documents),
            Arc::new(Taxonomy::default()),
        );
        build_router(AppState::new(service, config, bus, None, Some(blobs)))
    }

    fn admin() -> String {
        format!("Bearer {}", issue_token(SECRET, Some(ADMIN_ROLE)))
    }

    fn multipart(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Body {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, content_type, bytes)) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    fn form_request(method: Method, uri: &str, body: Body) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, admin())
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, admin())
            .body(Body::empty())
            .unwrap()
    }

    async fn json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const TOASTER: [(&str, &str); 4] = [
        ("rootCategory", "Modern"),
        ("subCategory", "Kitchen"),
        ("type", "Small Appliances"),
        ("name", "Toaster"),
    ];

    #[tokio::test]
    async fn health_routes_are_public() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(Request::get("/v1/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["database"], "memory");
    }

    #[tokio::test]
    async fn admin_routes_require_a_token() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(Request::get("/v1/taxonomy").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(response).await["error"]["type"], "unauthorized");

        let editor = format!("Bearer {}", issue_token(SECRET, Some("editor")));
        let response = app
            .clone()
            .oneshot(
                Request::get("/v1/taxonomy")
                    .header(header::AUTHORIZATION, editor)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app.oneshot(get("/v1/taxonomy")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let taxonomy = json(response).await;
        assert_eq!(taxonomy["roots"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn category_lifecycle_over_http() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(form_request(
                Method::POST,
                "/v1/categories",
                multipart(&TOASTER, Some(("toaster.jpg", "image/jpeg", b"jpeg-bytes"))),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json(response).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["name"], "Toaster");
        assert_eq!(created["type"], "Small Appliances");
        let image_url = created["featuredImage"].as_str().unwrap().to_string();
        assert!(image_url.starts_with(BASE_URL));

        // The memory backend serves what was uploaded.
        let key = image_url.trim_start_matches(BASE_URL);
        let response = app
            .clone()
            .oneshot(Request::get(format!("/blobs{key}")).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");

        let response = app
            .clone()
            .oneshot(get("/v1/categories?root=Modern&sub=Kitchen"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await.as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(form_request(
                Method::POST,
                &format!("/v1/categories/{id}/variations"),
                multipart(
                    &[
                        ("rootCategory", "Modern"),
                        ("subCategory", "Kitchen"),
                        ("type", "Small Appliances"),
                        ("name", "Red"),
                    ],
                    Some(("red.png", "image/png", b"png-bytes")),
                ),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let variation = json(response).await;
        assert!(variation["id"].as_str().unwrap().starts_with("variation_"));

        let response = app
            .clone()
            .oneshot(get("/v1/stats"))
            .await
            .unwrap();
        let stats = json(response).await;
        assert_eq!(stats["totalCategories"], 1);
        assert_eq!(stats["totalVariations"], 1);
        assert_eq!(stats["totalImages"], 2);

        let response = app
            .clone()
            .oneshot(
                Request::delete(format!("/v1/categories/{id}"))
                    .header(header::AUTHORIZATION, admin())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(get(&format!("/v1/categories/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn validation_failures_are_bad_requests() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(form_request(
                Method::POST,
                "/v1/categories",
                multipart(&TOASTER, None),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(form_request(
                Method::POST,
                "/v1/categories",
                multipart(&TOASTER, Some(("toaster.gif", "image/gif", b"gif"))),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"]["type"], "badRequest");
    }

    #[tokio::test]
    async fn missing_variation_is_not_found() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(form_request(
                Method::POST,
                "/v1/categories",
                multipart(&TOASTER, Some(("toaster.jpg", "image/jpeg", b"jpeg-bytes"))),
            ))
            .await
            .unwrap();
        let id = json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::delete(format!("/v1/categories/{id}/variations/variation_1"))
                    .header(header::AUTHORIZATION, admin())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_variation_ids_are_rejected_before_the_service() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::delete("/v1/categories/any/variations/not-a-variation")
                    .header(header::AUTHORIZATION, admin())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json(response).await;
        assert_eq!(
            body["error"]["message"],
            "`not-a-variation` is not a variation id"
        );
    }
}
