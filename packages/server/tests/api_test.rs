//! HTTP API Tests
//!
//! Drives the full router with in-memory backends through `oneshot` requests.

#[cfg(test)]
mod api_tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use catalog_core::db::MemoryStore;
    use catalog_core::media::MemoryBlobStore;
    use catalog_core::models::NewCategory;
    use catalog_core::{CatalogConfig, CategoryService};
    use catalog_server::{create_router, AppState};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "catalog-test-boundary";

    /// Helper to build a router over seeded in-memory backends
    /// Returns (router, upload_dir) - the TempDir must outlive the test
    fn create_test_app(seed: Vec<NewCategory>) -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::with_categories(seed).unwrap());
        let service = CategoryService::new(
            store,
            Arc::new(MemoryBlobStore::new()),
            CatalogConfig::default(),
        );
        let state = AppState::new(Arc::new(service), temp_dir.path().join("uploads"));
        (create_router(state, None).unwrap(), temp_dir)
    }

    fn shoes_seed() -> Vec<NewCategory> {
        vec![
            NewCategory::new(1, "Shoes", None),
            NewCategory::new(2, "Sneakers", Some(1)),
        ]
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("GET")
            .body(Body::empty())
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(uri: &str, field: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                b = BOUNDARY,
                field = field,
                filename = filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .uri(uri)
            .method("POST")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    /// Files left in the upload directory
    fn staged_uploads(temp_dir: &TempDir) -> usize {
        std::fs::read_dir(temp_dir.path().join("uploads"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _temp) = create_test_app(vec![]);
        let (status, body) = send(&app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_get_and_list() {
        let (app, _temp) = create_test_app(shoes_seed());

        let (status, created) = send(
            &app,
            json_request("POST", "/api/categories", json!({"name": "Boots", "parent": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], 3);
        assert_eq!(created["parent"], 1);
        assert!(created["createdAt"].is_string());

        let (status, fetched) = send(&app, get("/api/categories/3")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Boots");

        let (_, list) = send(&app, get("/api/categories")).await;
        let names: Vec<&str> = list
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Boots", "Shoes", "Sneakers"]);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (app, _temp) = create_test_app(shoes_seed());

        let (status, body) = send(&app, get("/api/categories/42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, body) = send(
            &app,
            json_request("POST", "/api/categories", json!({"name": "Shoes"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "DUPLICATE_NAME");

        let (status, body) = send(
            &app,
            json_request("PUT", "/api/categories/1", json!({"parent": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "CYCLIC_ASSIGNMENT");

        let (status, body) = send(
            &app,
            Request::builder()
                .uri("/api/categories/1")
                .method("DELETE")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "HAS_CHILDREN");
        assert!(body["message"].as_str().unwrap().contains("Delete children first"));
    }

    #[tokio::test]
    async fn test_rejected_input_uses_error_body() {
        let (app, _temp) = create_test_app(shoes_seed());

        let (status, body) = send(
            &app,
            json_request("POST", "/api/categories", json!({"parent": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["message"].as_str().unwrap().contains("name"));

        let (status, body) = send(&app, get("/api/categories/shoes")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["message"].is_string());

        let (status, body) = send(&app, get("/api/categories/search?q=Sn&parent=")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app,
            Request::builder()
                .uri("/api/categories/1")
                .method("PUT")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_detaches_with_null_parent() {
        let (app, _temp) = create_test_app(shoes_seed());

        let (status, body) = send(
            &app,
            json_request("PUT", "/api/categories/2", json!({"parent": null})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["parent"], Value::Null);

        let (_, tree) = send(&app, get("/api/categories/tree")).await;
        assert_eq!(tree.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_tree_views() {
        let (app, _temp) = create_test_app(shoes_seed());

        let (status, tree) = send(&app, get("/api/categories/tree")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            tree,
            json!([{"id": 1, "name": "Shoes", "children": [
                {"id": 2, "name": "Sneakers", "children": []}
            ]}])
        );

        let (_, subtree) = send(&app, get("/api/categories/1/tree")).await;
        assert_eq!(subtree[0]["id"], 2);

        let (_, subs) = send(&app, get("/api/categories/1/subcategories")).await;
        assert_eq!(subs["parentId"], 1);
        assert_eq!(subs["count"], 1);

        let (_, dropdown) = send(&app, get("/api/categories/dropdown/all")).await;
        assert_eq!(dropdown[1], json!({"id": 2, "name": "Sneakers", "parent": 1}));
    }

    #[tokio::test]
    async fn test_search() {
        let (app, _temp) = create_test_app(shoes_seed());

        let (status, hits) = send(&app, get("/api/categories/search?q=SNEAK")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(hits.as_array().unwrap().len(), 1);

        let (status, body) = send(&app, get("/api/categories/search?q=")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_image_upload() {
        let (app, _temp) = create_test_app(shoes_seed());

        let (status, body) = send(
            &app,
            multipart_request("/api/categories/1/image", "image", "shoes.png", b"\x89PNG"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["image"]["url"].as_str().unwrap().starts_with("memory://"));
        assert!(body["image"]["publicId"]
            .as_str()
            .unwrap()
            .starts_with("categories/"));
    }

    #[tokio::test]
    async fn test_bulk_upload_replaces_collection() {
        let (app, temp) = create_test_app(vec![NewCategory::new(9, "Legacy", None)]);
        let csv = b"id,name,image,parent\n1,\"Shoes\",,\"\"\n2,\"Sneakers\",,\"1\"\n3,Hats,,77\n";

        let (status, body) = send(
            &app,
            multipart_request("/api/categories/upload", "file", "categories.csv", csv),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["insertedCount"], 3);
        assert_eq!(body["warnings"].as_array().unwrap().len(), 1);
        assert_eq!(staged_uploads(&temp), 0);

        let (_, list) = send(&app, get("/api/categories")).await;
        let ids: Vec<i64> = list
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_bulk_upload_dry_run_keeps_store() {
        let (app, temp) = create_test_app(shoes_seed());
        let csv = b"id,name,parent\n5,Hats,\n";

        let (status, body) = send(
            &app,
            multipart_request("/api/categories/upload?dryRun=true", "file", "plan.csv", csv),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recordCount"], 1);
        assert_eq!(staged_uploads(&temp), 0);

        let (_, list) = send(&app, get("/api/categories")).await;
        assert_eq!(list.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_upload_rejects_bad_files() {
        let (app, temp) = create_test_app(shoes_seed());

        let (status, body) = send(
            &app,
            multipart_request("/api/categories/upload", "file", "notes.txt", b"hello"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "PARSE_ERROR");
        assert_eq!(staged_uploads(&temp), 0);

        let (status, body) = send(
            &app,
            multipart_request("/api/categories/upload", "other", "a.csv", b"id,name\n1,A\n"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        // Existing data untouched
        let (_, list) = send(&app, get("/api/categories")).await;
        assert_eq!(list.as_array().unwrap().len(), 2);
    }
}
