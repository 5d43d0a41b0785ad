//! Category CRUD, tree and search endpoints
//!
//! # Endpoints
//!
//! - `GET /api/health` - Health check endpoint
//! - `GET /api/categories` - All categories, sorted by name
//! - `POST /api/categories` - Create a category
//! - `GET /api/categories/dropdown/all` - `{id, name, parent}` list for pickers
//! - `GET /api/categories/tree` - Full category forest
//! - `GET /api/categories/search?q=&parent=` - Name search
//! - `GET /api/categories/:id` - Get a category by id
//! - `PUT /api/categories/:id` - Update name and/or parent
//! - `DELETE /api/categories/:id` - Delete a leaf category
//! - `GET /api/categories/:id/children` - Direct children
//! - `GET /api/categories/:id/subcategories` - Direct children with a count
//! - `GET /api/categories/:id/tree` - Subtree under a category
//! - `POST /api/categories/:id/image` - Replace the image (multipart field `image`)

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use catalog_core::models::{
    Category, CategorySummary, CreateCategory, ImageUpload, TreeNode, UpdateCategory,
};
use serde::{Deserialize, Serialize};

use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{AppState, HttpError};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Query parameters for search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    parent: Option<i64>,
}

/// Direct children of a category with their count
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoriesResponse {
    pub parent_id: i64,
    pub count: usize,
    pub subcategories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Health check endpoint
///
/// ```bash
/// curl http://localhost:5000/api/health
/// ```
async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, HttpError> {
    Ok(Json(state.service.list().await?))
}

/// Create a category
///
/// ```bash
/// curl -X POST http://localhost:5000/api/categories \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Sneakers", "parent": 1}'
/// ```
async fn create_category(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), HttpError> {
    let category = state.service.create(input, None).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn dropdown(State(state): State<AppState>) -> Result<Json<Vec<CategorySummary>>, HttpError> {
    Ok(Json(state.service.dropdown().await?))
}

async fn full_tree(State(state): State<AppState>) -> Result<Json<Vec<TreeNode>>, HttpError> {
    Ok(Json(state.service.tree(None).await?))
}

/// Search categories by name
///
/// ```bash
/// curl "http://localhost:5000/api/categories/search?q=shoe&parent=1"
/// ```
async fn search_categories(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<Category>>, HttpError> {
    Ok(Json(state.service.search(&query.q, query.parent).await?))
}

async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Category>, HttpError> {
    Ok(Json(state.service.get(id).await?))
}

/// Update a category
///
/// `"parent": null` moves the category to the root level; omitting
/// `parent` leaves it where it is.
///
/// ```bash
/// curl -X PUT http://localhost:5000/api/categories/2 \
///   -H "Content-Type: application/json" \
///   -d '{"parent": null}'
/// ```
async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateCategory>,
) -> Result<Json<Category>, HttpError> {
    Ok(Json(state.service.update(id, input, None).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<DeleteResponse>, HttpError> {
    state.service.delete(id).await?;
    Ok(Json(DeleteResponse {
        message: format!("Category {} deleted", id),
    }))
}

async fn get_children(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<Category>>, HttpError> {
    Ok(Json(state.service.children(id).await?))
}

async fn get_subcategories(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<SubcategoriesResponse>, HttpError> {
    let subcategories = state.service.children(id).await?;
    Ok(Json(SubcategoriesResponse {
        parent_id: id,
        count: subcategories.len(),
        subcategories,
    }))
}

async fn get_subtree(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<TreeNode>>, HttpError> {
    Ok(Json(state.service.tree(Some(id)).await?))
}

/// Replace a category's image
///
/// ```bash
/// curl -X POST http://localhost:5000/api/categories/1/image -F image=@shoes.png
/// ```
async fn upload_image(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    mut multipart: Multipart,
) -> Result<Json<Category>, HttpError> {
    let limit = state.max_upload_bytes();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().unwrap_or("image").to_string();
        let bytes = field.bytes().await?;
        if bytes.len() > limit {
            return Err(HttpError::new(
                format!("Image exceeds {} bytes", limit),
                "PAYLOAD_TOO_LARGE",
            ));
        }

        let image = ImageUpload {
            filename,
            bytes: bytes.to_vec(),
        };
        return Ok(Json(state.service.set_image(id, image).await?));
    }

    Err(HttpError::new(
        "Multipart field 'image' is required",
        "VALIDATION_ERROR",
    ))
}

/// Create router with category endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/categories",
            get(list_categories).post(create_category),
        )
        .route("/api/categories/dropdown/all", get(dropdown))
        .route("/api/categories/tree", get(full_tree))
        .route("/api/categories/search", get(search_categories))
        .route(
            "/api/categories/:id",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/api/categories/:id/children", get(get_children))
        .route("/api/categories/:id/subcategories", get(get_subcategories))
        .route("/api/categories/:id/tree", get(get_subtree))
        .route("/api/categories/:id/image", post(upload_image))
        .with_state(state)
}
