use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderName, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

const VERSION_HEADER: &str = "zotero-api-version";
const DEFAULT_LIMIT: usize = 25;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub key: String,
    pub version: u64,
    pub title: String,
    #[serde(rename = "parentItem", default, skip_serializing_if = "Option::is_none")]
    pub parent_item: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub key: String,
    pub version: u64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub key: String,
    #[serde(rename = "userID")]
    pub user_id: u64,
    pub username: String,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
    pub start: Option<usize>,
    pub format: Option<String>,
}

/// Fixed library contents served for every user and group.
#[derive(Debug)]
pub struct Library {
    pub items: Vec<Item>,
    pub collections: Vec<Collection>,
}

impl Library {
    pub fn fixture() -> Self {
        let item = |key: &str, version, title: &str, parent: Option<&str>| Item {
            key: key.to_string(),
            version,
            title: title.to_string(),
            parent_item: parent.map(str::to_string),
        };
        Self {
            items: vec![
                item("ABCD2345", 7, "Structure and Interpretation of Computer Programs", None),
                item("BCDE3456", 9, "The Art of Computer Programming", None),
                item("CDEF4567", 11, "Reading notes", Some("BCDE3456")),
            ],
            collections: vec![Collection {
                key: "QWER1234".to_string(),
                version: 5,
                name: "Reading list".to_string(),
            }],
        }
    }

    fn last_modified_version(&self) -> u64 {
        self.items
            .iter()
            .map(|i| i.version)
            .chain(self.collections.iter().map(|c| c.version))
            .max()
            .unwrap_or(0)
    }
}

pub type Db = Arc<Library>;

pub fn app() -> Router {
    let db: Db = Arc::new(Library::fixture());
    Router::new()
        .route("/keys/{key}", get(get_key))
        .route("/{library}/{id}/items", get(list_items))
        .route("/{library}/{id}/items/{key}", get(get_item))
        .route("/{library}/{id}/collections", get(list_collections))
        .layer(middleware::from_fn(require_api_headers))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Reject requests the real API would refuse and echo the version header.
async fn require_api_headers(request: Request, next: Next) -> Response {
    log::info!("{} {}", request.method(), request.uri());

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer ") && v.len() > "Bearer ".len());
    if !authorized {
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    let Some(version) = request.headers().get(VERSION_HEADER).cloned() else {
        return (StatusCode::BAD_REQUEST, "Zotero-API-Version header required").into_response();
    };

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(HeaderName::from_static(VERSION_HEADER), version);
    response
}

fn check_library(library: &str) -> Result<(), StatusCode> {
    match library {
        "users" | "groups" => Ok(()),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn get_key(Path(key): Path<String>) -> Json<KeyInfo> {
    Json(KeyInfo {
        key,
        user_id: 12345,
        username: "mock".to_string(),
    })
}

async fn list_items(
    State(db): State<Db>,
    Path((library, _id)): Path<(String, u64)>,
    Query(params): Query<ListParams>,
) -> Result<Response, StatusCode> {
    check_library(&library)?;

    if params.format.as_deref() == Some("versions") {
        let versions: BTreeMap<&str, u64> =
            db.items.iter().map(|i| (i.key.as_str(), i.version)).collect();
        return Ok(Json(versions).into_response());
    }

    let start = params.start.unwrap_or(0);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let page: Vec<Item> = db.items.iter().skip(start).take(limit).cloned().collect();
    let headers = [
        ("Total-Results", db.items.len().to_string()),
        ("Last-Modified-Version", db.last_modified_version().to_string()),
    ];
    Ok((headers, Json(page)).into_response())
}

async fn get_item(
    State(db): State<Db>,
    Path((library, _id, key)): Path<(String, u64, String)>,
) -> Result<Json<Item>, StatusCode> {
    check_library(&library)?;
    db.items
        .iter()
        .find(|i| i.key == key)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn list_collections(
    State(db): State<Db>,
    Path((library, _id)): Path<(String, u64)>,
) -> Result<Json<Vec<Collection>>, StatusCode> {
    check_library(&library)?;
    Ok(Json(db.collections.clone()))
}
