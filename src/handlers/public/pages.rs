// handlers/public/pages.rs - Page shells for navigations the gate allowed

use axum::{extract::Extension, http::Uri};
use serde::Serialize;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::middleware::policy::{canonicalize, has_segment_prefix};
use crate::middleware::{ApiResponse, ApiResult};

const PAGES: &[(&str, &str, bool)] = &[
    // (path, title, covers sub-paths)
    ("/", "Home", false),
    ("/login", "Sign in", false),
    ("/register", "Register", false),
    ("/dashboard", "Dashboard", false),
    ("/admin", "Administration", true),
    ("/data", "Trade data", false),
    ("/new-data", "New record", false),
    ("/upload-csv", "Upload CSV", false),
    ("/consignors", "Consignors", true),
    ("/importers", "Importers", true),
    ("/grades", "Grades", true),
];

#[derive(Debug, Serialize)]
pub struct PageShell {
    pub page: String,
    pub title: &'static str,
    pub user: Option<Identity>,
}

/// Fallback for every non-API path. Known pages answer with a descriptor of
/// the page and the signed-in user; anything else is 404.
pub async fn page_shell(uri: Uri, identity: Option<Extension<Identity>>) -> ApiResult<PageShell> {
    let path = canonicalize(uri.path());
    let title = PAGES
        .iter()
        .find(|(page, _, nested)| {
            if *nested {
                has_segment_prefix(&path, page)
            } else {
                path == *page
            }
        })
        .map(|(_, title, _)| *title)
        .ok_or_else(|| ApiError::not_found(format!("No page at {}", uri.path())))?;

    Ok(ApiResponse::success(PageShell {
        page: path,
        title,
        user: identity.map(|Extension(identity)| identity),
    }))
}
