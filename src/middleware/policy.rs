use crate::auth::Role;

/// Outcome of classifying a page navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectLogin,
    RedirectDashboard,
}

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

const PUBLIC_PAGES: &[&str] = &["/"];
const AUTH_PAGES: &[&str] = &["/login", "/register"];
const ADMIN_PREFIX: &str = "/admin";
const PROTECTED_PREFIXES: &[&str] = &[
    "/admin",
    "/dashboard",
    "/data",
    "/consignors",
    "/grades",
    "/importers",
    "/new-data",
    "/upload-csv",
];
/// API and static-asset space. The gate never classifies these; API handlers
/// enforce their own authorization.
const EXCLUDED_PREFIXES: &[&str] = &[
    "/api",
    "/_next/static",
    "/_next/image",
    "/favicon.ico",
    "/static",
    "/assets",
];

/// Route classification for page navigations.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    public_routes: Vec<String>,
}

impl AccessPolicy {
    /// `public_routes` extends the built-in public set; entries match exactly
    /// or as a path-segment prefix.
    pub fn new(public_routes: &[String]) -> Self {
        Self {
            public_routes: public_routes
                .iter()
                .map(|r| canonicalize(r))
                .filter(|r| r != "/")
                .collect(),
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        let path = canonicalize(path);
        EXCLUDED_PREFIXES.iter().any(|p| has_segment_prefix(&path, p))
    }

    pub fn is_public(&self, path: &str) -> bool {
        let path = canonicalize(path);
        PUBLIC_PAGES.contains(&path.as_str())
            || self.public_routes.iter().any(|p| has_segment_prefix(&path, p))
    }

    pub fn is_protected(&self, path: &str) -> bool {
        let path = canonicalize(path);
        PROTECTED_PREFIXES.iter().any(|p| has_segment_prefix(&path, p))
    }

    pub fn is_auth_page(&self, path: &str) -> bool {
        AUTH_PAGES.contains(&canonicalize(path).as_str())
    }

    /// Decide what happens to a navigation to `path` by a caller holding
    /// `role` (or no session at all). Never fails.
    pub fn classify(&self, path: &str, role: Option<Role>) -> Decision {
        let path = canonicalize(path);

        if self.is_public(&path) {
            return Decision::Allow;
        }

        let Some(role) = role else {
            return if self.is_protected(&path) {
                Decision::RedirectLogin
            } else {
                Decision::Allow
            };
        };

        if has_segment_prefix(&path, ADMIN_PREFIX) && !role.has_at_least(Role::Admin) {
            return Decision::RedirectDashboard;
        }
        if self.is_auth_page(&path) {
            return Decision::RedirectDashboard;
        }

        Decision::Allow
    }
}

/// Lower-case, drop trailing slashes, and make sure the path is rooted.
pub fn canonicalize(path: &str) -> String {
    let lowered = path.trim().to_lowercase();
    let trimmed = lowered.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

pub fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
