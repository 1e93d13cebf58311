//! Page shells.
//!
//! The console UI renders client-side; these handlers only give the
//! admission gate a page surface to protect and the login entry point a
//! landing route.

use axum::response::Html;

fn shell(page: &str, title: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>{title} · Admin Console</title></head>\n\
         <body>\n\
         <div id=\"root\" data-page=\"{page}\"></div>\n\
         <script src=\"/assets/console.js\"></script>\n\
         </body>\n\
         </html>\n"
    ))
}

/// GET /auth/login — the only public page; accepts a `redirect` query
/// parameter consumed client-side after a successful login.
pub async fn login() -> Html<String> {
    shell("login", "Sign in")
}

/// GET / and GET /dashboard
pub async fn dashboard() -> Html<String> {
    shell("dashboard", "Dashboard")
}

/// GET /documents
pub async fn documents() -> Html<String> {
    shell("documents", "Documents")
}

/// GET /users
pub async fn users() -> Html<String> {
    shell("users", "Users")
}

/// GET /settings
pub async fn settings() -> Html<String> {
    shell("settings", "Settings")
}
