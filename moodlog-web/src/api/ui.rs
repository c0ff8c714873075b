//! Landing page route

use axum::response::Html;

/// GET /
///
/// Upload form
pub async fn serve_index() -> Html<String> {
    Html(super::pages::index_page())
}
