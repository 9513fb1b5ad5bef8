use axum::response::Html;

// Single-page front end, embedded at build time.
const INDEX_HTML: &str = include_str!("../../../static/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
