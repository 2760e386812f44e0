use axum::{Router, response::Html, routing::get};

const INDEX_HTML: &str = include_str!("../../../templates/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn routes() -> Router {
    Router::new().route("/", get(index))
}
