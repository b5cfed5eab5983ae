use axum::{
    extract::Request,
    http::Uri,
    middleware::Next,
    response::Response,
};

/// Keep dotfiles such as `.env` out of the static site. Any path with a
/// segment starting with `.` is served the site root instead.
pub async fn hide_dotfiles(mut req: Request, next: Next) -> Response {
    if is_hidden_path(req.uri().path()) {
        tracing::debug!("Hiding dotfile path {}", req.uri().path());
        *req.uri_mut() = Uri::from_static("/");
    }

    next.run(req).await
}

fn is_hidden_path(path: &str) -> bool {
    path.split('/').any(|segment| {
        let lower = segment.to_ascii_lowercase();
        lower.starts_with('.') || lower.starts_with("%2e")
    })
}
