use axum::extract::Path;

pub async fn index() -> &'static str {
    "lumen demo service"
}

/// Path parameter keeps the `route` label bounded: it is recorded as
/// `/hello/:name`, not per name.
pub async fn hello(Path(name): Path<String>) -> String {
    format!("hello, {name}")
}
