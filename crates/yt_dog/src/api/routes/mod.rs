use axum::Router;

mod youtube;

pub fn router() -> Router {
    Router::new().nest("/api", Router::new().nest("/youtube", youtube::router()))
}
