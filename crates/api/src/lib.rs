pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/refresh", post(routes::auth::refresh))
        .route("/me", get(routes::auth::me));

    let list_routes = Router::new()
        .route("/", get(routes::list::list))
        .route("/", post(routes::list::create))
        .route("/{list_id}", get(routes::list::get))
        .route("/{list_id}", put(routes::list::update))
        .route("/{list_id}", delete(routes::list::delete))
        .route("/{list_id}/collision", get(routes::list::collision))
        .route("/{list_id}/merge", post(routes::list::merge))
        .route("/{list_id}/rename-suffix", post(routes::list::rename_suffix));

    let item_routes = Router::new()
        .route("/", get(routes::item::list))
        .route("/", post(routes::item::create))
        .route("/{item_id}", put(routes::item::update))
        .route("/{item_id}", delete(routes::item::delete))
        .route("/{item_id}/quantity", post(routes::item::adjust_quantity))
        .route("/{item_id}/bought", post(routes::item::set_bought));

    let member_routes = Router::new()
        .route("/", get(routes::member::list))
        .route("/{user_id}", put(routes::member::change_role))
        .route("/{user_id}", delete(routes::member::remove));

    // List-scoped invite management for owners/editors.
    let list_invite_routes = Router::new()
        .route("/", get(routes::invite::list))
        .route("/", post(routes::invite::issue))
        .route("/{invite_id}", delete(routes::invite::revoke));

    // Recipient-side invite routes: redeem a token, browse the inbox.
    let invite_routes = Router::new()
        .route("/accept", post(routes::invite::accept))
        .route("/inbox", get(routes::invite::inbox));

    let catalog_routes = Router::new().route("/", get(routes::catalog::suggest));

    let device_routes = Router::new()
        .route("/", put(routes::device::register))
        .route("/{token}", delete(routes::device::remove));

    let notification_routes = Router::new()
        .route("/", get(routes::notification::list))
        .route("/{notification_id}/read", post(routes::notification::mark_read));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/list", list_routes)
        .nest("/list/{list_id}/item", item_routes)
        .nest("/list/{list_id}/member", member_routes)
        .nest("/list/{list_id}/invite", list_invite_routes)
        .nest("/invite", invite_routes)
        .nest("/catalog", catalog_routes)
        .nest("/device", device_routes)
        .nest("/notifications", notification_routes);

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .route("/ws", get(ws::handler::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
