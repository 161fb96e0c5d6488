use axum::{
    extract::State,
    http::Method,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod contact;
pub mod error;
pub mod invoices;
pub mod jobs;
pub mod middleware;
pub mod recommendations;
pub mod reviews;
pub mod rooms;
pub mod state;
pub mod webhooks;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // Public municipal API: permissive CORS
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route("/features", post(rooms::create_feature))
        .route("/features/{room_id}", get(rooms::list_features))
        .route("/public/bookings", get(bookings::public_bookings))
        .route("/bookings", get(bookings::my_bookings))
        .route("/bookings/request", post(bookings::request_booking))
        .route("/bookings/{id}/approve", put(bookings::approve_booking))
        .route("/bookings/{id}/reject", put(bookings::reject_booking))
        .route("/bookings/{id}/refund", post(bookings::refund_booking))
        .route("/invoices/{id}", get(invoices::download_invoice))
        .route("/mydata", get(auth::my_data).delete(auth::delete_my_data))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/logs", get(admin::logs))
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", put(admin::update_role))
        .route("/reviews", post(reviews::create_review))
        .route("/reviews/{room_id}", get(reviews::room_reviews))
        .route("/recommendations", get(recommendations::recommendations))
        .route("/analytics", get(admin::analytics))
        .route("/webhook", post(webhooks::payment_webhook))
        .route("/contact", post(contact::contact))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, impl IntoResponse> {
    let ip = addr.ip().to_string();
    let key = format!("ratelimit:{}", ip);

    match state
        .redis
        .check_rate_limit(&key, state.rules.rate_limit_per_minute, 60)
        .await
    {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => Err((axum::http::StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded")),
        Err(_) => Ok(next.run(req).await), // Fail open
    }
}
