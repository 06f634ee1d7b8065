use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::error::ApiError;
use crate::handlers::{
    authorization, development, login, menu, presales, service, user, user_role,
};

pub fn app() -> Router {
    let api = &config::config().api;

    let router = Router::new()
        // Public
        .route("/", get(service::root))
        .route("/health", get(service::health))
        // Resources
        .nest("/api/presales", presales_routes())
        .nest("/api/development", development_routes())
        .nest("/api/attachment", confirmed_project_routes())
        .nest("/api/menu", menu_routes())
        .nest("/api/authorization", authorization_routes())
        .nest("/api/user", user_routes())
        .nest("/api/userrole", user_role_routes())
        .nest("/api/login", login_routes())
        .fallback(route_not_found);

    // Global middleware
    with_request_logging(router, api.enable_request_logging).layer(
        ServiceBuilder::new()
            .layer(CorsLayer::permissive())
            .layer(DefaultBodyLimit::max(api.max_request_size_bytes)),
    )
}

fn with_request_logging(router: Router, enabled: bool) -> Router {
    if enabled {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

fn presales_routes() -> Router {
    Router::new()
        .route("/getall", get(presales::get_all))
        .route("/create", post(presales::create))
        .route("/update/:project_no", put(presales::update))
        .route("/delete/:project_no", delete(presales::delete))
        .route("/:project_no", get(presales::get_by_project_no))
        .route(
            "/:project_no/advance-payment",
            post(presales::add_advance_payment),
        )
}

/// Read routes shared by /api/development and /api/attachment
fn confirmed_project_routes() -> Router {
    Router::new()
        .route("/getall-confirmed", get(development::get_all_confirmed))
        .route("/:project_no/serial-numbers", get(development::serial_numbers))
}

fn development_routes() -> Router {
    confirmed_project_routes()
        .route("/:project_no/status", post(development::add_status_update))
        .route("/work-status/:project_no", get(development::work_status))
        .route("/status-master", get(development::status_master))
}

fn menu_routes() -> Router {
    Router::new()
        .route("/all", get(menu::get_all))
        .route("/all-by-role/:role_id", get(menu::get_all_by_role))
        .route("/only-main-menu", get(menu::get_main_menus))
        .route("/create", post(menu::create))
        .route("/update/:id", put(menu::update))
        .route("/delete/:id", delete(menu::delete))
        .route("/:id", get(menu::get_by_id))
}

fn authorization_routes() -> Router {
    Router::new()
        .route("/create", post(authorization::create))
        .route("/all", get(authorization::get_all))
        .route("/update", put(authorization::update))
        .route("/role/:role_id", get(authorization::get_by_role))
        .route("/delete/:id", delete(authorization::delete))
        .route("/:id", get(authorization::get_by_id))
}

fn user_routes() -> Router {
    Router::new()
        .route("/insert", post(user::insert))
        .route("/getall", get(user::get_all))
        .route("/getbyid/:id", get(user::get_by_id))
        .route("/update", post(user::update))
        .route("/delete/:id", post(user::delete))
}

fn user_role_routes() -> Router {
    Router::new()
        .route("/insert", post(user_role::insert))
        .route("/getall", get(user_role::get_all))
        .route("/getbyid/:id", get(user_role::get_by_id))
        .route("/update", post(user_role::update))
        .route("/delete/:id", post(user_role::delete))
}

fn login_routes() -> Router {
    Router::new()
        .route("/request-otp", post(login::request_otp))
        .route("/verify-otp", post(login::verify_otp))
}
