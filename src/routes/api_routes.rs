use crate::config::AppState;
use crate::controllers::{
    board_handler::{boards, delete_attachment, delete_board, download, get_board, post_board, update_board},
    login_handler::{login_handler, logout_handler},
    member_handler::{avatar, change_password, check_username, join, update_member},
    security_handler,
    travel_handler::{get_travel, image, travels},
};
use crate::middleware::auth::{auth_middleware, current_user_handler};
use crate::models::auth_model::Backend;
use crate::models::member_model::ROLE_ADMIN;
use axum::{
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use axum_login::permission_required;
use std::sync::Arc;

/// Returns a router with all the routes for the API
///
/// Routes fall into three groups:
/// - public: listings, single reads, downloads, join and login
/// - signed-in members: writes, which check ownership in the services
/// - `ROLE_ADMIN` members
pub fn get_routes() -> Router<Arc<AppState>> {
    let public_routes = Router::new()
        .route("/auth/login", post(login_handler))
        .route("/board", get(boards))
        .route("/board/{no}", get(get_board))
        .route("/board/download/{no}", get(download))
        .route("/member", post(join))
        .route("/member/checkusername/{username}", get(check_username))
        .route("/member/{username}/avatar", get(avatar))
        .route("/travel", get(travels))
        .route("/travel/{no}", get(get_travel))
        .route("/travel/image/{no}", get(image))
        .route("/security/all", get(security_handler::all));

    let auth_routes = Router::new()
        .route("/auth/logout", post(logout_handler))
        .route("/auth/current_user", get(current_user_handler))
        .route("/board", post(post_board))
        .route("/board/{no}", put(update_board).delete(delete_board))
        .route("/board/attachment/{no}", delete(delete_attachment))
        .route("/member/{username}", put(update_member))
        .route("/member/{username}/changepassword", put(change_password))
        .route("/security/member", get(security_handler::member))
        .route_layer(from_fn(auth_middleware));

    let admin_routes = Router::new()
        .route("/security/admin", get(security_handler::admin))
        .route_layer(permission_required!(Backend, ROLE_ADMIN))
        .route_layer(from_fn(auth_middleware));

    public_routes.merge(auth_routes).merge(admin_routes)
}
