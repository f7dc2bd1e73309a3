use crate::{
    controllers::{board_handler, login_handler, member_handler, security_handler, travel_handler},
    middleware::auth,
    models::{
        auth_model::{LoginRequest, LoginResponse},
        board_model::{AttachmentForm, Board, BoardAttachment, BoardForm},
        member_model::{ChangePasswordRequest, Member, MemberJoinRequest, MemberUpdateRequest},
        travel_model::{Travel, TravelImage},
    },
    types::{ApiError, ApiStatusCode},
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        login_handler::login_handler,
        login_handler::logout_handler,
        auth::current_user_handler,
        // Board
        board_handler::boards,
        board_handler::get_board,
        board_handler::post_board,
        board_handler::update_board,
        board_handler::delete_board,
        board_handler::download,
        board_handler::delete_attachment,
        // Member
        member_handler::check_username,
        member_handler::join,
        member_handler::avatar,
        member_handler::update_member,
        member_handler::change_password,
        // Travel
        travel_handler::travels,
        travel_handler::get_travel,
        travel_handler::image,
        // Security
        security_handler::all,
        security_handler::member,
        security_handler::admin,
    ),
    components(
        schemas(
            Board, BoardAttachment, BoardForm, AttachmentForm,
            Member, MemberJoinRequest, MemberUpdateRequest, ChangePasswordRequest,
            Travel, TravelImage,
            LoginRequest, LoginResponse,
            ApiError, ApiStatusCode
        )
    ),
    tags(
        (name = "Auth", description = "Sign in and out"),
        (name = "Board", description = "Board posts and their attachments"),
        (name = "Member", description = "Member accounts"),
        (name = "Travel", description = "Travel destinations and their images"),
        (name = "Security", description = "Access checks per role")
    )
)]
pub struct ApiDoc;
