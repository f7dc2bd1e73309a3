pub mod board_handler;
pub mod login_handler;
pub mod member_handler;
pub mod security_handler;
pub mod travel_handler;
