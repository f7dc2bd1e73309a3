pub mod board_service;
pub mod member_service;
pub mod travel_service;

pub use board_service::BoardService;
pub use member_service::MemberService;
pub use travel_service::TravelService;
