pub mod auth;
pub mod dao;
pub mod invite_link;

pub use auth::AuthService;
pub use dao::*;
