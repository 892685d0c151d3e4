pub mod base;
pub mod catalog;
pub mod invite;
pub mod item;
pub mod list;
pub mod member;
pub mod notification;
pub mod push_token;
pub mod user;

pub use base::BaseDao;
