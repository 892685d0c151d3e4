pub mod catalog_entry;
pub mod invite;
pub mod item;
pub mod list;
pub mod member;
pub mod notification;
pub mod push_token;
pub mod user;

pub use catalog_entry::CatalogEntry;
pub use invite::{Invite, InviteStatus};
pub use item::Item;
pub use list::List;
pub use member::{Member, MemberRole};
pub use notification::{Notification, NotificationKind};
pub use push_token::PushToken;
pub use user::User;
