pub mod family;
pub mod notification;
pub mod session;
pub mod user;
pub mod wishlist;

pub use family::{CreateFamily, Family};
pub use notification::{Notification, NotificationKind};
pub use session::{Credentials, Session, TokenPair};
pub use user::User;
pub use wishlist::{
    Activity, CreateWishList, CreateWishListItem, ItemSize, WishList, WishListFilter, WishListItem,
    WishListStats,
};
