//! Thin typed calls for the REST resources. No local state lives here.

pub mod families;
pub mod notifications;
pub mod users;
pub mod wishlists;

pub use families::FamiliesService;
pub use notifications::{NotificationSource, NotificationsService};
pub use users::UsersService;
pub use wishlists::WishlistsService;
