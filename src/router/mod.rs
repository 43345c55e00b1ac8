pub mod guard;
pub mod routes;

pub use guard::{Navigation, RouterGuard};
pub use routes::{RoutePattern, RouteTable};
