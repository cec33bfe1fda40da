pub mod guard;
pub mod jwt;
pub mod permissions;
pub mod user;

pub use guard::*;
pub use jwt::*;
pub use permissions::*;
pub use user::*;
