//! Session handling: cookie attribute policy, the encrypted session token and
//! the owner-identity rule.

pub mod cookie_policy;
pub mod owner;
pub mod session;

pub use cookie_policy::CookiePolicy;
pub use owner::OwnerPolicy;
pub use session::{COOKIE_NAME, SessionClaims};
