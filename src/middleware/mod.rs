pub mod auth;
pub mod response;
pub mod role;

pub use auth::{require_auth, AuthContext};
pub use response::ApiResponse;
pub use role::{require_membership, BoardRole};
