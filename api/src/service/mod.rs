pub mod follow;
pub mod user;

pub use follow::{FollowError, FollowService, ToggleOutcome};
pub use user::UserService;
