pub mod user;

pub use user::{UserByIdLoader, UserByUsernameLoader, UserStatsLoader};
