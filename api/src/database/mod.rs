pub mod follow;
pub mod notification;
pub mod user;
