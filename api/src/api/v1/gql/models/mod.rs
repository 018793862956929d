pub mod date;
pub mod notification;
pub mod user;
