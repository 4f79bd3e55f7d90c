pub mod admin;
pub mod auth;
pub mod donations;
pub mod members;
pub mod payments;
pub mod root;
pub mod uploads;
