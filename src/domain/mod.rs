pub mod sale;
pub mod user;
