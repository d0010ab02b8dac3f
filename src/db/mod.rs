pub mod connection;
pub mod import;
pub mod sales;
pub mod users;

pub use connection::{init_db, Database};
