pub mod home;
pub mod stats;

pub use home::{home_page, DecisionView};
pub use stats::stats_page;
