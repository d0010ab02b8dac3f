pub mod forecasts;
pub mod params;
pub mod sales;
pub mod users;
