pub mod forecast_xlsx;

pub use forecast_xlsx::export_forecast_xlsx;
