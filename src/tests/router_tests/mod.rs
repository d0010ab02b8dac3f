mod forecast_tests;
mod page_tests;
mod sales_tests;
mod users_tests;
