use crate::errors::ServerError;
use crate::forecast::{AggregatedSeries, ForecastPoint};
use crate::responses::{xlsx_response, ResultResp};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

/// Two sheets: the observed series, then the forecast with its bounds.
pub fn export_forecast_xlsx(series: &AggregatedSeries, forecast: &[ForecastPoint]) -> ResultResp {
    let buffer = forecast_workbook(series, forecast)?;
    let filename = format!("forecast_{}.xlsx", series.granularity.as_str().to_lowercase());
    xlsx_response(buffer, &filename)
}

pub fn forecast_workbook(series: &AggregatedSeries, forecast: &[ForecastPoint]) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let price_format = Format::new().set_num_format("#,##0");

    let history = workbook.add_worksheet();
    history
        .set_name("History")
        .map_err(|e| ServerError::XlsxError(format!("Failed to name sheet: {e}")))?;
    write_headers(history, &["Period", "Price"])?;
    for (i, point) in series.points.iter().enumerate() {
        let r = (i + 1) as u32;
        history
            .write_string(r, 0, point.time.to_string())
            .map_err(|e| ServerError::XlsxError(format!("Failed to write period: {e}")))?;
        history
            .write_number_with_format(r, 1, point.price, &price_format)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write price: {e}")))?;
    }

    let projected = workbook.add_worksheet();
    projected
        .set_name("Forecast")
        .map_err(|e| ServerError::XlsxError(format!("Failed to name sheet: {e}")))?;
    write_headers(projected, &["Period", "Price", "Lowest", "Highest"])?;
    for (i, point) in forecast.iter().enumerate() {
        let r = (i + 1) as u32;
        projected
            .write_string(r, 0, point.time.to_string())
            .map_err(|e| ServerError::XlsxError(format!("Failed to write period: {e}")))?;
        for (col, value) in [(1, point.price), (2, point.lowest_price), (3, point.highest_price)] {
            projected
                .write_number_with_format(r, col, value as f64, &price_format)
                .map_err(|e| ServerError::XlsxError(format!("Failed to write price: {e}")))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {e}")))
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<(), ServerError> {
    let bold = Format::new().set_bold();
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(|e| {
                ServerError::XlsxError(format!("Failed to write header '{header}': {e}"))
            })?;
    }
    Ok(())
}
