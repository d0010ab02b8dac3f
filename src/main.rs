use crate::config::AppConfig;
use crate::db::connection::{init_db, Database};
use crate::db::import::import_sales_csv;
use crate::errors::ServerError;
use crate::router::serve;
use crate::state::AppState;
use astra::Server;
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

mod analysis;
mod cache;
mod config;
mod db;
mod domain;
mod errors;
mod forecast;
mod handlers;
mod responses;
mod router;
mod spreadsheets;
mod state;
mod templates;

#[cfg(test)]
mod tests;

#[derive(Parser, Debug)]
#[command(author, version, about = "Property sale price forecasting server", long_about = None)]
struct Cli {
    /// Load a sales CSV (datesold,postcode,price,propertyType,bedrooms) into the database and exit
    #[arg(long, value_name = "CSV")]
    import: Option<PathBuf>,
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.rust_log))
        .target(env_logger::Target::Stderr)
        .init();

    let db = Database::new(config.db_path.as_str());
    if let Err(e) = init_db(&db) {
        log::error!("Database initialization failed: {e}");
        std::process::exit(1);
    }

    if let Some(path) = cli.import {
        match import_file(&db, &path) {
            Ok(count) => {
                log::info!("imported {count} sales from {}", path.display());
                return;
            }
            Err(e) => {
                log::error!("import of {} failed: {e}", path.display());
                std::process::exit(1);
            }
        }
    }

    let state = AppState::new(db, config.forecast);
    log::info!(
        "Starting server at http://{} with {} workers",
        config.addr,
        config.workers
    );

    let result = Server::bind(&config.addr)
        .max_workers(config.workers)
        .serve(move |req, _info| serve(req, &state));

    if let Err(e) = result {
        log::error!("Server ended with error: {e}");
        std::process::exit(1);
    }
}

fn import_file(db: &Database, path: &Path) -> Result<usize, ServerError> {
    let file = File::open(path)
        .map_err(|e| ServerError::BadRequest(format!("cannot open {}: {e}", path.display())))?;
    db.with_conn(|conn| {
        import_sales_csv(conn, BufReader::new(file)).map_err(|e| ServerError::BadRequest(e.to_string()))
    })
}
