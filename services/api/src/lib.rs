mod cli;
mod infra;
mod report;
mod routes;
mod server;

use review_hub::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
