use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use std::str::FromStr;
use std::time::Duration;

/// Opens the single connection the seeder works through.
///
/// The caller owns it and passes it down explicitly; it is released with
/// [`close`] once the run is over.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgConnection, DbError> {
    let options = PgConnectOptions::from_str(&settings.url)
        .map_err(|e| DbError::ConnectionConfigError(e.to_string()))?;

    let timeout = Duration::from_secs(settings.connect_timeout_secs);
    let conn = tokio::time::timeout(timeout, PgConnection::connect_with(&options))
        .await
        .map_err(|_| DbError::ConnectTimeout(settings.connect_timeout_secs))??;

    tracing::info!(
        host = options.get_host(),
        port = options.get_port(),
        database = options.get_database().unwrap_or("<default>"),
        "Connected to PostgreSQL"
    );

    Ok(conn)
}

/// Sends a graceful terminate to the server and drops the connection.
pub async fn close(conn: PgConnection) -> Result<(), DbError> {
    conn.close().await?;
    tracing::debug!("Database connection closed");
    Ok(())
}
