use crate::config::ConfigErr;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::error::Error;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum DbSetupError {
    #[error("bad password variable: expected POSTGRES_PASSWORD, got {0}")]
    BadPwVariable(String),
    #[error("no password variable: expected POSTGRES_PASSWORD")]
    NoPwVariable,
}

/// Connection settings for Postgres
///
/// The password is not kept here; `password_file` points at a file holding
/// `POSTGRES_PASSWORD=<password>`, read when connecting.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub user: String,
    pub password_file: String,
    pub host: String,
    pub port: String,
    pub dbname: String,
}

impl DbConfig {
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigErr> {
        let required = |key: &'static str| lookup(key).ok_or(ConfigErr::MissingVar(key));

        Ok(Self {
            user: required("PG_USER")?,
            password_file: required("PG_PASSWORDFILE")?,
            host: required("PG_HOST")?,
            port: required("PG_PORT")?,
            dbname: required("PG_DBNAME")?,
        })
    }
}

/// Extracts the password from the contents of a password file
pub fn parse_password_file(contents: &str) -> Result<&str, DbSetupError> {
    match contents.trim().split_once('=') {
        Some(("POSTGRES_PASSWORD", password)) => Ok(password),
        Some((variable, _)) => Err(DbSetupError::BadPwVariable(variable.to_owned())),
        None => Err(DbSetupError::NoPwVariable),
    }
}

/// Sets up the database connection pool
///
/// Reads the password file, connects, then runs any migrations that are needed.
///
/// # Errors
/// This function will return an error if:
/// - The password file cannot be read or is malformed
/// - The connection to the database cannot be established
/// - The migrations cannot be run
pub async fn db_setup(config: &DbConfig) -> Result<Pool<Postgres>, Box<dyn Error>> {
    let password_var = tokio::fs::read_to_string(&config.password_file).await?;
    let password = parse_password_file(&password_var)?;

    let connection = db_connect(config, password).await?;
    info!("Connected to: {}/{}", config.host, config.dbname);
    info!("Running migrations if any are needed");
    sqlx::migrate!().run(&connection).await?;

    Ok(connection)
}

async fn db_connect(config: &DbConfig, password: &str) -> Result<Pool<Postgres>, sqlx::Error> {
    let url = format!(
        "postgresql://{}:{}@{}:{}/{}",
        config.user,
        password.trim(),
        config.host,
        config.port,
        config.dbname,
    );

    info!(
        "Attempting Connection to: postgresql://{}:REDACTED@{}:{}/{}",
        config.user, config.host, config.port, config.dbname
    );

    PgPoolOptions::new().max_connections(10).connect(&url).await
}
