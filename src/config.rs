use crate::db_config::{db_setup, DbConfig};
use crate::models::auth_model::Backend;
use crate::models::board_model::{BoardStore, PgBoardStore};
use crate::models::member_model::{MemberJoinRequest, MemberStore, PgMemberStore};
use crate::models::memory_store::{MemoryBoardStore, MemoryMemberStore, MemoryTravelStore};
use crate::models::travel_model::{PgTravelStore, TravelStore};
use crate::services::{BoardService, MemberService, TravelService};
use sqlx::{Pool, Postgres};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_UPLOAD_DIR: &str = "upload";

#[derive(Debug, thiserror::Error)]
pub enum ConfigErr {
    #[error("unknown profile '{0}', expected dev, prod or test")]
    UnknownProfile(String),
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Named environment the process runs in, picked once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
    Test,
}

impl FromStr for Profile {
    type Err = ConfigErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Profile::Dev),
            "prod" => Ok(Profile::Prod),
            "test" => Ok(Profile::Test),
            other => Err(ConfigErr::UnknownProfile(other.to_string())),
        }
    }
}

impl Display for Profile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Profile::Dev => "dev",
            Profile::Prod => "prod",
            Profile::Test => "test",
        };
        write!(f, "{name}")
    }
}

/// Account created at startup when `ADMIN_USERNAME` is set
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Process configuration
///
/// Built once in `main` and moved into `AppState`; nothing reads the environment afterwards.
///
/// # Fields
/// - `profile`: which environment we run in
/// - `bind_addr`: address the HTTP server listens on
/// - `upload_dir`: root of stored files (`avatar/` lives below it)
/// - `database`: connection settings, absent for the `test` profile
/// - `admin`: optional admin account to create on startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub profile: Profile,
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub database: Option<DbConfig>,
    pub admin: Option<AdminAccount>,
}

impl AppConfig {
    /// Loads `.env`, then `config/<profile>.env`, then reads the configuration.
    ///
    /// Variables already present in the environment win over both files.
    pub fn from_env() -> Result<Self, ConfigErr> {
        dotenvy::dotenv().ok();

        let profile: Profile = std::env::var("APP_PROFILE")
            .unwrap_or_else(|_| "dev".to_string())
            .parse()?;

        let profile_file = format!("config/{profile}.env");
        if dotenvy::from_filename(&profile_file).is_ok() {
            tracing::info!("Loaded {}", profile_file);
        }

        Self::from_vars(profile, |key| std::env::var(key).ok())
    }

    /// Reads the configuration for `profile` through `lookup`
    pub fn from_vars(
        profile: Profile,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigErr> {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .map_err(|_| ConfigErr::InvalidValue("BIND_ADDR", bind_addr.clone()))?;

        let upload_dir = lookup("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));

        let database = match profile {
            Profile::Test => None,
            Profile::Dev | Profile::Prod => Some(DbConfig::from_vars(&lookup)?),
        };

        let admin = lookup("ADMIN_USERNAME").map(|username| AdminAccount {
            password: lookup("ADMIN_PASSWORD").unwrap_or_default(),
            email: lookup("ADMIN_EMAIL").unwrap_or_else(|| format!("{username}@localhost")),
            username,
        });
        if admin.as_ref().is_some_and(|a| a.password.is_empty()) {
            return Err(ConfigErr::MissingVar("ADMIN_PASSWORD"));
        }

        Ok(Self {
            profile,
            bind_addr,
            upload_dir,
            database,
            admin,
        })
    }

    /// Configuration for the in-memory `test` profile
    pub fn for_tests() -> Self {
        Self {
            profile: Profile::Test,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            database: None,
            admin: None,
        }
    }

    pub fn avatar_dir(&self) -> PathBuf {
        self.upload_dir.join("avatar")
    }
}

/// The application state shared by every handler
///
/// # Fields
/// - `config`: the startup configuration
/// - `boards`, `members`, `travels`: the resource services
/// - `auth_backend`: axum-login backend over the member store
/// - `db_pool`: the Postgres pool, absent when running on the in-memory stores
pub struct AppState {
    pub config: AppConfig,
    pub boards: BoardService,
    pub members: MemberService,
    pub travels: TravelService,
    pub auth_backend: Backend,
    pub db_pool: Option<Pool<Postgres>>,
}

impl AppState {
    /// Creates the state for `config`: Postgres stores for `dev`/`prod`, in-memory for `test`.
    ///
    /// # Errors
    /// This function will return an error if:
    /// - the database can't be reached or migrated
    /// - the configured admin account can't be created
    pub async fn new(config: AppConfig) -> Result<Self, Box<dyn Error>> {
        let state = match &config.database {
            Some(db_config) => {
                let db_pool = db_setup(db_config).await?;
                Self::with_stores(
                    config.clone(),
                    Arc::new(PgBoardStore::new(db_pool.clone())),
                    Arc::new(PgMemberStore::new(db_pool.clone())),
                    Arc::new(PgTravelStore::new(db_pool.clone())),
                    Some(db_pool),
                )
            }
            None => {
                tracing::warn!("No database configured, running on in-memory stores");
                Self::in_memory(config.clone())
            }
        };

        if let Some(admin) = &config.admin {
            state
                .members
                .ensure_admin(MemberJoinRequest {
                    username: admin.username.clone(),
                    password: admin.password.clone(),
                    email: admin.email.clone(),
                })
                .await?;
        }

        Ok(state)
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::with_stores(
            config,
            Arc::new(MemoryBoardStore::new()),
            Arc::new(MemoryMemberStore::new()),
            Arc::new(MemoryTravelStore::new()),
            None,
        )
    }

    pub fn with_stores(
        config: AppConfig,
        boards: Arc<dyn BoardStore>,
        members: Arc<dyn MemberStore>,
        travels: Arc<dyn TravelStore>,
        db_pool: Option<Pool<Postgres>>,
    ) -> Self {
        let mut member_service = MemberService::new(members.clone(), config.avatar_dir());
        if config.profile == Profile::Test {
            member_service = member_service.with_bcrypt_cost(4);
        }

        Self {
            boards: BoardService::new(boards),
            members: member_service,
            travels: TravelService::new(travels),
            auth_backend: Backend::new(members),
            db_pool,
            config,
        }
    }
}
