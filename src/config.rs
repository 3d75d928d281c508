use crate::error::{BadEnvVarSnafu, ParsePortSnafu, UnknownStoreKindSnafu, VirtueResult};
use dotenvy::var;
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use std::sync::Arc;

pub mod timetable;

use timetable::TimetableSource;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_ip: Arc<str>,
    store_kind: StoreKind,
    db_config: Option<Arc<DbConfig>>,
    timetable_source: Arc<TimetableSource>,
}

impl RuntimeConfiguration {
    pub fn new() -> VirtueResult<Self> {
        let server_ip = var("VIRTUE_SERVER_IP").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        let store_kind = match var("VIRTUE_STORE").ok().as_deref() {
            None | Some("postgres") => StoreKind::Postgres,
            Some("memory") => StoreKind::Memory,
            Some(found) => return UnknownStoreKindSnafu { found }.fail(),
        };
        let db_config = match store_kind {
            StoreKind::Postgres => Some(Arc::new(DbConfig::new()?)),
            StoreKind::Memory => None,
        };

        let timetable_source = TimetableSource::from_setting(
            var("TIMETABLE_SOURCE").unwrap_or_else(|_| "timetable.json".to_string()),
        );

        Ok(Self {
            server_ip: server_ip.into(),
            store_kind,
            db_config,
            timetable_source: Arc::new(timetable_source),
        })
    }

    ///config for running without a database, pointed at a given timetable
    pub fn in_memory(timetable_source: TimetableSource) -> Self {
        Self {
            server_ip: "127.0.0.1:8080".into(),
            store_kind: StoreKind::Memory,
            db_config: None,
            timetable_source: Arc::new(timetable_source),
        }
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }

    pub const fn store_kind(&self) -> StoreKind {
        self.store_kind
    }

    pub fn db_config(&self) -> Option<Arc<DbConfig>> {
        self.db_config.clone()
    }

    pub fn timetable_source(&self) -> Arc<TimetableSource> {
        self.timetable_source.clone()
    }
}

#[derive(Debug)]
pub struct DbConfig {
    user: String,
    password: SecretString,
    path: String,
    port: u16,
    database: String,
}

impl DbConfig {
    pub fn new() -> VirtueResult<Self> {
        let get_env_var = |name| var(name).context(BadEnvVarSnafu { name });

        Ok(Self {
            user: get_env_var("DB_USER")?,
            password: SecretString::from(get_env_var("DB_PASSWORD")?),
            path: get_env_var("DB_PATH")?,
            port: get_env_var("DB_PORT")?.parse().context(ParsePortSnafu)?,
            database: get_env_var("DB_NAME")?,
        })
    }

    pub fn get_db_path(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.path,
            self.port,
            self.database
        )
    }
}
