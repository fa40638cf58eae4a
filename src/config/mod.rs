use ini::{Ini, Properties};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "connection.cfg";
pub const DEFAULT_PORT: u16 = 5433;
pub const DEFAULT_SSH_PORT: u16 = 22;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path:?}: {source}. Please make sure it exists, see the README for the format.")]
    Read {
        path: PathBuf,
        source: ini::Error,
    },
    #[error("{0} section missing in config. Please refer to README for details.")]
    MissingSection(&'static str),
    #[error("Key '{key}' missing in section {section}")]
    MissingKey { section: &'static str, key: &'static str },
    #[error("Invalid value '{value}' for key '{key}' in section {section}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// A PostgreSQL wire protocol server.
    Postgres {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
    /// A local SQLite database file.
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    /// Host the tunnel forwards to, as seen from the SSH server.
    pub remote_host: String,
    pub remote_port: u16,
    pub local_port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub database: DatabaseConfig,
    pub ssh: Option<SshConfig>,
}

impl ConnectionConfig {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let database = ini
            .section(Some("DATABASE"))
            .ok_or(ConfigError::MissingSection("DATABASE"))?;
        let database = Section::new("DATABASE", database);

        let database = match database.get_or("driver", "postgres").as_str() {
            "postgres" => DatabaseConfig::Postgres {
                host: database.get("host")?,
                port: database.parse_or("port", DEFAULT_PORT)?,
                user: database.get("user")?,
                password: database.get_or("password", ""),
                database: database.get("database")?,
            },
            "sqlite" => DatabaseConfig::Sqlite {
                path: PathBuf::from(database.get("database")?),
            },
            other => {
                return Err(ConfigError::InvalidValue {
                    section: "DATABASE",
                    key: "driver",
                    value: other.to_string(),
                })
            }
        };

        let ssh = match ini.section(Some("SSH")) {
            Some(ssh) => {
                let ssh = Section::new("SSH", ssh);
                Some(SshConfig {
                    host: ssh.get("host")?,
                    port: ssh.parse_or("ssh_port", DEFAULT_SSH_PORT)?,
                    username: ssh.get("ssh_username")?,
                    password: ssh.get("ssh_password").ok(),
                    remote_host: ssh.get_or("localhost", "localhost"),
                    remote_port: ssh.parse_or("port", DEFAULT_PORT)?,
                    local_port: ssh.parse("local_port")?,
                })
            }
            None => None,
        };

        Ok(Self { database, ssh })
    }
}

struct Section<'a> {
    name: &'static str,
    properties: &'a Properties,
}

impl<'a> Section<'a> {
    fn new(name: &'static str, properties: &'a Properties) -> Self {
        Self { name, properties }
    }

    fn value(&self, key: &str) -> Option<String> {
        self.properties
            .get(key)
            .map(strip_inline_comment)
            .filter(|value| !value.is_empty())
    }

    fn get(&self, key: &'static str) -> Result<String, ConfigError> {
        self.value(key).ok_or(ConfigError::MissingKey {
            section: self.name,
            key,
        })
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        self.value(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T: std::str::FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        match self.value(key) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue {
                    section: self.name,
                    key,
                    value,
                }),
            None => Ok(None),
        }
    }

    fn parse_or<T: std::str::FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        Ok(self.parse(key)?.unwrap_or(default))
    }
}

/// Drops a trailing ` # comment` from a value.
fn strip_inline_comment(value: &str) -> String {
    let end = value
        .char_indices()
        .find(|&(i, c)| c == '#' && value[..i].ends_with(char::is_whitespace))
        .map(|(i, _)| i)
        .unwrap_or_else(|| value.len());
    value[..end].trim().to_string()
}
