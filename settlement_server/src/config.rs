use std::env;

use log::*;
use mes_common::parse_boolean_flag;

const DEFAULT_MES_HOST: &str = "127.0.0.1";
const DEFAULT_MES_PORT: u16 = 8360;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The buffer size of each event channel. Settlement flows block on publishing once a subscriber falls this far
    /// behind.
    pub event_buffer_size: usize,
    /// If true, every request is written to the `mes::access_log` log target.
    pub access_log: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MES_HOST.to_string(),
            port: DEFAULT_MES_PORT,
            database_url: String::default(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            access_log: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MES_HOST").ok().unwrap_or_else(|| DEFAULT_MES_HOST.into());
        let port = env::var("MES_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MES_PORT. {e} Using the default, {DEFAULT_MES_PORT}, instead."
                    );
                    DEFAULT_MES_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MES_PORT);
        let database_url = env::var("MES_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MES_DATABASE_URL is not set. Please set it to the URL for the settlement database.");
            String::default()
        });
        let event_buffer_size = env::var("MES_EVENT_BUFFER_SIZE")
            .ok()
            .and_then(|s| {
                s.parse::<usize>()
                    .map_err(|e| {
                        error!(
                            "🪛️ {s} is not a valid value for MES_EVENT_BUFFER_SIZE. {e} Using the default, \
                             {DEFAULT_EVENT_BUFFER_SIZE}, instead."
                        );
                    })
                    .ok()
            })
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        let access_log = parse_boolean_flag(env::var("MES_ACCESS_LOG").ok(), true);
        Self { host, port, database_url, event_buffer_size, access_log }
    }
}
