use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

pub const BIND_ADDRESS_VAR: &str = "GPS_LOG_BIND_ADDRESS";
pub const MAX_UPLOAD_BYTES_VAR: &str = "GPS_LOG_MAX_UPLOAD_BYTES";

const DEFAULT_BIND_ADDRESS: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub bind_address: SocketAddr,
    /// Upper bound for a whole upload request, multipart framing included.
    pub max_upload_bytes: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(DEFAULT_BIND_ADDRESS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl WebConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Missing or
    /// unparseable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            bind_address: parse_or(&lookup, BIND_ADDRESS_VAR, defaults.bind_address),
            max_upload_bytes: parse_or(
                &lookup,
                MAX_UPLOAD_BYTES_VAR,
                defaults.max_upload_bytes,
            ),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(why) => {
            log::warn!(
                "ignoring {}={:?} ({}), using {} instead.",
                key,
                raw,
                why,
                default
            );
            default
        }
    }
}
