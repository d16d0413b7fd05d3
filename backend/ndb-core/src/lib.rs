pub mod channel;
pub mod config;
pub mod discovery;
pub mod error;
pub mod protocol;
pub mod session;

#[cfg(test)]
mod tests;

pub const INSPECTOR_HOSTNAME: &str = "127.0.0.1";
pub const INSPECTOR_PORT: u16 = 9229;
pub const INSPECTOR_DISCOVERY_PATH: &str = "json";
pub const INSPECTOR_DISCOVERY_URL: &str = const_format::concatcp!(
    "http://",
    INSPECTOR_HOSTNAME,
    ":",
    INSPECTOR_PORT,
    "/",
    INSPECTOR_DISCOVERY_PATH
);

/// Prefix of script URLs that belong to the runtime itself rather than the
/// program being debugged.
pub const INTERNAL_SCRIPT_PREFIX: &str = "node:internal";
