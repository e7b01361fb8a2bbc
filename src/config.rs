//! Process configuration, from the command line.

use std::net::SocketAddr;

use clap::Parser;

use crate::error::Error;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_TOKEN: &str = "my-secret-token";

#[derive(Clone, Debug, Parser)]
#[command(name = "user-api", version, about = "In-memory user management API")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Shared secret expected as `Authorization: Bearer <token>`.
    #[arg(long, default_value = DEFAULT_TOKEN)]
    pub token: String,

    /// `tracing` filter directive; `RUST_LOG` takes precedence when set.
    #[arg(long, default_value = "info")]
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            token: DEFAULT_TOKEN.to_owned(),
            log_filter: "info".to_owned(),
        }
    }
}

impl Config {
    /// The token ends up verbatim in a header comparison, so it must be
    /// non-empty and free of whitespace.
    pub fn validate(&self) -> Result<(), Error> {
        if self.token.is_empty() {
            return Err(Error::Config("token must not be empty".into()));
        }
        if self.token.chars().any(char::is_whitespace) {
            return Err(Error::Config("token must not contain whitespace".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_cli_defaults() {
        let parsed = Config::parse_from(["user-api"]);
        let default = Config::default();
        assert_eq!(parsed.bind, default.bind);
        assert_eq!(parsed.token, default.token);
        assert_eq!(parsed.log_filter, default.log_filter);
        assert_eq!(parsed.bind.to_string(), DEFAULT_BIND);
    }

    #[test]
    fn flags_override_defaults() {
        let c = Config::parse_from(["user-api", "--bind", "0.0.0.0:8080", "--token", "t0k"]);
        assert_eq!(c.bind.port(), 8080);
        assert_eq!(c.token, "t0k");
    }

    #[test]
    fn rejects_unusable_tokens() {
        let mut c = Config::default();
        assert!(c.validate().is_ok());

        c.token = String::new();
        assert!(matches!(c.validate(), Err(Error::Config(_))));

        c.token = "two words".into();
        assert!(matches!(c.validate(), Err(Error::Config(_))));
    }
}
