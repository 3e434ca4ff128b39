use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_BASE: &str = "https://api.stockfighter.io/ob/api";

/// How the API key is attached to outgoing requests.
///
/// The exchange has never pinned down a header name for us, so nothing is sent
/// unless a scheme is chosen explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthScheme {
    #[default]
    None,
    /// Send the key as the value of this header.
    Header(String),
    /// Append the key as this query parameter.
    Query(String),
}

impl FromStr for AuthScheme {
    type Err = Error;

    /// Accepts `none`, `header:<NAME>` or `query:<PARAM>`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(AuthScheme::None);
        }
        let (kind, name) = s
            .split_once(':')
            .ok_or_else(|| Error::Config(format!("bad auth scheme: {}", s)))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Config(format!("auth scheme {} needs a name", kind)));
        }
        match kind.trim().to_lowercase().as_str() {
            "header" => Ok(AuthScheme::Header(name.to_string())),
            "query" => Ok(AuthScheme::Query(name.to_string())),
            other => Err(Error::Config(format!("unknown auth scheme: {}", other))),
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::None => f.write_str("none"),
            AuthScheme::Header(name) => write!(f, "header:{}", name),
            AuthScheme::Query(name) => write!(f, "query:{}", name),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: Option<String>,
    pub auth: AuthScheme,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("auth", &self.auth)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE.to_string(),
            api_key: None,
            auth: AuthScheme::None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: std::env::var("STOCKFIGHTER_BASE").unwrap_or_else(|_| DEFAULT_BASE.to_string()),
            api_key: std::env::var("STOCKFIGHTER_API_KEY").ok().filter(|k| !k.is_empty()),
            auth: match std::env::var("STOCKFIGHTER_AUTH") {
                Ok(v) => v.parse()?,
                Err(_) => AuthScheme::None,
            },
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = base.into();
        self
    }

    pub fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    pub fn base(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)?;
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!("base url cannot hold paths: {}", self.base_url)));
        }
        Ok(url)
    }

    /// The key to attach, if the configured scheme wants one.
    pub fn credential(&self) -> Result<Option<(&AuthScheme, &str)>> {
        match (&self.auth, self.api_key.as_deref()) {
            (AuthScheme::None, _) => Ok(None),
            (scheme, Some(key)) => Ok(Some((scheme, key))),
            (scheme, None) => Err(Error::Config(format!("auth scheme {} set but no API key", scheme))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_scheme() {
        assert_eq!("none".parse::<AuthScheme>().unwrap(), AuthScheme::None);
        assert_eq!("".parse::<AuthScheme>().unwrap(), AuthScheme::None);
        assert_eq!(
            "header:X-Api-Key".parse::<AuthScheme>().unwrap(),
            AuthScheme::Header("X-Api-Key".to_string())
        );
        assert_eq!(
            "QUERY: apikey".parse::<AuthScheme>().unwrap(),
            AuthScheme::Query("apikey".to_string())
        );
        assert!("header:".parse::<AuthScheme>().is_err());
        assert!("cookie:session".parse::<AuthScheme>().is_err());
        assert!("bearer".parse::<AuthScheme>().is_err());
    }

    #[test]
    fn test_auth_scheme_display_roundtrips() {
        let scheme = AuthScheme::Header("X-Key".to_string());
        assert_eq!(scheme.to_string().parse::<AuthScheme>().unwrap(), scheme);
    }

    #[test]
    fn test_credential_requires_key() {
        let cfg = Config::default().with_auth(AuthScheme::Header("X-Key".to_string()));
        assert!(cfg.credential().is_err());

        let cfg = cfg.with_api_key("abc");
        let (scheme, key) = cfg.credential().unwrap().unwrap();
        assert_eq!(scheme, &AuthScheme::Header("X-Key".to_string()));
        assert_eq!(key, "abc");
    }

    #[test]
    fn test_key_not_sent_without_scheme() {
        let cfg = Config::default().with_api_key("abc");
        assert!(cfg.credential().unwrap().is_none());
    }

    #[test]
    fn test_debug_hides_key() {
        let cfg = Config::default().with_api_key("super-secret");
        assert!(!format!("{:?}", cfg).contains("super-secret"));
    }

    #[test]
    fn test_base_rejects_non_base_url() {
        let cfg = Config::default().with_base_url("mailto:ops@example.com");
        assert!(cfg.base().is_err());
        assert!(Config::default().base().is_ok());
    }
}
