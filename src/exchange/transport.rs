//! The request/response pipeline: one HTTP call, one decoded JSON body.

use std::fmt;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{AuthScheme, Config};
use crate::error::{Error, Result};
use crate::logging::{log_request, log_response, v_str, ProfileScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moves one request over the wire and hands back the raw success body.
///
/// Implementations must turn non-success statuses into `Error::Status` and
/// release the response before returning.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: Method, url: Url, body: Option<String>) -> Result<Vec<u8>>;
}

/// Perform the call and decode the body into `R`.
pub async fn perform_request<T, R>(
    transport: &T,
    method: Method,
    url: Url,
    body: Option<String>,
) -> Result<R>
where
    T: Transport + ?Sized,
    R: DeserializeOwned,
{
    let bytes = transport.send(method, url, body).await?;
    serde_json::from_slice(&bytes).map_err(Error::Decode)
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: Client,
    credential: Option<(AuthScheme, String)>,
}

impl HttpTransport {
    pub fn new(cfg: &Config) -> Result<Self> {
        let credential = cfg
            .credential()?
            .map(|(scheme, key)| (scheme.clone(), key.to_string()));
        Ok(Self {
            client: Client::new(),
            credential,
        })
    }

    fn authorize(&self, url: &mut Url) -> Option<(&str, &str)> {
        match &self.credential {
            Some((AuthScheme::Header(name), key)) => Some((name.as_str(), key.as_str())),
            Some((AuthScheme::Query(param), key)) => {
                url.query_pairs_mut().append_pair(param, key);
                None
            }
            Some((AuthScheme::None, _)) | None => None,
        }
    }

    /// reqwest errors print the request URL, which holds the key under query auth.
    fn transport_error(&self, err: reqwest::Error) -> Error {
        match &self.credential {
            Some((AuthScheme::Query(_), _)) => Error::Transport(err.without_url()),
            _ => Error::Transport(err),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: Method, mut url: Url, body: Option<String>) -> Result<Vec<u8>> {
        let path = url.path().to_string();
        let _scope = ProfileScope::with_context(
            "http_call",
            &[("method", v_str(method.as_str())), ("path", v_str(&path))],
        );
        let header = self.authorize(&mut url);
        log_request(method.as_str(), &path, body.is_some());

        let mut req = match method {
            Method::Get => self.client.get(url),
            Method::Post => {
                let body = body.ok_or(Error::MissingBody(method))?;
                self.client
                    .post(url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body)
            }
            Method::Delete => self.client.delete(url),
        };
        if let Some((name, key)) = header {
            req = req.header(name, key);
        }

        let resp = req.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        log_response(method.as_str(), &path, status.as_u16(), bytes.len());

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(bytes.to_vec())
    }
}

/// Serialize a request body, keeping encode failures apart from decode ones.
pub fn encode<B: serde::Serialize>(body: &B) -> Result<String> {
    serde_json::to_string(body).map_err(Error::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatusResponse;

    struct Fixed(&'static str);

    #[async_trait]
    impl Transport for Fixed {
        async fn send(&self, _method: Method, _url: Url, _body: Option<String>) -> Result<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    fn url() -> Url {
        Url::parse("http://localhost/heartbeat").unwrap()
    }

    #[tokio::test]
    async fn test_decodes_body() {
        let s: StatusResponse = perform_request(&Fixed(r#"{"ok":true}"#), Method::Get, url(), None)
            .await
            .unwrap();
        assert!(s.ok);
    }

    #[tokio::test]
    async fn test_decode_error_is_distinct() {
        let err = perform_request::<_, StatusResponse>(&Fixed("<html>"), Method::Get, url(), None)
            .await
            .unwrap_err();
        assert!(err.is_decode());
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_post_without_body_fails_before_io() {
        let transport = HttpTransport::new(&Config::default()).unwrap();
        // Port 9 (discard) is never contacted: the missing body is caught first.
        let url = Url::parse("http://127.0.0.1:9/orders").unwrap();
        let err = transport.send(Method::Post, url, None).await.unwrap_err();
        assert!(matches!(err, Error::MissingBody(Method::Post)));
    }

    #[test]
    fn test_query_auth_appends_key() {
        let cfg = Config::default()
            .with_api_key("k3y")
            .with_auth(AuthScheme::Query("apikey".to_string()));
        let transport = HttpTransport::new(&cfg).unwrap();
        let mut url = url();
        assert!(transport.authorize(&mut url).is_none());
        assert_eq!(url.query(), Some("apikey=k3y"));
    }

    #[test]
    fn test_header_auth_leaves_url_alone() {
        let cfg = Config::default()
            .with_api_key("k3y")
            .with_auth(AuthScheme::Header("X-Api-Key".to_string()));
        let transport = HttpTransport::new(&cfg).unwrap();
        let mut url = url();
        assert_eq!(transport.authorize(&mut url), Some(("X-Api-Key", "k3y")));
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_no_scheme_sends_nothing() {
        let transport = HttpTransport::new(&Config::default().with_api_key("k3y")).unwrap();
        let mut url = url();
        assert!(transport.authorize(&mut url).is_none());
        assert_eq!(url.query(), None);
    }
}
