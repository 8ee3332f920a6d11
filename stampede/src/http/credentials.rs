use std::fmt;
use thiserror::Error;
use url::Url;

pub const API_BASE_URL: &str = "API_BASE_URL";
pub const TEST_ACCESS_TOKEN: &str = "TEST_ACCESS_TOKEN";
pub const TEST_USER_ID: &str = "TEST_USER_ID";
pub const TEST_USER_ACCOUNT_ID: &str = "TEST_USER_ACCOUNT_ID";
pub const TEST_USER_EMAIL: &str = "TEST_USER_EMAIL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("No value found for {0}; it is required to authenticate requests")]
    Missing(&'static str),

    #[error("Invalid base URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URL scheme {0:?}; expected http or https")]
    UnsupportedScheme(String),
}

/// Target API and the identity requests are made as.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    base_url: Url,
    access_token: String,
    pub user_id: Option<String>,
    pub account_id: Option<String>,
    pub email: Option<String>,
}

impl Credentials {
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, CredentialsError> {
        if base_url.trim().is_empty() {
            return Err(CredentialsError::Missing(API_BASE_URL));
        }
        if access_token.trim().is_empty() {
            return Err(CredentialsError::Missing(TEST_ACCESS_TOKEN));
        }

        let parsed = Url::parse(base_url).map_err(|source| CredentialsError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CredentialsError::UnsupportedScheme(
                parsed.scheme().to_string(),
            ));
        }

        Ok(Self {
            base_url: parsed,
            access_token: access_token.trim().to_string(),
            user_id: None,
            account_id: None,
            email: None,
        })
    }

    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self, CredentialsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CredentialsError> {
        let base_url = lookup(API_BASE_URL).ok_or(CredentialsError::Missing(API_BASE_URL))?;
        let token =
            lookup(TEST_ACCESS_TOKEN).ok_or(CredentialsError::Missing(TEST_ACCESS_TOKEN))?;

        let non_empty = |key| lookup(key).filter(|v: &String| !v.is_empty());
        let mut credentials = Self::new(&base_url, &token)?;
        credentials.user_id = non_empty(TEST_USER_ID);
        credentials.account_id = non_empty(TEST_USER_ACCOUNT_ID);
        credentials.email = non_empty(TEST_USER_EMAIL);
        Ok(credentials)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Resolve a resource path against the base URL.
    ///
    /// The path is appended to the base URL as-is, so a base of `http://host/v1` and a path of
    /// `/api/notes/1` give `http://host/v1/api/notes/1`.
    pub fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("account_id", &self.account_id)
            .field("email", &self.email)
            .finish()
    }
}
