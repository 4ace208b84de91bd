//! Authenticated site session
//!
//! Logs into the news site with a credential form POST and keeps the
//! resulting cookies for every later listing request.

use crate::config::SiteConfig;
use crate::{ConfigError, HarvestError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Reasons a login attempt is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("the site reported a bad login for '{username}'")]
    BadLogin { username: String },

    #[error("login did not succeed, username '{username}' not shown in the response")]
    UsernameNotShown { username: String },
}

/// Login credentials
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A logged-in, cookie-carrying HTTP session
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    base: Url,
    listing_path: String,
    username: String,
}

/// Builds the cookie-enabled client used for site requests
///
/// The site varies its responses by client, so a browser user agent is sent
/// instead of an identifying one.
pub fn build_site_client(config: &SiteConfig) -> Result<Client, HarvestError> {
    let mut headers = HeaderMap::new();
    let accept = HeaderValue::from_str(&config.accept)
        .map_err(|e| ConfigError::Validation(format!("site.accept is not a valid header: {}", e)))?;
    headers.insert(ACCEPT, accept);

    Ok(Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?)
}

/// Checks a login response body for success
///
/// The body must mention the username and must not carry the bad-login
/// marker.
pub fn check_login_response(
    body: &str,
    username: &str,
    bad_login_marker: &str,
) -> Result<(), AuthError> {
    if body.contains(bad_login_marker) {
        return Err(AuthError::BadLogin {
            username: username.to_string(),
        });
    }
    if !body.contains(username) {
        return Err(AuthError::UsernameNotShown {
            username: username.to_string(),
        });
    }
    Ok(())
}

impl Session {
    /// Logs in and returns the authenticated session
    ///
    /// # Returns
    ///
    /// * `Ok(Session)` - Login accepted
    /// * `Err(HarvestError::Auth)` - Credentials rejected; the run should stop
    /// * `Err(HarvestError::Http)` - The login endpoint could not be reached
    pub async fn login(config: &SiteConfig, credentials: &Credentials) -> Result<Self, HarvestError> {
        let client = build_site_client(config)?;
        let base = Url::parse(&config.base_url)?;
        let login_url = base.join(&config.login_path)?;

        tracing::info!("Logging in as {}", credentials.username);

        // Submit the login form
        let form = [
            ("whence", "news"),
            ("acct", credentials.username.as_str()),
            ("pw", credentials.password.as_str()),
        ];
        let response = client
            .post(login_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|source| HarvestError::Http {
                url: login_url.to_string(),
                source,
            })?;
        let body = response.text().await?;

        // The site answers 200 either way, so check the body
        check_login_response(&body, &credentials.username, &config.bad_login_marker)?;
        tracing::debug!("Login accepted for {}", credentials.username);

        Ok(Self {
            client,
            base,
            listing_path: config.listing_path.clone(),
            username: credentials.username.clone(),
        })
    }

    /// The logged-in user
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Root URL of the site
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Listing page URL for `user`; comments add `comments=t`
    pub fn listing_url(&self, user: &str, comments: bool, page: Option<u32>) -> Result<Url, HarvestError> {
        let mut url = self.base.join(&self.listing_path)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("id", user);
            if comments {
                query.append_pair("comments", "t");
            }
            if let Some(page) = page {
                query.append_pair("p", &page.to_string());
            }
        }
        Ok(url)
    }

    /// Resolves a link found on a site page against the site root
    pub fn resolve(&self, href: &str) -> Result<Url, HarvestError> {
        Ok(self.base.join(href)?)
    }

    /// GETs a page with the session cookies and returns its body
    pub async fn get_text(&self, url: &Url) -> Result<String, HarvestError> {
        let http_err = |source| HarvestError::Http {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?;
        response.text().await.map_err(http_err)
    }
}
