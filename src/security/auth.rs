//! Shared-secret token check.
//!
//! Regular callers sign with `SHA-512(account + login + salt)`. The admin
//! login signs with `SHA-512(YYYYMMDDHH + admin_secret)` in local time, so an
//! admin token is valid from the top of one hour to the top of the next.

use chrono::{Local, NaiveDateTime};
use sha2::{Digest, Sha512};

use crate::config::AuthConfig;
use crate::requests::MethodRequest;

const ADMIN_STAMP_FORMAT: &str = "%Y%m%d%H";

#[derive(Debug, Clone)]
pub struct Authenticator {
    admin_login: String,
    admin_secret: String,
    salt: String,
}

impl Authenticator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            admin_login: config.admin_login.clone(),
            admin_secret: config.admin_secret.clone(),
            salt: config.salt.clone(),
        }
    }

    pub fn admin_login(&self) -> &str {
        &self.admin_login
    }

    /// The token a caller must present at `now`.
    pub fn token_for(&self, account: Option<&str>, login: &str, now: NaiveDateTime) -> String {
        let material = if login == self.admin_login {
            format!("{}{}", now.format(ADMIN_STAMP_FORMAT), self.admin_secret)
        } else {
            format!("{}{}{}", account.unwrap_or_default(), login, self.salt)
        };
        hex::encode(Sha512::digest(material.as_bytes()))
    }

    /// Pure predicate over the caller's credentials.
    pub fn check_at(
        &self,
        account: Option<&str>,
        login: &str,
        token: &str,
        now: NaiveDateTime,
    ) -> bool {
        self.token_for(account, login, now) == token
    }

    pub fn check(&self, request: &MethodRequest) -> bool {
        self.check_at(
            request.account.as_deref(),
            &request.login,
            &request.token,
            Local::now().naive_local(),
        )
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}
