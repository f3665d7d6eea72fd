// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::error::{Result, ValidationError};
use crate::render::{Notice, Renderer, Slot};
use crate::source::SessionApi;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub email: String,
    #[serde(default)]
    pub last_active: LastActive,
}

/// The server reports either epoch seconds or a preformatted string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum LastActive {
    Epoch(f64),
    Text(String),
}

impl Default for LastActive {
    fn default() -> Self {
        LastActive::Text(String::new())
    }
}

impl fmt::Display for LastActive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastActive::Epoch(secs) => match DateTime::from_timestamp(*secs as i64, 0) {
                Some(at) => write!(f, "{}", at.format("%Y-%m-%d %H:%M:%S UTC")),
                None => write!(f, "{}", secs),
            },
            LastActive::Text(text) if text.is_empty() => write!(f, "unknown"),
            LastActive::Text(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn,
    Rejected,
}

/// Account actions plus the active-user list shown next to them.
pub struct SessionClient<S: SessionApi> {
    api: S,
    current: Option<String>,
    active: Vec<SessionUser>,
}

fn require_credentials(email: &str, password: &str) -> std::result::Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

impl<S: SessionApi> SessionClient<S> {
    pub fn new(api: S) -> Self {
        Self {
            api,
            current: None,
            active: Vec::new(),
        }
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn active(&self) -> &[SessionUser] {
        &self.active
    }

    pub async fn register(&mut self, email: &str, password: &str, ui: &mut dyn Renderer) -> Result<()> {
        let result = match require_credentials(email, password) {
            Ok(()) => self.api.register(email.trim(), password).await,
            Err(e) => Err(e.into()),
        };
        match &result {
            Ok(()) => ui.notice(Notice::success(Slot::Response, format!("Registered {}", email.trim()))),
            Err(e) => ui.notice(Notice::error(Slot::Response, format!("Registration failed: {}", e))),
        }
        result
    }

    /// A refused login is an outcome, not an error.
    pub async fn login(&mut self, email: &str, password: &str, ui: &mut dyn Renderer) -> Result<LoginOutcome> {
        if let Err(e) = require_credentials(email, password) {
            ui.notice(Notice::error(Slot::Response, e.to_string()));
            return Err(e.into());
        }
        let email = email.trim();

        let result = match self.api.login(email, password).await {
            Ok(true) => {
                info!("Logged in as {}", email);
                self.current = Some(email.to_string());
                ui.notice(Notice::success(Slot::Response, format!("Logged in as {}", email)));
                Ok(LoginOutcome::LoggedIn)
            }
            Ok(false) => {
                ui.notice(Notice::error(Slot::Response, "Login failed"));
                Ok(LoginOutcome::Rejected)
            }
            Err(e) => {
                ui.notice(Notice::error(Slot::Response, format!("Login failed: {}", e)));
                Err(e)
            }
        };

        self.refresh_active_users(ui).await;
        result
    }

    /// Logs out `email`, or the current user when none is given.
    pub async fn logout(&mut self, email: Option<&str>, ui: &mut dyn Renderer) -> Result<()> {
        let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => email.to_string(),
            None => match &self.current {
                Some(current) => current.clone(),
                None => {
                    let e = ValidationError::MissingCredentials;
                    ui.notice(Notice::error(Slot::Response, e.to_string()));
                    return Err(e.into());
                }
            },
        };

        let result = self.api.logout(&email).await;
        match &result {
            Ok(()) => {
                if self.current.as_deref() == Some(email.as_str()) {
                    self.current = None;
                }
                ui.notice(Notice::info(Slot::Response, format!("Logged out {}", email)));
            }
            Err(e) => ui.notice(Notice::error(Slot::Response, format!("Logout failed: {}", e))),
        }

        self.refresh_active_users(ui).await;
        result
    }

    /// Renders the current list. On failure the previous list stays.
    pub async fn refresh_active_users(&mut self, ui: &mut dyn Renderer) -> &[SessionUser] {
        match self.api.active_users().await {
            Ok(users) => self.active = users,
            Err(e) => warn!("Could not refresh active users: {}", e),
        }
        ui.active_users(&self.active);
        &self.active
    }
}
