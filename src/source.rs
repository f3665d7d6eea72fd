// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Where answers come from: the hub server first, this session's own data
//! when the server cannot be reached.

#![allow(async_fn_in_trait)]

use serde::Deserialize;
use std::future::Future;
use tracing::warn;

use crate::article::ArticleRecord;
use crate::error::{HubError, Result};
use crate::export;
use crate::ingest::UploadFile;
use crate::session::SessionUser;
use crate::state::ClientState;
use crate::stats::{StatsPayload, StatsSnapshot};

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CheckResponse {
    pub status: String,
    pub message: String,
    pub stats: Option<StatsPayload>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct UploadResponse {
    pub added: Option<u64>,
    pub duplicates: Option<u64>,
    pub stats: Option<StatsPayload>,
}

/// Article, statistics and export endpoints of the hub.
pub trait RemoteSource {
    async fn check_article(&self, record: &ArticleRecord) -> Result<CheckResponse>;
    async fn upload_file(&self, file: &UploadFile, rows: &[ArticleRecord]) -> Result<UploadResponse>;
    async fn stats(&self) -> Result<StatsPayload>;
    async fn export(&self) -> Result<Vec<u8>>;
}

/// Account endpoints of the hub.
pub trait SessionApi {
    async fn register(&self, email: &str, password: &str) -> Result<()>;
    /// `Ok(false)` when the server answered but refused the credentials.
    async fn login(&self, email: &str, password: &str) -> Result<bool>;
    async fn logout(&self, email: &str) -> Result<()>;
    async fn active_users(&self) -> Result<Vec<SessionUser>>;
}

/// Answers derived from the records held in this session.
pub struct LocalFallbackSource<'a> {
    state: &'a ClientState,
}

impl<'a> LocalFallbackSource<'a> {
    pub fn new(state: &'a ClientState) -> Self {
        Self { state }
    }

    pub fn stats(&self) -> Result<StatsPayload> {
        Ok(self.state.local_stats().into())
    }

    pub fn export(&self) -> Result<Vec<u8>> {
        export::render_csv(self.state.all_records())
    }
}

#[derive(Debug)]
pub enum Sourced<T> {
    Remote(T),
    Fallback { value: T, cause: HubError },
}

impl<T> Sourced<T> {
    pub fn into_value(self) -> T {
        match self {
            Sourced::Remote(value) | Sourced::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Sourced::Fallback { .. })
    }
}

/// Runs the remote request and, if it fails for any reason, the local
/// fallback. The fallback's own error wins over the remote one.
pub async fn with_fallback<T, Fut, F>(remote: Fut, fallback: F) -> Result<Sourced<T>>
where
    Fut: Future<Output = Result<T>>,
    F: FnOnce() -> Result<T>,
{
    match remote.await {
        Ok(value) => Ok(Sourced::Remote(value)),
        Err(cause) => {
            warn!("Server request failed, using local data: {}", cause);
            let value = fallback()?;
            Ok(Sourced::Fallback { value, cause })
        }
    }
}
