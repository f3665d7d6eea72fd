// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tracing::debug;

use crate::article::{ArticleRecord, FlagValue};
use crate::config::{CheckEncoding, HubConfig};
use crate::error::{HubError, Result};
use crate::ingest::UploadFile;
use crate::session::SessionUser;
use crate::source::{CheckResponse, RemoteSource, SessionApi, UploadResponse};
use crate::stats::StatsPayload;

/// HTTP client for the hub server.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    config: HubConfig,
}

impl HttpApi {
    pub fn new(config: &HubConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("gelatin-hub/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }
}

// Turns a non-2xx answer into an error carrying the body text.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error body".to_string());
    Err(HubError::Status { status, body })
}

fn flag_field(value: &FlagValue) -> String {
    match value {
        FlagValue::Flag(flag) => flag.to_string(),
        FlagValue::Text(text) => text.clone(),
    }
}

impl RemoteSource for HttpApi {
    async fn check_article(&self, record: &ArticleRecord) -> Result<CheckResponse> {
        let url = self.url("check_article");
        debug!("POST {} doi={}", url, record.doi);

        let request = self.client.post(&url);
        let request = match self.config.check_encoding {
            CheckEncoding::Json => request.json(record),
            CheckEncoding::Form => request.form(&[
                ("doi", record.doi.clone()),
                ("title", record.title.clone()),
                ("protein", record.protein.clone()),
                ("hardness", flag_field(&record.hardness)),
                ("whc", flag_field(&record.whc)),
                ("timestamp", record.timestamp.clone().unwrap_or_default()),
            ]),
        };

        let response = ensure_success(request.send().await?).await?;
        Ok(response.json::<CheckResponse>().await?)
    }

    async fn upload_file(&self, file: &UploadFile, rows: &[ArticleRecord]) -> Result<UploadResponse> {
        let url = self.url("upload_file");
        debug!("POST {} file={} rows={}", url, file.name, rows.len());

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(file.content_type())?;
        let form = Form::new()
            .part("file", part)
            .text("processed_data", serde_json::to_string(rows)?);

        let response = ensure_success(self.client.post(&url).multipart(form).send().await?).await?;
        Ok(response.json::<UploadResponse>().await?)
    }

    async fn stats(&self) -> Result<StatsPayload> {
        let url = self.url("stats");
        debug!("GET {}", url);

        let response = ensure_success(self.client.get(&url).send().await?).await?;
        Ok(response.json::<StatsPayload>().await?)
    }

    async fn export(&self) -> Result<Vec<u8>> {
        let url = self.url("export");
        debug!("GET {}", url);

        let response = ensure_success(self.client.get(&url).send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

impl SessionApi for HttpApi {
    async fn register(&self, email: &str, password: &str) -> Result<()> {
        let url = self.url("register");
        debug!("POST {} email={}", url, email);

        let request = self.client.post(&url).form(&[("email", email), ("password", password)]);
        ensure_success(request.send().await?).await?;
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<bool> {
        let url = self.url("login");
        debug!("POST {} email={}", url, email);

        let response = self
            .client
            .post(&url)
            .form(&[("email", email), ("password", password)])
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    async fn logout(&self, email: &str) -> Result<()> {
        let url = self.url("logout");
        debug!("POST {} email={}", url, email);

        let request = self.client.post(&url).form(&[("email", email)]);
        ensure_success(request.send().await?).await?;
        Ok(())
    }

    async fn active_users(&self) -> Result<Vec<SessionUser>> {
        let url = self.url("active_users");
        debug!("GET {}", url);

        let response = ensure_success(self.client.get(&url).send().await?).await?;
        Ok(response.json::<Vec<SessionUser>>().await?)
    }
}
