// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Single-article duplicate checks, bulk file ingestion, statistics and
//! export, wired to a remote source and a renderer.

use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::article::ArticleRecord;
use crate::config::HubConfig;
use crate::doi;
use crate::error::{HubError, Result, ValidationError};
use crate::export::{self, ExportKind};
use crate::form::{ArticleForm, DoiFieldState, FieldEvent};
use crate::ingest::{self, UploadFile};
use crate::render::{Notice, Renderer, Slot};
use crate::source::{with_fallback, CheckResponse, LocalFallbackSource, RemoteSource, Sourced};
use crate::state::ClientState;
use crate::stats::StatsSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Found in the uploaded file; the server was not asked.
    AlreadyUploaded,
    Duplicate(String),
    Saved(String),
    Informational(String),
}

/// What a duplicate check should do before any request is made.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckPlan {
    ShortCircuit(CheckOutcome),
    Submit(ArticleRecord),
}

pub fn plan_check(form: &ArticleForm, state: &ClientState) -> std::result::Result<CheckPlan, ValidationError> {
    doi::validate(&form.doi)?;
    if state.is_uploaded(&form.doi) {
        return Ok(CheckPlan::ShortCircuit(CheckOutcome::AlreadyUploaded));
    }
    Ok(CheckPlan::Submit(form.to_record()))
}

/// Folds the server's answer into the state. Only `success` keeps the record.
pub fn apply_check(state: &mut ClientState, record: ArticleRecord, response: &CheckResponse) -> CheckOutcome {
    match response.status.as_str() {
        "duplicate" => CheckOutcome::Duplicate(response.message.clone()),
        "success" => {
            state.record_saved(record);
            CheckOutcome::Saved(response.message.clone())
        }
        _ => CheckOutcome::Informational(response.message.clone()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
    pub valid: usize,
    pub added: u64,
    pub duplicates: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Server(PathBuf),
    Local(PathBuf),
}

impl ExportOutcome {
    pub fn path(&self) -> &PathBuf {
        match self {
            ExportOutcome::Server(path) | ExportOutcome::Local(path) => path,
        }
    }
}

pub struct Hub<R: RemoteSource, V: Renderer> {
    remote: R,
    renderer: V,
    state: ClientState,
    form: ArticleForm,
    config: HubConfig,
}

impl<R: RemoteSource, V: Renderer> Hub<R, V> {
    pub fn new(remote: R, renderer: V, config: HubConfig) -> Self {
        Self {
            remote,
            renderer,
            state: ClientState::new(),
            form: ArticleForm::default(),
            config,
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn form(&self) -> &ArticleForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ArticleForm {
        &mut self.form
    }

    pub fn renderer(&self) -> &V {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut V {
        &mut self.renderer
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Re-evaluates the DOI field and shows the matching feedback.
    pub fn doi_event(&mut self, event: FieldEvent) -> DoiFieldState {
        let field = DoiFieldState::evaluate(&self.form.doi, &self.state);
        let feedback = field.feedback(event);
        if feedback.dismiss_errors {
            self.renderer.dismiss_errors(Slot::Response);
        }
        self.renderer.field(&feedback);
        field
    }

    pub async fn check_duplicate(&mut self) -> Result<CheckOutcome> {
        let record = match plan_check(&self.form, &self.state) {
            Ok(CheckPlan::Submit(record)) => record,
            Ok(CheckPlan::ShortCircuit(outcome)) => {
                self.renderer.notice(Notice::error(
                    Slot::Response,
                    "ALREADY DOWNLOADED: This DOI exists in your uploaded CSV/Excel file. No need to save again.",
                ));
                return Ok(outcome);
            }
            Err(e) => {
                self.renderer.notice(Notice::error(Slot::Response, e.to_string()));
                return Err(e.into());
            }
        };

        self.renderer.loading(true);
        self.renderer.notice(Notice::info(Slot::Response, "Analyzing article data..."));
        let response = self.remote.check_article(&record).await;
        self.renderer.loading(false);

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                self.renderer.notice(Notice::error(Slot::Response, format!("Error: {}", e)));
                return Err(e);
            }
        };

        let outcome = apply_check(&mut self.state, record, &response);
        match &outcome {
            CheckOutcome::Duplicate(message) => {
                self.renderer.notice(Notice::error(Slot::Response, format!("Duplicate Found: {}", message)));
            }
            CheckOutcome::Saved(message) => {
                info!("Saved {}", self.form.doi.trim());
                self.renderer.notice(Notice::success(
                    Slot::Response,
                    format!(
                        "Successfully Saved: {}\nTotal articles in database: {}",
                        message,
                        self.state.saved().len()
                    ),
                ));
                self.renderer.stats(&self.state.local_stats());
            }
            CheckOutcome::Informational(message) => {
                self.renderer.notice(Notice::info(Slot::Response, message.clone()));
            }
            CheckOutcome::AlreadyUploaded => {}
        }

        if let Some(stats) = response.stats {
            self.renderer.stats(&stats.resolve(&self.state.local_stats()));
        }

        if matches!(outcome, CheckOutcome::Saved(_)) {
            tokio::time::sleep(self.config.form_clear_delay()).await;
            self.form.clear();
        }
        Ok(outcome)
    }

    /// Validates and parses `file`, keeps the valid rows as the local
    /// duplicate cache and sends file and rows to the server.
    pub async fn upload_file(&mut self, file: Option<UploadFile>) -> Result<UploadSummary> {
        let result = self.try_upload(file).await;
        if let Err(e) = &result {
            self.renderer.notice(Notice::error(Slot::FileResponse, format!("Upload Error: {}", e)));
            self.renderer.progress(None);
        }
        result
    }

    async fn try_upload(&mut self, file: Option<UploadFile>) -> Result<UploadSummary> {
        let file = file.ok_or(ValidationError::NoFileSelected)?;

        self.renderer.progress(Some(10));
        self.renderer.notice(Notice::info(Slot::FileResponse, "Processing file... Please wait."));
        let data = ingest::ingest(&file, self.config.max_upload_bytes(), self.config.flag_policy)?;
        self.renderer.progress(Some(30));
        self.renderer.progress(Some(50));

        let valid = data.len();
        self.state.replace_uploaded(data);
        self.renderer.progress(Some(70));

        let response = self
            .remote
            .upload_file(&file, self.state.uploaded().records())
            .await?;
        self.renderer.progress(Some(90));
        self.renderer.progress(Some(100));

        let summary = UploadSummary {
            valid,
            added: response.added.unwrap_or(valid as u64),
            duplicates: response.duplicates.unwrap_or(0),
        };
        info!(
            "Uploaded {}: {} valid, {} added, {} duplicates",
            file.name, summary.valid, summary.added, summary.duplicates
        );

        self.renderer.notice(Notice::success(
            Slot::FileResponse,
            format!(
                "File Processing Complete!\nValid entries found: {}\nSuccessfully processed: {} articles\nDuplicates detected: {} articles\nReady for duplicate checking!",
                summary.valid, summary.added, summary.duplicates
            ),
        ));

        let local = self.state.local_stats();
        self.renderer.stats(&local);
        if let Some(stats) = response.stats {
            self.renderer.stats(&stats.resolve(&local));
        }
        self.renderer.progress(None);
        Ok(summary)
    }

    /// Reads `file` into the local duplicate cache without sending it to
    /// the server. Returns the number of valid rows.
    pub fn load_local_cache(&mut self, file: &UploadFile) -> Result<usize> {
        let data = ingest::ingest(file, self.config.max_upload_bytes(), self.config.flag_policy)?;
        let valid = data.len();
        debug!("Loaded {} DOIs from {} as the local cache", valid, file.name);
        self.state.replace_uploaded(data);
        self.renderer.stats(&self.state.local_stats());
        Ok(valid)
    }

    /// Server counters, or local ones when the server fails. Never errors.
    pub async fn show_stats(&mut self) -> StatsSnapshot {
        self.renderer.loading(true);
        let local = self.state.local_stats();
        let sourced = with_fallback(self.remote.stats(), || {
            LocalFallbackSource::new(&self.state).stats()
        })
        .await;
        self.renderer.loading(false);

        let stats = match sourced {
            Ok(sourced) => {
                if sourced.is_fallback() {
                    self.renderer.notice(Notice::info(
                        Slot::FileResponse,
                        "Using local statistics. Server connection failed.",
                    ));
                }
                sourced.into_value().resolve(&local)
            }
            Err(_) => local,
        };
        self.renderer.stats(&stats);
        stats
    }

    /// Saves the server's CSV dump, or a CSV of local records when the
    /// server fails.
    pub async fn download_database(&mut self) -> Result<ExportOutcome> {
        self.renderer.notice(Notice::info(Slot::FileResponse, "Preparing database export..."));
        self.renderer.loading(true);
        let sourced = with_fallback(self.remote.export(), || {
            LocalFallbackSource::new(&self.state).export()
        })
        .await;
        self.renderer.loading(false);

        let result = match sourced {
            Ok(Sourced::Remote(bytes)) => self.write_export(ExportKind::Server, &bytes).await,
            Ok(Sourced::Fallback { value, cause }) => {
                debug!("Export fell back to local data: {}", cause);
                self.write_export(ExportKind::Local, &value).await
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(ExportOutcome::Server(path)) => self.renderer.notice(Notice::success(
                Slot::FileResponse,
                format!("Database exported successfully!\nFile saved to {}", path.display()),
            )),
            Ok(ExportOutcome::Local(path)) => self.renderer.notice(Notice::success(
                Slot::FileResponse,
                format!("Local data exported successfully!\nFile saved to {}", path.display()),
            )),
            Err(HubError::NothingToExport) => self
                .renderer
                .notice(Notice::error(Slot::FileResponse, HubError::NothingToExport.to_string())),
            Err(e) => self
                .renderer
                .notice(Notice::error(Slot::FileResponse, format!("Export Error: {}", e))),
        }
        result
    }

    async fn write_export(&self, kind: ExportKind, bytes: &[u8]) -> Result<ExportOutcome> {
        let filename = export::export_filename(kind, Utc::now());
        let path = export::save(&self.config.export_dir, &filename, bytes).await?;
        Ok(match kind {
            ExportKind::Server => ExportOutcome::Server(path),
            ExportKind::Local => ExportOutcome::Local(path),
        })
    }

    /// Forgets uploaded and saved records.
    pub fn clear_all(&mut self) {
        self.state.clear();
        self.renderer.stats(&self.state.local_stats());
        self.renderer.notice(Notice::info(Slot::FileResponse, "All local data cleared."));
    }
}
