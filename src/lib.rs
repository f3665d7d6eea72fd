// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Client for the protein gelatin research hub.
//!
//! Records literature entries (DOI, title, protein type, gel hardness and
//! water holding capacity flags), checks them for duplicates against the
//! hub server and a locally uploaded spreadsheet, ingests CSV files in
//! bulk, shows statistics, exports the database and manages accounts.
//!
//! Statistics and export fall back to the data held in the current session
//! when the server cannot be reached.

pub mod api;
pub mod article;
pub mod config;
pub mod doi;
pub mod error;
pub mod export;
pub mod form;
pub mod hub;
pub mod ingest;
pub mod render;
pub mod session;
pub mod shell;
pub mod source;
pub mod state;
pub mod stats;

pub use api::HttpApi;
pub use article::{ArticleRecord, FlagPolicy, FlagValue};
pub use config::{CheckEncoding, HubConfig};
pub use error::{HubError, Result, ValidationError};
pub use hub::{CheckOutcome, ExportOutcome, Hub, UploadSummary};
pub use render::{ConsoleRenderer, Recorder, Renderer};
pub use session::{LoginOutcome, SessionClient, SessionUser};
