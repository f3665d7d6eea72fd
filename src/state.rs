// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::collections::HashSet;

use crate::article::ArticleRecord;
use crate::doi;
use crate::stats::StatsSnapshot;

/// Records parsed from the last uploaded file. Serves as the local
/// duplicate cache in front of the server check.
#[derive(Debug, Clone, Default)]
pub struct UploadedDataSet {
    records: Vec<ArticleRecord>,
    keys: HashSet<String>,
}

impl UploadedDataSet {
    pub fn new(records: Vec<ArticleRecord>) -> Self {
        let keys = records.iter().map(ArticleRecord::key).collect();
        Self { records, keys }
    }

    pub fn contains(&self, raw_doi: &str) -> bool {
        self.keys.contains(&doi::normalize(raw_doi))
    }

    pub fn records(&self) -> &[ArticleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Everything the client remembers between actions of one session.
#[derive(Debug, Default)]
pub struct ClientState {
    uploaded: UploadedDataSet,
    saved: Vec<ArticleRecord>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploaded(&self) -> &UploadedDataSet {
        &self.uploaded
    }

    pub fn saved(&self) -> &[ArticleRecord] {
        &self.saved
    }

    pub fn replace_uploaded(&mut self, data: UploadedDataSet) {
        self.uploaded = data;
    }

    pub fn record_saved(&mut self, record: ArticleRecord) {
        self.saved.push(record);
    }

    pub fn is_uploaded(&self, raw_doi: &str) -> bool {
        self.uploaded.contains(raw_doi)
    }

    /// Uploaded records first, then the ones saved one by one.
    pub fn all_records(&self) -> impl Iterator<Item = &ArticleRecord> {
        self.uploaded.records().iter().chain(self.saved.iter())
    }

    pub fn local_stats(&self) -> StatsSnapshot {
        let unique: HashSet<String> = self.all_records().map(ArticleRecord::key).collect();
        StatsSnapshot {
            total: (self.uploaded.len() + self.saved.len()) as u64,
            uploaded: self.uploaded.len() as u64,
            saved: self.saved.len() as u64,
            unique: unique.len() as u64,
        }
    }

    pub fn clear(&mut self) {
        self.uploaded = UploadedDataSet::default();
        self.saved.clear();
    }
}
