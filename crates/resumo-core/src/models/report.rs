//! Uploaded or drive-linked sales reports.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::{ExtractionResult, OrderOrigins, Product};

/// Where a report's document lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportSource {
    /// A file on the local machine, owned by the report.
    Local { path: PathBuf },
    /// A file in the connected drive folder, referenced by id.
    Drive { file_id: String },
}

/// Analysis lifecycle of a report.
///
/// A report starts unanalyzed and moves to analyzed exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "result", rename_all = "snake_case")]
pub enum ReportState {
    #[default]
    Unanalyzed,
    Analyzed(ExtractionResult),
}

/// One sales report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Timestamp-based id for local files, file id for drive files.
    pub id: String,

    /// Display name (file name).
    pub name: String,

    /// Size in bytes, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Last modification time, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,

    pub source: ReportSource,

    #[serde(default)]
    pub state: ReportState,
}

impl Report {
    /// Create a report for a local file, with an id derived from the current time.
    pub fn local(path: impl Into<PathBuf>, size: Option<u64>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let id = format!("local_{}_{}", Utc::now().timestamp_millis(), name);

        Self {
            id,
            name,
            size,
            modified: None,
            source: ReportSource::Local { path },
            state: ReportState::Unanalyzed,
        }
    }

    /// Create a report for a drive file.
    pub fn drive(file_id: impl Into<String>, name: impl Into<String>) -> Self {
        let file_id = file_id.into();
        Self {
            id: file_id.clone(),
            name: name.into(),
            size: None,
            modified: None,
            source: ReportSource::Drive { file_id },
            state: ReportState::Unanalyzed,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn is_analyzed(&self) -> bool {
        matches!(self.state, ReportState::Analyzed(_))
    }

    /// Extracted products, empty until analyzed.
    pub fn products(&self) -> &[Product] {
        match &self.state {
            ReportState::Analyzed(result) => &result.products,
            ReportState::Unanalyzed => &[],
        }
    }

    /// Origin counts, zero until analyzed.
    pub fn origins(&self) -> OrderOrigins {
        match &self.state {
            ReportState::Analyzed(result) => result.origins,
            ReportState::Unanalyzed => OrderOrigins::default(),
        }
    }

    /// Size formatted for display (e.g. "1.20 MB").
    pub fn display_size(&self) -> String {
        match self.size {
            Some(bytes) => format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0),
            None => "N/A".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::ExtractionMethod;

    #[test]
    fn test_local_report_id() {
        let report = Report::local("/tmp/pedidos_405.pdf", Some(2048));
        assert!(report.id.starts_with("local_"));
        assert!(report.id.ends_with("_pedidos_405.pdf"));
        assert_eq!(report.name, "pedidos_405.pdf");
        assert!(!report.is_analyzed());
        assert!(report.products().is_empty());
    }

    #[test]
    fn test_drive_report_uses_file_id() {
        let report = Report::drive("1AbC", "resumo.pdf");
        assert_eq!(report.id, "1AbC");
        assert_eq!(
            report.source,
            ReportSource::Drive {
                file_id: "1AbC".to_string()
            }
        );
    }

    #[test]
    fn test_analyzed_accessors() {
        let mut report = Report::drive("id", "r.pdf");
        report.state = ReportState::Analyzed(ExtractionResult::new(
            vec![Product::new("CERV", "CX - 1", "1", "1,00", "1,00", "0,010")],
            OrderOrigins::new(1, 1),
            ExtractionMethod::Json,
        ));
        assert!(report.is_analyzed());
        assert_eq!(report.products().len(), 1);
        assert_eq!(report.origins().total_orders(), 2);
    }

    #[test]
    fn test_display_size() {
        let report = Report::drive("id", "r.pdf").with_size(1_258_291);
        assert_eq!(report.display_size(), "1.20 MB");
    }
}
