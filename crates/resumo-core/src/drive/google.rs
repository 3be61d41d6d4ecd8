//! Google Drive v3 file source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{DriveError, TransportError};
use crate::models::config::DriveConfig;
use crate::models::report::Report;

use super::{RemoteFileSource, TokenProvider, with_reauth};

const LISTING_FIELDS: &str = "files(id,name,size,modifiedTime,webViewLink)";

/// Drive listing response.
#[derive(Debug, Default, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    /// Drive sends sizes as decimal strings.
    size: Option<String>,
    modified_time: Option<DateTime<Utc>>,
}

impl From<DriveFile> for Report {
    fn from(file: DriveFile) -> Self {
        let mut report = Report::drive(file.id, file.name);
        if let Some(size) = file.size.and_then(|s| s.parse().ok()) {
            report = report.with_size(size);
        }
        if let Some(modified) = file.modified_time {
            report = report.with_modified(modified);
        }
        report
    }
}

/// Search expression for the PDFs of a folder.
fn listing_query(folder_id: &str) -> String {
    format!("'{folder_id}' in parents and mimeType='application/pdf' and trashed=false")
}

/// Map a non-success status of a request about `resource`.
fn status_error(status: reqwest::StatusCode, resource: &str, body: String) -> DriveError {
    match status.as_u16() {
        401 => DriveError::AuthExpired,
        404 => DriveError::NotFound(resource.to_string()),
        code => DriveError::Transport(TransportError::from_status(code, body)),
    }
}

fn network_error(e: reqwest::Error) -> DriveError {
    DriveError::Transport(TransportError::Network(e.to_string()))
}

/// Progress callback: bytes so far and total size when known.
pub type ProgressFn<'a> = &'a (dyn Fn(u64, Option<u64>) + Send + Sync);

/// Drive v3 REST client authenticated with a bearer token.
pub struct GoogleDriveClient<P: TokenProvider> {
    client: reqwest::Client,
    base_url: String,
    tokens: P,
}

impl<P: TokenProvider> GoogleDriveClient<P> {
    pub fn new(tokens: P) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "https://www.googleapis.com/drive/v3".to_string(),
            tokens,
        }
    }

    pub fn from_config(config: &DriveConfig, tokens: P) -> Self {
        Self::new(tokens).with_base_url(&config.base_url)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn list_once(&self, folder_id: &str, token: &str) -> Result<Vec<Report>, DriveError> {
        let response = self
            .client
            .get(format!("{}/files", self.base_url))
            .bearer_auth(token)
            .query(&[
                ("q", listing_query(folder_id).as_str()),
                ("fields", LISTING_FIELDS),
                ("orderBy", "modifiedTime desc"),
            ])
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, folder_id, body));
        }

        let list: FileList = response
            .json()
            .await
            .map_err(|e| DriveError::InvalidResponse(e.to_string()))?;

        Ok(list.files.into_iter().map(Report::from).collect())
    }

    async fn download_once(
        &self,
        file_id: &str,
        token: &str,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<Vec<u8>, DriveError> {
        let response = self
            .client
            .get(format!("{}/files/{}", self.base_url, file_id))
            .bearer_auth(token)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, file_id, body));
        }

        let total = response.content_length();
        let mut data = Vec::with_capacity(total.unwrap_or(0) as usize);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(network_error)?;
            data.extend_from_slice(&chunk);
            if let Some(progress) = progress {
                progress(data.len() as u64, total);
            }
        }

        debug!("Downloaded {} bytes for {}", data.len(), file_id);
        Ok(data)
    }

    /// Download a file, reporting progress as chunks arrive.
    pub async fn download_with_progress(
        &self,
        file_id: &str,
        progress: ProgressFn<'_>,
    ) -> Result<Vec<u8>, DriveError> {
        with_reauth(&self.tokens, |token| async move {
            self.download_once(file_id, &token, Some(progress)).await
        })
        .await
    }
}

#[async_trait]
impl<P: TokenProvider> RemoteFileSource for GoogleDriveClient<P> {
    async fn list_files(&self, folder_id: &str) -> Result<Vec<Report>, DriveError> {
        let reports = with_reauth(&self.tokens, |token| async move {
            self.list_once(folder_id, &token).await
        })
        .await?;

        info!("Listed {} PDFs in folder {}", reports.len(), folder_id);
        Ok(reports)
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, DriveError> {
        with_reauth(&self.tokens, |token| async move {
            self.download_once(file_id, &token, None).await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::ReportSource;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_listing_query() {
        assert_eq!(
            listing_query("folder123"),
            "'folder123' in parents and mimeType='application/pdf' and trashed=false"
        );
    }

    #[test]
    fn test_listing_to_reports() {
        let body = r#"{
            "files": [
                { "id": "f2", "name": "pedidos_maio.pdf", "size": "1258291", "modifiedTime": "2024-05-12T14:32:00.000Z", "webViewLink": "https://drive.google.com/file/d/f2/view" },
                { "id": "f1", "name": "pedidos_abril.pdf" }
            ]
        }"#;
        let list: FileList = serde_json::from_str(body).unwrap();
        let reports: Vec<Report> = list.files.into_iter().map(Report::from).collect();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id, "f2");
        assert_eq!(reports[0].size, Some(1258291));
        assert_eq!(reports[0].display_size(), "1.20 MB");
        assert_eq!(
            reports[0].source,
            ReportSource::Drive {
                file_id: "f2".to_string()
            }
        );
        assert!(reports[0].modified.is_some());
        assert!(!reports[0].is_analyzed());
        assert_eq!(reports[1].display_size(), "N/A");
    }

    #[test]
    fn test_empty_listing() {
        let list: FileList = serde_json::from_str("{}").unwrap();
        assert!(list.files.is_empty());
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(reqwest::StatusCode::UNAUTHORIZED, "f1", String::new()),
            DriveError::AuthExpired
        ));
        assert!(matches!(
            status_error(reqwest::StatusCode::NOT_FOUND, "f1", String::new()),
            DriveError::NotFound(id) if id == "f1"
        ));
        assert!(matches!(
            status_error(reqwest::StatusCode::FORBIDDEN, "f1", "denied".into()),
            DriveError::Transport(TransportError::Auth(_))
        ));
        assert!(matches!(
            status_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "f1", "boom".into()),
            DriveError::Transport(TransportError::Status { status: 500, .. })
        ));
    }
}
