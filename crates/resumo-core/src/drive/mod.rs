//! Remote folder of sales reports.
//!
//! [`RemoteFileSource`] lists and downloads PDFs; [`TokenProvider`] supplies
//! the bearer token. A rejected token is refreshed once and the call retried
//! through [`with_reauth`].

#[cfg(feature = "remote")]
mod google;

use std::future::Future;

use async_trait::async_trait;
use tracing::warn;

use crate::error::DriveError;
use crate::models::report::Report;

#[cfg(feature = "remote")]
pub use google::{GoogleDriveClient, ProgressFn};

/// Lists and downloads the PDFs of a folder.
#[async_trait]
pub trait RemoteFileSource: Send + Sync {
    /// PDFs in `folder_id`, newest first, all unanalyzed.
    async fn list_files(&self, folder_id: &str) -> Result<Vec<Report>, DriveError>;

    /// Raw bytes of one file.
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, DriveError>;
}

/// Source of access tokens for the remote folder.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current token.
    async fn token(&self) -> Result<String, DriveError>;

    /// Obtain a new token after the current one was rejected.
    async fn refresh(&self) -> Result<String, DriveError>;
}

/// Token read from an environment variable.
///
/// `refresh` reads the variable again, so an externally rotated token is
/// picked up.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    fn read(&self) -> Result<String, DriveError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(DriveError::AuthRequired),
        }
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn token(&self) -> Result<String, DriveError> {
        self.read()
    }

    async fn refresh(&self) -> Result<String, DriveError> {
        self.read()
    }
}

/// Run `call` with the current token; on [`DriveError::AuthExpired`]
/// refresh once and run it again.
pub async fn with_reauth<P, T, F, Fut>(provider: &P, mut call: F) -> Result<T, DriveError>
where
    P: TokenProvider + ?Sized,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, DriveError>>,
{
    let token = provider.token().await?;
    match call(token).await {
        Err(DriveError::AuthExpired) => {
            warn!("Drive token rejected, refreshing once");
            let token = provider.refresh().await?;
            call(token).await
        }
        other => other,
    }
}
