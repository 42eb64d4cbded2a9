use std::fmt;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart,
    },
    http::StatusCode,
    response::IntoResponse,
};
use gps_log::{diagnostics::LogDiagnostics, process_gps_log, GpsLogError};
use tokio::task::JoinError;

/// Name of the multipart field carrying the log file.
pub const FILE_FIELD: &str = "file";

#[derive(Debug)]
pub enum UploadError {
    NotMultipart(MultipartRejection),
    Multipart(MultipartError),
    MissingFile,
    GpsLog(GpsLogError),
    Worker(JoinError),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotMultipart(why) => why.status(),
            Self::Multipart(why) => why.status(),
            Self::MissingFile | Self::GpsLog(_) => StatusCode::BAD_REQUEST,
            Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMultipart(why) => write!(f, "{}", why.body_text()),
            Self::Multipart(why) => write!(f, "{}", why.body_text()),
            Self::MissingFile => {
                write!(f, "required part '{}' is not present", FILE_FIELD)
            }
            Self::GpsLog(why) => write!(f, "{}", why),
            Self::Worker(why) => write!(f, "processing was interrupted: {}", why),
        }
    }
}

impl From<MultipartRejection> for UploadError {
    fn from(value: MultipartRejection) -> Self {
        Self::NotMultipart(value)
    }
}

impl From<MultipartError> for UploadError {
    fn from(value: MultipartError) -> Self {
        Self::Multipart(value)
    }
}

impl From<GpsLogError> for UploadError {
    fn from(value: GpsLogError) -> Self {
        Self::GpsLog(value)
    }
}

impl From<JoinError> for UploadError {
    fn from(value: JoinError) -> Self {
        Self::Worker(value)
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> axum::response::Response {
        log::info!("rejected gps log upload: {}", self);
        (
            self.status(),
            format!("Error processing GPS log file: {}", self),
        )
            .into_response()
    }
}

/// Accepts a `multipart/form-data` upload with the log in the `file` part and
/// answers with the distance summary as plain text.
pub(crate) async fn upload_gps_log(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<String, UploadError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("<unnamed>").to_owned();
        let content = field.bytes().await?;
        log::info!("processing gps log {} ({} bytes)", file_name, content.len());

        let report = tokio::task::spawn_blocking(move || {
            process_gps_log(&content[..], LogDiagnostics)
        })
        .await??;

        log::info!(
            "gps log {}: {:.3} km over {} segments",
            file_name,
            report.total_kilometers,
            report.segments
        );
        return Ok(report.summary());
    }

    Err(UploadError::MissingFile)
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn missing_file_is_a_bad_request() {
        let response = UploadError::MissingFile.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn read_failures_are_bad_requests() {
        let error = UploadError::from(GpsLogError::from(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "truncated",
        )));
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "could not read gps log: truncated");
    }
}
