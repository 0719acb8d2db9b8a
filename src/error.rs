use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookDeskError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error), // Converts io::Error into BookDeskError automatically

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error), // Transport failures: connect, DNS, TLS

    #[error("Request failed with status {status}")]
    RequestFailed { status: u16 },

    #[error("Bulk action rejected: {0}")]
    BulkRejected(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Error: {0}")]
    Error(String), // Allows custom application errors
}

impl BookDeskError {
    /// Text shown to the user in a notice. Transport failures and non-ok
    /// statuses read the same.
    pub fn user_message(&self) -> String {
        match self {
            BookDeskError::HttpError(_) | BookDeskError::RequestFailed { .. } => {
                "The request failed.".to_string()
            }
            BookDeskError::BulkRejected(reason) => reason.clone(),
            _ => "An unexpected error occurred.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_and_status_failures_read_the_same() {
        let status = BookDeskError::RequestFailed { status: 500 };
        assert_eq!(status.user_message(), "The request failed.");
        assert_eq!(status.to_string(), "Request failed with status 500");
    }

    #[test]
    fn test_bulk_rejection_surfaces_reason() {
        let err = BookDeskError::BulkRejected("Please select an action.".to_string());
        assert_eq!(err.user_message(), "Please select an action.");
    }

    #[test]
    fn test_io_error_converts() {
        let err: BookDeskError = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, BookDeskError::IoError(_)));
        assert_eq!(err.user_message(), "An unexpected error occurred.");
    }
}
