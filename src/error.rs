use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiverError {
    #[error("spreadsheet is missing required column(s): {0}")]
    MissingColumns(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("log sink error: {0}")]
    LogSink(String),
}

pub type Result<T> = std::result::Result<T, ArchiverError>;
