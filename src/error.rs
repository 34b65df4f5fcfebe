use thiserror::Error;

/// Failures talking to the completion endpoint or reading its reply.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("unexpected response format: {0}")]
    Format(String),
    #[error("invalid analysis JSON: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("文章を入力してください")]
    EmptyInput,
    #[error("line {line}: {source}")]
    Analysis {
        line: usize,
        #[source]
        source: AnalysisError,
    },
    #[error(transparent)]
    Export(#[from] ExportError),
}
