use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastReportError {
    #[error("Table header is empty but {rows} data rows were supplied")]
    EmptyHeader { rows: usize },

    #[error("Column count mismatch: layout expects {expected} columns, header has {actual}")]
    ColumnCountMismatch { expected: usize, actual: usize },

    #[error("Invalid surface: usable area is {width}x{height} after margins")]
    InvalidSurface { width: f32, height: f32 },

    #[error("Invalid layout config: {0}")]
    InvalidConfig(String),

    #[error("Invalid color '{0}': expected #RRGGBB")]
    InvalidColor(String),

    #[error("Invalid inventory data: {0}")]
    InvalidInventory(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForecastReportError>;
