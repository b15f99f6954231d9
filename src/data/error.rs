use thiserror::Error;
#[derive(Debug, Error)]
pub enum EpgError {
    #[error("unknown downsampling method {0:?}; expected \"subsampling\", \"mean\" or \"peak\"")]
    UnknownDownsampleMethod(String),
    #[error("recording {0:?} is not loaded")]
    UnknownFile(String),
    #[error("recording is missing required column {0:?}")]
    MissingColumn(&'static str),
    #[error("recording has no voltage column")]
    NoVoltageColumn,
    #[error("time column is not monotonic at row {row}: {previous} > {current}")]
    NonMonotonicTime {
        row: usize,
        previous: f64,
        current: f64,
    },
    #[error("invalid number {value:?} in column {column:?} at row {row}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },
    #[error("time and value arrays differ in length: {times} vs {values}")]
    LengthMismatch { times: usize, values: usize },
    #[error("bucket reshape failed: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for EpgError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        EpgError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for EpgError {
    fn from(value: image::ImageError) -> Self {
        EpgError::Plot(value.to_string())
    }
}
