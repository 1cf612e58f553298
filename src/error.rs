use thiserror::Error;

#[derive(Error, Debug)]
pub enum PixelForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Empty Neighborhood: no in-bounds pixels around ({y}, {x})")]
    EmptyWindow { y: u32, x: u32 },
}

pub type PfResult<T> = Result<T, PixelForgeError>;
