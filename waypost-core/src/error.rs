use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Routing provider error: {0}")]
    Provider(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(#[from] geojson::Error),
}
