use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("slant range {range_km:.6} km is below the {min_range_km} km minimum")]
    DegenerateGeometry { range_km: f64, min_range_km: f64 },
    #[error("invalid observer position: {0}")]
    InvalidObserver(String),
}
