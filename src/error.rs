use thiserror::Error;

use crate::bbox::BBox;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid box {0:?}: negative dimensions")]
    InvalidBox(BBox),

    #[error("numerical error: {0}")]
    Numerical(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
