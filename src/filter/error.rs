use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid sort field: {0}")]
    InvalidSortField(String),
}
