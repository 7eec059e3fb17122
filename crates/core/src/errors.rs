use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvaluatorError {
    #[error("The evaluation was cancelled")]
    Cancelled,

    #[error("GitHub provider error: {0}")]
    Provider(#[from] merge_sentinel_github::errors::Error),
}
