use modzy_api::ClientError;
use thiserror::Error;

use crate::jobs::JobError;
use crate::models::ModelError;

#[derive(Error, Debug)]
pub enum ModzyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Job(#[from] JobError),
    #[error(transparent)]
    Model(#[from] ModelError),
}
