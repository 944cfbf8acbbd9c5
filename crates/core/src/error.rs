use thiserror::Error;

use crate::model::ids::ParseIdError;
use crate::model::journal::JournalError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Journal(#[from] JournalError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}
