pub mod action;
pub mod api;
pub mod job;
pub mod payload;
pub mod poll;

#[cfg(test)]
mod testutil;

pub use action::ActionRunner;
pub use api::{
    ApiClient, RemoteError, RemoteStatus, StatusResponse, TryOnApi, AUTH_ERROR_MESSAGE,
    UNKNOWN_API_ERROR,
};
pub use job::{Job, PollSchedule};
pub use payload::ModelInputs;
pub use poll::{collect_outcome, poll_jobs};
