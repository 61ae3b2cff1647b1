//! Modelhub engine: backend adapter, orchestrators and poll-session driver.
mod auth;
mod derivative;
mod error;
mod oss;
mod poll;
mod workflow;

pub use auth::{AccessToken, AuthClient, INTERNAL_SCOPE, PUBLIC_SCOPE};
pub use derivative::DerivativeClient;
pub use error::BackendError;
pub use oss::{BucketInfo, ObjectInfo, OssClient, PAGE_LIMIT};
pub use poll::{PollEvent, PollHandle, PollSession, StatusSource};
pub use workflow::{UrnEntry, Workflow};
