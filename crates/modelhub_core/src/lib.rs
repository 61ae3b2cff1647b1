//! Modelhub core: identifier codec and the translation-status polling state machine.
mod bucket;
mod effect;
mod msg;
mod state;
mod status;
mod update;
mod urn;
mod view_model;

pub use bucket::{
    normalize_bucket_key, sanitize_bucket_key, BucketKeyError, MAX_KEY_LEN, MIN_KEY_LEN,
};
pub use effect::{Effect, Notice};
pub use msg::Msg;
pub use state::{PollPhase, ViewerState, RETRY_DELAY};
pub use status::{Diagnostic, TranslationStatus};
pub use update::update;
pub use urn::{decode, encode, DecodeError};
pub use view_model::ViewerViewModel;
