pub mod engine;
pub mod fallback;
pub mod navigator;
pub mod pipeline;
pub mod session;
pub mod table;

pub use crate::domain::model::{QueryParams, Record, ResultBundle, RunOutcome, Selector};
pub use crate::domain::ports::{Browser, PageElement, SessionProvider, Storage};
pub use crate::utils::error::Result;
