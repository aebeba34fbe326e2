mod context;
mod discover;
pub mod error;
pub mod rename;
mod sanitize;
mod scramble;
mod template;

pub use crate::context::{Context, DEFAULT_BACKOFF, DEFAULT_CONCURRENCY, DEFAULT_RETRIES};
pub use crate::discover::discover;
pub use crate::sanitize::{MAX_STEM_BYTES, sanitize, sanitize_stem};
pub use crate::scramble::{ScrambleReport, Scrambled, scramble};
pub use crate::template::{DEFAULT_TEMPLATE, FilenameGenerator};
