//! Core logic for icsrelay.
//!
//! This crate has no I/O. It provides:
//! - `policy`: the URL allow-list deciding which calendar exports may be fetched
//! - `ics`: the sanitizer that strips unwanted properties from a fetched .ics file
//! - `error`: the error kinds shared with the HTTP layer

pub mod error;
pub mod ics;
pub mod policy;

pub use error::{RelayError, RelayResult};
pub use ics::{CleanRules, clean};
pub use policy::{UrlPolicy, is_allowed};
