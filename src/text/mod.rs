//! Pure text transforms applied to comments before translation.

pub mod combine;
pub mod humanize;
pub mod ignore;

pub use combine::{CombinedLines, combine_lines};
pub use humanize::humanize;
pub use ignore::strip_ignored;
