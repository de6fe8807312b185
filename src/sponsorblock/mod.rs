//! Skip-segment lookup and the keep-interval computation.
//!
//! The remote service reports spans of a media item to discard (for us,
//! non-music spans). The pipeline complements those into the spans to keep
//! and hands them to the trimmer's audio filter.

mod client;
mod segments;

pub use client::SponsorBlockClient;
pub use segments::{keep_segments, Segment};
