//! A decoder for Garmin's Flexible and Interoperable Data Transfer
//! protocol.
//!
//! Freehub reads a FIT document from any [`std::io::Read`] source into
//! typed, profile-aware messages, gathered in a container matching the
//! document's file type. The four entry points trade depth for work:
//! [`decode`] processes everything, [`decode_header`] and
//! [`decode_header_and_file_id`] stop early for callers that only need to
//! identify a file, and [`check_integrity`] verifies checksums without
//! building messages at all.
//!
//! ```no_run
//! let file = std::fs::File::open("afternoon-ride.fit")?;
//! let fit = freehub::decode(file)?;
//!
//! if let Some(activity) = fit.activity() {
//!     println!("{} records", activity.records.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Messages and fields absent from the bundled profile are not errors;
//! they are counted in the returned [`Fit`]. Writing FIT documents and
//! developer data fields are out of scope.

pub mod decode;
pub mod file;
pub mod profile;

pub use decode::header::Header;
pub use decode::{check_integrity, decode, decode_header, decode_header_and_file_id, Error};
pub use file::Fit;
