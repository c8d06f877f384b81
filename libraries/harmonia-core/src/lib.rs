//! Harmonia Core
//!
//! Shared types and helpers for the Harmonia desktop player.
//!
//! This crate provides the building blocks that the playback engine and the
//! UI layer agree on:
//! - **Track identity**: `Track` and its path-normalized `Fingerprint`
//! - **Library entities**: `Folder`, `Playlist`, `Tag`
//! - **Library collaborator**: the async `LibraryService` trait
//! - **Formatting**: durations and file sizes for display
//!
//! # Example
//!
//! ```rust
//! use harmonia_core::{format_duration, Track};
//!
//! let a = Track::new(1, r"C:\Music\song.mp3").with_duration(185.0);
//! let b = Track::new(7, "C:/Music/song.mp3");
//!
//! // Identity is the file reference, not the database id
//! assert!(a.same_identity(&b));
//! assert_eq!(format_duration(a.duration_secs()), "3:05");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod library;
pub mod types;

pub use error::{CoreError, Result};
pub use format::{format_duration, format_duration_long, format_file_size, format_track_duration};
pub use library::{songs_for, LibrarySelection, LibraryService};
pub use types::{Fingerprint, Folder, Playlist, Tag, Track};

#[cfg(any(test, feature = "mocks"))]
pub use library::MockLibraryService;
