mod fingerprint;
mod library;
mod track;

pub use fingerprint::Fingerprint;
pub use library::{Folder, Playlist, Tag};
pub use track::Track;
