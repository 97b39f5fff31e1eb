//! Core value types for the scanner: note identity, change records, and
//! pre-release version labels.

pub mod change;
pub mod note;
pub mod prerelease;

pub use change::{ChangeRecord, RawChange, RawChangeKind};
pub use note::NoteEntry;
