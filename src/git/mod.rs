//! Read-only access to the git object store.
//!
//! The scanner never shells out to a git binary and never touches the working
//! tree; everything it needs comes from refs, tags, commits, trees and blobs
//! reached through [RepoAccessor]. The tag index is built once per accessor
//! instance on first use and treated as read-only afterwards.

pub mod accessor;
pub mod tags;

pub use accessor::RepoAccessor;
pub use tags::TagIndex;
