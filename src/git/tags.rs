use std::collections::HashMap;

use git2::{Oid, Repository};
use tracing::debug;

use crate::error::Result;

/// Index of every tag in the repository, keyed by target commit.
///
/// Annotated and signed tags have their own object id; the index peels them
/// to the commit they reference, which is the id the scanner encounters while
/// walking a branch. Tags on the same commit are kept in application order:
/// oldest target-commit timestamp first, tag name as tie-break so the order
/// is stable across runs.
#[derive(Debug)]
pub struct TagIndex {
    by_commit: HashMap<Oid, Vec<String>>,
}

impl TagIndex {
    /// Build the index by walking `refs/tags/*`.
    pub fn build(repo: &Repository) -> Result<Self> {
        let mut raw: HashMap<Oid, Vec<(i64, String)>> = HashMap::new();
        let mut count = 0usize;

        for reference in repo.references_glob("refs/tags/*")? {
            let reference = reference?;
            let name = match reference.name().and_then(|n| n.strip_prefix("refs/tags/")) {
                Some(name) => name.to_string(),
                None => continue,
            };
            let commit = reference.peel_to_commit()?;
            raw.entry(commit.id())
                .or_default()
                .push((commit.time().seconds(), name));
            count += 1;
        }

        let by_commit = raw
            .into_iter()
            .map(|(id, mut tags)| {
                tags.sort();
                let names = tags.into_iter().map(|(_, name)| name).collect();
                (id, names)
            })
            .collect();

        debug!("indexed {} tags", count);
        Ok(TagIndex { by_commit })
    }

    /// The tag names on a commit, in application order (empty if none).
    pub fn tags_on_commit(&self, id: Oid) -> &[String] {
        self.by_commit.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}
