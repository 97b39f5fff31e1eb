//! The history scanner.
//!
//! Walks a branch's commit graph in a merge-aware topological order, collects
//! note-file changes inside the configured subdirectory, and assigns each
//! note to the earliest version in which it appeared. Tag placement, renames,
//! deletions and pre-release collapsing are all resolved here.

mod aggregate;
mod diff;
mod linearize;

pub use aggregate::aggregate_changes;
pub use diff::{changes_in_subdir, tree_changes};
pub use linearize::TopoWalk;

use std::collections::{BTreeMap, HashMap, HashSet};

use git2::Oid;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::boundary::ScanWarning;
use crate::config::Config;
use crate::domain::note::unique_id;
use crate::domain::prerelease::strip_pre_release;
use crate::domain::{ChangeRecord, NoteEntry};
use crate::error::{RelnotesError, Result};
use crate::git::RepoAccessor;

/// Mapping from version label to the notes first seen in that version,
/// most recent version first.
pub type NotesByVersion = Vec<(String, Vec<NoteEntry>)>;

/// Scans a repository's history and maps note files to release versions.
///
/// A scanner owns its repository accessor (and with it the tag index), so it
/// is built once per scan configuration and not shared across threads.
pub struct Scanner {
    config: Config,
    repo: RepoAccessor,
}

impl Scanner {
    /// Open the repository named by the configuration.
    pub fn new(config: Config) -> Result<Self> {
        let repo = RepoAccessor::open(&config.reporoot)?;
        Ok(Scanner { config, repo })
    }

    /// The configuration this scanner was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The committed contents of `path` at the given commit, or `None` if
    /// the file does not exist at that point in history. This is the reader
    /// interface downstream report rendering consumes.
    pub fn file_at_commit(&self, path: &str, sha: &str) -> Result<Option<Vec<u8>>> {
        let id = Oid::from_str(sha)?;
        self.repo.file_at_commit(path, id)
    }

    /// Build the version → note files mapping for the configured branch.
    ///
    /// Versions are returned in reverse chronological order. A note is
    /// associated with the earliest version for which it was available,
    /// regardless of later edits or renames; within a version the notes are
    /// ordered by unique id so the output is deterministic.
    pub fn notes_by_version(&self) -> Result<NotesByVersion> {
        let notesdir = self.config.notes_subdir.trim_matches('/').to_string();
        let branch = self.config.branch.as_deref();

        info!(
            "scanning {}/{} (branch={})",
            self.config.reporoot.display(),
            notesdir,
            branch.unwrap_or("*current*"),
        );

        // All tags known on the branch, in date order. The history scan
        // below runs in topological order, so it may encounter these tags in
        // a different sequence.
        let mut versions_by_date = self.tags_on_branch(branch)?;
        debug!("versions by date {:?}", versions_by_date);

        if let Some(earliest) = &self.config.earliest_version {
            if !versions_by_date.contains(earliest) {
                return Err(RelnotesError::config(format!(
                    "earliest_version set to unknown revision '{}'",
                    earliest
                )));
            }
        }

        let mut earliest_version = self.config.earliest_version.clone();
        let mut branch_base_tag = earliest_version.clone();

        // Without an explicit boundary, a non-mainline branch stops where it
        // diverged from master.
        if self.config.stop_at_branch_base && earliest_version.is_none() {
            if let Some(branch_name) = branch {
                if branch_name != "master" {
                    debug!("determining earliest version from branch");
                    earliest_version = self.branch_base(branch_name)?;
                    branch_base_tag = earliest_version.clone();
                    if self.config.collapse_pre_releases {
                        if let Some(stripped) =
                            earliest_version.as_deref().and_then(strip_pre_release)
                        {
                            // The branch may have been cut at a pre-release
                            // tag; the output should reach back to the final
                            // version, while the scan still stops at the tag
                            // actually found on the base commit.
                            earliest_version = Some(stripped);
                        }
                    }
                }
            }
        }
        match &earliest_version {
            Some(version) => info!("earliest version to include is {}", version),
            None => info!("including entire branch history"),
        }
        if let Some(tag) = &branch_base_tag {
            info!("stopping scan at {}", tag);
        }

        let mut versions: Vec<String> = Vec::new();
        let mut earliest_seen: BTreeMap<String, String> = BTreeMap::new();

        // The current version may be an unreleased dev version when commits
        // follow the last tag. It is the most recent version either way, so
        // it goes to the front of the by-date list if not already known.
        let mut current_version = self.current_version(branch)?;
        debug!("current repository version: {}", current_version);
        if !versions_by_date.contains(&current_version) {
            versions_by_date.insert(0, current_version.clone());
        }

        // The most recent filename for each id, to allow for renames. Ids of
        // deleted files are never stored here.
        let mut last_name_by_id: HashMap<String, NoteEntry> = HashMap::new();
        let mut deleted_ids: HashSet<String> = HashSet::new();

        let head = self.repo.resolve_ref(branch)?;
        for (counter, id) in TopoWalk::new(&self.repo, head)?.enumerate() {
            let tags_on_commit = self.repo.tags_on_commit(id)?;
            debug!("{:06} {} {:?}", counter + 1, id, tags_on_commit);

            if let Some(last) = tags_on_commit.last() {
                current_version = last.clone();
                info!(
                    "{:06} {} updating current version to {}",
                    counter + 1,
                    id,
                    current_version
                );
            }

            if !versions.contains(&current_version) {
                debug!("{} is a new version", current_version);
                versions.push(current_version.clone());
            }

            let commit = self.repo.find_commit(id)?;
            let raw_changes = changes_in_subdir(&self.repo, &commit, &notesdir)?;
            for record in aggregate_changes(id, &raw_changes)? {
                let uid = record.uid().to_string();

                // The scan runs newest to oldest, so "earliest" is updated on
                // every sighting: the final overwrite is the true earliest
                // version.
                debug!("{}: setting earliest reference to {}", uid, current_version);
                earliest_seen.insert(uid.clone(), current_version.clone());

                // A recorded deletion was the last thing to happen to this
                // id; everything older is irrelevant.
                if deleted_ids.contains(&uid) {
                    debug!("{}: has already been deleted, ignoring this change", uid);
                    continue;
                }

                match record {
                    ChangeRecord::Add { path, commit, .. } => {
                        if !last_name_by_id.contains_key(&uid) {
                            info!("{}: update to {} in commit {}", uid, path, commit);
                            last_name_by_id
                                .insert(uid, NoteEntry::new(join_subdir(&notesdir, &path), commit));
                        } else {
                            debug!("{}: add for file we have already seen", uid);
                        }
                    }
                    ChangeRecord::Rename {
                        new_path, commit, ..
                    } => {
                        if !last_name_by_id.contains_key(&uid) {
                            info!("{}: update to {} in commit {}", uid, new_path, commit);
                            last_name_by_id.insert(
                                uid,
                                NoteEntry::new(join_subdir(&notesdir, &new_path), commit),
                            );
                        } else {
                            debug!("{}: renamed file already known with the new name", uid);
                        }
                    }
                    ChangeRecord::Modify { path, commit, .. } => {
                        if !last_name_by_id.contains_key(&uid) {
                            info!("{}: update to {} in commit {}", uid, path, commit);
                            last_name_by_id
                                .insert(uid, NoteEntry::new(join_subdir(&notesdir, &path), commit));
                        } else {
                            debug!("{}: modified file already known", uid);
                        }
                    }
                    ChangeRecord::Delete { .. } => {
                        // If the id is already known by a newer name, the
                        // file was deleted and later added back; do not treat
                        // it as gone.
                        if !last_name_by_id.contains_key(&uid) {
                            info!("{}: note deleted in {}", uid, id);
                            deleted_ids.insert(uid);
                        } else {
                            debug!("{}: delete for file re-added after the delete", uid);
                        }
                    }
                }
            }

            if let Some(stop) = &branch_base_tag {
                let reached = if tags_on_commit.is_empty() {
                    current_version == *stop
                } else {
                    tags_on_commit.contains(stop)
                };
                if reached {
                    info!("reached end of branch after {} commits", counter + 1);
                    break;
                }
            }
        }

        // Invert earliest_seen into per-version buckets, keeping only notes
        // whose file still exists somewhere in the scanned history.
        let mut files_and_tags: IndexMap<String, Vec<NoteEntry>> =
            versions.iter().map(|v| (v.clone(), Vec::new())).collect();
        for (uid, version) in &earliest_seen {
            match last_name_by_id.get(uid) {
                Some(entry) => {
                    files_and_tags
                        .entry(version.clone())
                        .or_default()
                        .push(entry.clone());
                }
                None => {
                    // Cannot find the file again; skip the note rather than
                    // failing the whole scan.
                    warn!("{}", ScanWarning::UnresolvableNote { uid: uid.clone() });
                }
            }
        }

        // Combine pre-releases into the final release, when asked to and
        // when the final release was actually tagged.
        if self.config.collapse_pre_releases {
            let collapsing = files_and_tags;
            files_and_tags = IndexMap::new();
            for version in &versions_by_date {
                let entries = match collapsing.get(version) {
                    Some(entries) => entries,
                    // No notes attached, nothing to collapse.
                    None => continue,
                };
                debug!("checking {:?}", version);
                let canonical = match strip_pre_release(version) {
                    Some(canonical) if versions_by_date.contains(&canonical) => {
                        debug!("combining into {:?}", canonical);
                        canonical
                    }
                    // The final version was never tagged, so the pre-release
                    // keeps its own bucket.
                    _ => version.clone(),
                };
                files_and_tags
                    .entry(canonical)
                    .or_default()
                    .extend(entries.iter().cloned());
            }
        }

        // Keep only the versions that have notes, newest first. Buckets are
        // ordered by unique id: commit dates are no longer meaningful after
        // the topological walk, and the id gives a stable order.
        let mut trimmed: NotesByVersion = Vec::new();
        for version in &versions_by_date {
            let mut entries = match files_and_tags.get(version) {
                Some(entries) if !entries.is_empty() => entries.clone(),
                _ => continue,
            };
            entries.sort_by(|a, b| {
                unique_id(&a.path)
                    .cmp(&unique_id(&b.path))
                    .then_with(|| a.path.cmp(&b.path))
                    .then_with(|| a.commit.cmp(&b.commit))
            });
            trimmed.push((version.clone(), entries));
            if earliest_version.as_deref() == Some(version.as_str()) {
                break;
            }
        }

        debug!(
            "found {} versions and {} files",
            trimmed.len(),
            trimmed.iter().map(|(_, notes)| notes.len()).sum::<usize>(),
        );
        Ok(trimmed)
    }

    /// Tag names reachable from the branch head, most recent first.
    fn tags_on_branch(&self, branch: Option<&str>) -> Result<Vec<String>> {
        let head = self.repo.resolve_ref(branch)?;
        let mut results = Vec::new();
        for id in self.repo.commits_by_date(head)? {
            results.extend(self.repo.tags_on_commit(id)?);
        }
        Ok(results)
    }

    /// The current version of the branch, like git describe: the last tag
    /// reached by walking first parents from the head, with a `-<distance>`
    /// suffix when the head itself is untagged. `0.0.0` if no tag exists.
    fn current_version(&self, branch: Option<&str>) -> Result<String> {
        let mut next = Some(self.repo.resolve_ref(branch)?);
        let mut count = 0u64;
        while let Some(id) = next {
            let tags = self.repo.tags_on_commit(id)?;
            if let Some(last) = tags.last() {
                return Ok(if count > 0 {
                    format!("{}-{}", last, count)
                } else {
                    last.clone()
                });
            }
            let commit = self.repo.find_commit(id)?;
            next = commit.parent_ids().next();
            count += 1;
        }
        Ok("0.0.0".to_string())
    }

    /// The tag at the base of a branch: walk the branch until reaching a
    /// commit that is also on master, and report the last tag on it (or
    /// `None` when the base commit is untagged).
    fn branch_base(&self, branch: &str) -> Result<Option<String>> {
        let mainline_head = self.repo.resolve_ref(Some("master"))?;
        let mainline: HashSet<Oid> = self
            .repo
            .commits_by_date(mainline_head)?
            .into_iter()
            .collect();

        let head = self.repo.resolve_ref(Some(branch))?;
        for id in TopoWalk::new(&self.repo, head)? {
            if mainline.contains(&id) {
                // Reached via the branch but also on master: the base.
                let tags = self.repo.tags_on_commit(id)?;
                return Ok(tags.last().cloned());
            }
        }
        Ok(None)
    }
}

fn join_subdir(subdir: &str, path: &str) -> String {
    if subdir.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", subdir, path)
    }
}
