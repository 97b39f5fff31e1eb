use std::collections::BTreeMap;

use git2::Oid;
use tracing::debug;

use crate::domain::note::{is_note_file, unique_id};
use crate::domain::{ChangeRecord, RawChange, RawChangeKind};
use crate::error::{RelnotesError, Result};

/// Collapse a commit's raw path changes into per-note change records.
///
/// Changes are grouped by the unique id embedded in the filename. A single
/// change maps directly to its record. An add paired with a delete for the
/// same id is a rename: git's own rename detection is not available at this
/// level, and the id is the identity that matters (someone who changes the
/// id part of a filename wants it treated as a different note). A group of
/// modifies happens when a merge commit touches the same file relative to
/// several parents; each one is reported against the merge commit. Anything
/// else indicates an assumption about the repository shape no longer holds,
/// and the scan stops rather than guess.
///
/// The commit hash attached to the records is the commit being scanned, not
/// the blob ids from the diff.
pub fn aggregate_changes(commit_id: Oid, changes: &[RawChange]) -> Result<Vec<ChangeRecord>> {
    let sha = commit_id.to_string();
    let mut by_uid: BTreeMap<String, Vec<&RawChange>> = BTreeMap::new();

    for change in changes {
        debug!("change {:?}", change);
        if !is_note_file(&change.path) {
            debug!("ignoring {}", change.path);
            continue;
        }
        by_uid
            .entry(unique_id(&change.path))
            .or_default()
            .push(change);
    }

    let mut records = Vec::new();
    for (uid, group) in by_uid {
        if group.len() == 1 {
            let change = group[0];
            records.push(match change.kind {
                RawChangeKind::Add => ChangeRecord::Add {
                    uid,
                    path: change.path.clone(),
                    commit: sha.clone(),
                },
                RawChangeKind::Delete => ChangeRecord::Delete {
                    uid,
                    path: change.path.clone(),
                },
                RawChangeKind::Modify => ChangeRecord::Modify {
                    uid,
                    path: change.path.clone(),
                    commit: sha.clone(),
                },
            });
            continue;
        }

        let has_modify = group.iter().any(|c| c.kind == RawChangeKind::Modify);
        let added = group.iter().find(|c| c.kind == RawChangeKind::Add);
        let deleted = group.iter().find(|c| c.kind == RawChangeKind::Delete);

        match (added, deleted, has_modify) {
            (Some(added), Some(deleted), false) => {
                records.push(ChangeRecord::Rename {
                    uid,
                    old_path: deleted.path.clone(),
                    new_path: added.path.clone(),
                    commit: sha.clone(),
                });
            }
            (None, None, true) => {
                for change in group {
                    records.push(ChangeRecord::Modify {
                        uid: uid.clone(),
                        path: change.path.clone(),
                        commit: sha.clone(),
                    });
                }
            }
            _ => {
                return Err(RelnotesError::scan(format!(
                    "unrecognized changes for note id {}: {:?}",
                    uid, group
                )));
            }
        }
    }
    Ok(records)
}
