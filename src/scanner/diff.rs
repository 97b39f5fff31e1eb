use std::collections::BTreeMap;

use git2::{Commit, ObjectType, Oid};

use crate::domain::{RawChange, RawChangeKind};
use crate::error::Result;
use crate::git::RepoAccessor;

/// The changes a commit makes inside one subdirectory, relative to its
/// parent(s). Paths in the result are relative to the subdirectory.
///
/// A root commit turns every blob in the subtree into an add. A single-parent
/// commit is a plain recursive tree diff, short-circuited when the subtree
/// ids match so unrelated history costs nothing. A merge commit is compared
/// against every parent at once, because note files introduced by the merge
/// resolution itself must still surface (see [merge_changes]).
pub fn changes_in_subdir(
    repo: &RepoAccessor,
    commit: &Commit<'_>,
    subdir: &str,
) -> Result<Vec<RawChange>> {
    let commit_subtree = repo.subtree_id(commit, subdir)?;
    let parents: Vec<Commit<'_>> = commit.parents().collect();

    match parents.len() {
        0 => tree_changes(repo, None, commit_subtree),
        1 => {
            let parent_subtree = repo.subtree_id(&parents[0], subdir)?;
            if parent_subtree == commit_subtree {
                return Ok(Vec::new());
            }
            tree_changes(repo, parent_subtree, commit_subtree)
        }
        _ => {
            let mut parent_subtrees = Vec::new();
            for parent in &parents {
                if let Some(id) = repo.subtree_id(parent, subdir)? {
                    parent_subtrees.push(id);
                }
            }
            merge_changes(repo, &parent_subtrees, commit_subtree)
        }
    }
}

/// Recursive diff of two trees (either side may be absent), producing
/// add/delete/modify records for blobs.
pub fn tree_changes(
    repo: &RepoAccessor,
    old: Option<Oid>,
    new: Option<Oid>,
) -> Result<Vec<RawChange>> {
    let mut out = Vec::new();
    diff_trees(repo, old, new, "", &mut out)?;
    Ok(out)
}

/// Multi-parent diff for a merge commit, mirroring the union comparison the
/// scanner needs: a path survives only when it changed relative to every
/// parent, or when the per-parent changes disagree about it. A change that
/// matches one parent exactly arrived through that parent and was already
/// seen on its own branch, so it is dropped here.
fn merge_changes(
    repo: &RepoAccessor,
    parent_subtrees: &[Oid],
    commit_subtree: Option<Oid>,
) -> Result<Vec<RawChange>> {
    let num_parents = parent_subtrees.len();
    let mut by_path: BTreeMap<String, Vec<Option<RawChange>>> = BTreeMap::new();

    for (i, parent) in parent_subtrees.iter().enumerate() {
        for change in tree_changes(repo, Some(*parent), commit_subtree)? {
            let path = change.path.clone();
            by_path
                .entry(path)
                .or_insert_with(|| vec![None; num_parents])[i] = Some(change);
        }
    }

    let mut out = Vec::new();
    for (_, per_parent) in by_path {
        let have: Vec<&RawChange> = per_parent.iter().flatten().collect();
        let all_deletes = have.iter().all(|c| c.kind == RawChangeKind::Delete);

        let emit = if all_deletes {
            // The file vanished relative to the parents that had it; only a
            // disagreement about what was deleted marks the merge itself.
            !all_same(&have, |c| c.old_id)
        } else if !all_same(&have, |c| c.kind) {
            true
        } else {
            // Changed relative to every parent: introduced by this commit.
            per_parent.iter().all(Option::is_some)
        };

        if emit {
            out.extend(per_parent.into_iter().flatten());
        }
    }
    Ok(out)
}

fn all_same<T: PartialEq>(changes: &[&RawChange], key: impl Fn(&RawChange) -> T) -> bool {
    match changes.split_first() {
        Some((first, rest)) => rest.iter().all(|c| key(c) == key(first)),
        None => true,
    }
}

/// One tree entry as the diff sees it: object id, file mode, and whether it
/// is a subtree.
#[derive(PartialEq, Eq)]
struct DiffEntry {
    id: Oid,
    mode: i32,
    is_tree: bool,
}

fn entries_of(repo: &RepoAccessor, tree_id: Option<Oid>) -> Result<BTreeMap<String, DiffEntry>> {
    let mut entries = BTreeMap::new();
    let tree_id = match tree_id {
        Some(id) => id,
        None => return Ok(entries),
    };
    let tree = repo.tree(tree_id)?;
    for entry in tree.iter() {
        let name = match entry.name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        entries.insert(
            name,
            DiffEntry {
                id: entry.id(),
                mode: entry.filemode(),
                is_tree: entry.kind() == Some(ObjectType::Tree),
            },
        );
    }
    Ok(entries)
}

fn diff_trees(
    repo: &RepoAccessor,
    old: Option<Oid>,
    new: Option<Oid>,
    prefix: &str,
    out: &mut Vec<RawChange>,
) -> Result<()> {
    if old == new {
        return Ok(());
    }
    let old_entries = entries_of(repo, old)?;
    let new_entries = entries_of(repo, new)?;

    let mut names: Vec<&String> = old_entries.keys().chain(new_entries.keys()).collect();
    names.sort();
    names.dedup();

    for name in names {
        let path = join_path(prefix, name);
        match (old_entries.get(name), new_entries.get(name)) {
            (None, Some(added)) => {
                emit_all(repo, added, &path, true, out)?;
            }
            (Some(removed), None) => {
                emit_all(repo, removed, &path, false, out)?;
            }
            (Some(before), Some(after)) => {
                if before == after {
                    continue;
                }
                match (before.is_tree, after.is_tree) {
                    (true, true) => diff_trees(repo, Some(before.id), Some(after.id), &path, out)?,
                    (false, false) => out.push(RawChange::modify(path, before.id, after.id)),
                    (true, false) => {
                        emit_all(repo, before, &path, false, out)?;
                        out.push(RawChange::add(path, after.id));
                    }
                    (false, true) => {
                        out.push(RawChange::delete(path.clone(), before.id));
                        emit_all(repo, after, &path, true, out)?;
                    }
                }
            }
            (None, None) => {}
        }
    }
    Ok(())
}

/// Emit an add (`adding`) or delete for a single entry, recursing when it is
/// a subtree so every blob underneath is reported.
fn emit_all(
    repo: &RepoAccessor,
    entry: &DiffEntry,
    path: &str,
    adding: bool,
    out: &mut Vec<RawChange>,
) -> Result<()> {
    if !entry.is_tree {
        out.push(if adding {
            RawChange::add(path, entry.id)
        } else {
            RawChange::delete(path, entry.id)
        });
        return Ok(());
    }
    let tree = repo.tree(entry.id)?;
    for child in tree.iter() {
        let name = match child.name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let child_entry = DiffEntry {
            id: child.id(),
            mode: child.filemode(),
            is_tree: child.kind() == Some(ObjectType::Tree),
        };
        let child_path = join_path(path, &name);
        emit_all(repo, &child_entry, &child_path, adding, out)?;
    }
    Ok(())
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}
