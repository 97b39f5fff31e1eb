use std::collections::{HashMap, HashSet, VecDeque};

use git2::Oid;

use crate::error::Result;
use crate::git::RepoAccessor;

/// Merge-aware topological traversal of a branch's history.
///
/// Stock topological or chronological orders can place a merged branch's tags
/// out of sequence relative to the mainline. This walk emits a merged-in
/// branch completely, including its own tagged commits, before the mainline
/// commits that precede the merge, so sequential version assignment sees tags
/// in the right place regardless of commit dates:
///
/// ```text
/// *   d1239b6 (HEAD -> master) Merge branch 'new-branch'
/// |\
/// | * 9478612 (new-branch) one commit on branch
/// * | 303e21d second commit on master
/// * | 0ba5186 first commit on master
/// |/
/// *   a7f573d original commit on master
/// ```
///
/// Each `TopoWalk` is a fresh traversal; the order is deterministic for a
/// given graph.
pub struct TopoWalk {
    parents: HashMap<Oid, Vec<Oid>>,
    children: HashMap<Oid, HashSet<Oid>>,
    emitted: HashSet<Oid>,
    todo: VecDeque<Oid>,
}

impl TopoWalk {
    /// Record the parent and child links of every commit reachable from
    /// `head`. The graph is held as an arena of ids, and both this prepass
    /// and the traversal itself use explicit worklists, so history depth
    /// never translates into stack depth.
    pub fn new(repo: &RepoAccessor, head: Oid) -> Result<Self> {
        let mut parents: HashMap<Oid, Vec<Oid>> = HashMap::new();
        let mut children: HashMap<Oid, HashSet<Oid>> = HashMap::new();

        let mut pending = vec![head];
        while let Some(id) = pending.pop() {
            if parents.contains_key(&id) {
                continue;
            }
            let commit = repo.find_commit(id)?;
            let parent_ids: Vec<Oid> = commit.parent_ids().collect();
            for parent in &parent_ids {
                children.entry(*parent).or_default().insert(id);
                if !parents.contains_key(parent) {
                    pending.push(*parent);
                }
            }
            parents.insert(id, parent_ids);
        }

        let mut todo = VecDeque::new();
        todo.push_front(head);

        Ok(TopoWalk {
            parents,
            children,
            emitted: HashSet::new(),
            todo,
        })
    }
}

impl Iterator for TopoWalk {
    type Item = Oid;

    fn next(&mut self) -> Option<Oid> {
        while let Some(id) = self.todo.pop_front() {
            // A commit with an unemitted child starts a branch that was
            // merged back in further up the history. Hold it back until the
            // traversal reaches it again through that child, which drains
            // the merged branch first.
            let has_unemitted_child = self
                .children
                .get(&id)
                .map(|kids| kids.iter().any(|child| !self.emitted.contains(child)))
                .unwrap_or(false);
            if has_unemitted_child {
                continue;
            }

            self.emitted.insert(id);

            // Parents go on the front of the worklist in listed order, so
            // the first-listed (mainline) parent is processed after the
            // others: depth-first descent into merged branches. A commit
            // already waiting keeps its original queue position.
            if let Some(parent_ids) = self.parents.get(&id) {
                for parent in parent_ids {
                    if !self.todo.contains(parent) {
                        self.todo.push_front(*parent);
                    }
                }
            }

            return Some(id);
        }
        None
    }
}
