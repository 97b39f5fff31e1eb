use std::cell::OnceCell;
use std::path::Path;

use git2::{Commit, Oid, Repository, Sort, Tree};
use tracing::debug;

use crate::error::{RelnotesError, Result};
use crate::git::tags::TagIndex;

/// Read-only wrapper around a git repository for history scanning.
///
/// Provides ref resolution, tag lookup, subtree and blob access. All methods
/// read the committed object store only; working-tree state is never
/// observed. The accessor owns a lazily-built tag index, so it must not be
/// shared across concurrent scans.
pub struct RepoAccessor {
    repo: Repository,
    tags: OnceCell<TagIndex>,
}

impl RepoAccessor {
    /// Discover and open the repository containing `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path.as_ref())?;
        debug!("opened git repository at {:?}", repo.path());
        Ok(RepoAccessor {
            repo,
            tags: OnceCell::new(),
        })
    }

    fn tag_index(&self) -> Result<&TagIndex> {
        if let Some(index) = self.tags.get() {
            return Ok(index);
        }
        let built = TagIndex::build(&self.repo)?;
        Ok(self.tags.get_or_init(|| built))
    }

    /// Resolve a ref name to the commit it points at.
    ///
    /// `None` resolves the current HEAD. A named ref is tried as a local
    /// branch, a remote-tracking branch, a tag, and finally the EOL tag left
    /// behind when a stable branch is retired (`<basename>-eol`). Annotated
    /// tags are dereferenced to their target commit.
    ///
    /// # Returns
    /// * `Ok(Oid)` - The resolved commit id
    /// * `Err(RelnotesError::Reference)` - If no candidate matches
    pub fn resolve_ref(&self, name: Option<&str>) -> Result<Oid> {
        let name = match name {
            Some(name) => name,
            None => {
                let head = self.repo.head()?;
                return Ok(head.peel_to_commit()?.id());
            }
        };

        let short = name.rsplit('/').next().unwrap_or(name);
        let candidates = [
            format!("refs/heads/{}", name),
            format!("refs/remotes/{}", name),
            format!("refs/tags/{}", name),
            format!("refs/tags/{}-eol", short),
        ];
        for candidate in &candidates {
            if let Ok(reference) = self.repo.find_reference(candidate) {
                return Ok(reference.peel_to_commit()?.id());
            }
        }
        Err(RelnotesError::reference(name))
    }

    /// The tag names on a commit, in application order (empty if none).
    ///
    /// Where one canonical name is needed, callers take the last entry.
    pub fn tags_on_commit(&self, id: Oid) -> Result<Vec<String>> {
        Ok(self.tag_index()?.tags_on_commit(id).to_vec())
    }

    /// Look up a commit object.
    pub fn find_commit(&self, id: Oid) -> Result<Commit<'_>> {
        Ok(self.repo.find_commit(id)?)
    }

    /// Look up a tree object.
    pub fn tree(&self, id: Oid) -> Result<Tree<'_>> {
        Ok(self.repo.find_tree(id)?)
    }

    /// The object id of the subtree at `path` within a commit's tree, or
    /// `None` when any path component is absent at that commit.
    pub fn subtree_id(&self, commit: &Commit<'_>, path: &str) -> Result<Option<Oid>> {
        let tree = commit.tree()?;
        self.entry_at(&tree, path)
    }

    /// The committed bytes of the file at `path` in the given commit, or
    /// `None` when the path does not exist there (or names a directory).
    pub fn file_at_commit(&self, path: &str, commit_id: Oid) -> Result<Option<Vec<u8>>> {
        let commit = self.repo.find_commit(commit_id)?;
        let tree = commit.tree()?;
        let entry_id = match self.entry_at(&tree, path)? {
            Some(id) => id,
            None => return Ok(None),
        };
        match self.repo.find_blob(entry_id) {
            Ok(blob) => Ok(Some(blob.content().to_vec())),
            Err(_) => Ok(None),
        }
    }

    /// All commits reachable from `head`, most recent first by commit time.
    pub fn commits_by_date(&self, head: Oid) -> Result<Vec<Oid>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push(head)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            commits.push(oid?);
        }
        Ok(commits)
    }

    /// Descend `path` one component at a time from `tree`, returning the
    /// object id of the final component. A missing component is not an
    /// error; it means nothing exists at that path in this tree.
    fn entry_at(&self, tree: &Tree<'_>, path: &str) -> Result<Option<Oid>> {
        let mut current = tree.clone();
        let mut components = path.split('/').filter(|c| !c.is_empty()).peekable();

        while let Some(component) = components.next() {
            let id = match current.get_name(component) {
                Some(entry) => entry.id(),
                None => return Ok(None),
            };
            if components.peek().is_none() {
                return Ok(Some(id));
            }
            current = match self.repo.find_tree(id) {
                Ok(subtree) => subtree,
                // An intermediate component that is not a tree means the
                // remainder of the path cannot exist.
                Err(_) => return Ok(None),
            };
        }
        Ok(None)
    }
}
