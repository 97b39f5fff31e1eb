//! Shared test fixture: builds throwaway git repositories with real commits,
//! tags, branches and merges, using deterministic timestamps so tag and
//! commit ordering is stable across runs.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use git2::build::CheckoutBuilder;
use git2::{Commit, IndexAddOption, Oid, Repository, Signature, Time};
use tempfile::TempDir;

use git_relnotes::config::Config;
use git_relnotes::scanner::NotesByVersion;
use git_relnotes::Scanner;

pub const NOTES_DIR: &str = "releasenotes/notes";

pub struct RepoFixture {
    dir: TempDir,
    pub repo: Repository,
    clock: i64,
    note_counter: u64,
}

impl RepoFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("could not create temp dir");
        let repo = Repository::init(dir.path()).expect("could not init git repo");
        {
            let mut config = repo.config().expect("could not get config");
            config.set_str("user.name", "relnotes developer").unwrap();
            config.set_str("user.email", "example@example.com").unwrap();
        }
        // Pin the unborn branch name so mainline detection is predictable.
        repo.set_head("refs/heads/master").unwrap();
        RepoFixture {
            dir,
            repo,
            clock: 1_700_000_000,
            note_counter: 0,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    fn signature(&mut self) -> Signature<'static> {
        // Space commits well apart; tag ordering follows commit timestamps.
        self.clock += 100;
        Signature::new(
            "relnotes developer",
            "example@example.com",
            &Time::new(self.clock, 0),
        )
        .unwrap()
    }

    pub fn write_file(&self, path: &str, contents: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, contents).unwrap();
    }

    /// Stage everything (including deletions) and commit on the current HEAD.
    pub fn commit_all(&mut self, message: &str) -> Oid {
        let sig = self.signature();
        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"], IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"], None).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit().unwrap()),
            Err(_) => None,
        };
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    pub fn add_file(&mut self, name: &str) -> Oid {
        self.write_file(name, &format!("adding {}\n", name));
        self.commit_all(&format!("add {}", name))
    }

    pub fn delete_file(&mut self, path: &str, message: &str) -> Oid {
        fs::remove_file(self.dir.path().join(path)).unwrap();
        self.commit_all(message)
    }

    pub fn next_note_num(&mut self) -> u64 {
        self.note_counter += 1;
        self.note_counter
    }

    /// Commit a note file using the modern `<slug>-<16 hex>.yaml` naming and
    /// return its repository-relative path.
    pub fn add_note(&mut self, slug: &str) -> String {
        let n = self.next_note_num();
        self.add_named_note(&format!("{}-{:016x}.yaml", slug, n))
    }

    /// Commit a note file using the legacy `<16 hex>-<slug>.yaml` naming.
    pub fn add_legacy_note(&mut self, slug: &str) -> String {
        let n = self.next_note_num();
        self.add_named_note(&format!("{:016x}-{}.yaml", n, slug))
    }

    pub fn add_named_note(&mut self, basename: &str) -> String {
        let relpath = format!("{}/{}", NOTES_DIR, basename);
        self.write_file(&relpath, "---\nfeatures:\n  - a change\n");
        self.commit_all(&format!("add {}", basename));
        relpath
    }

    pub fn tag(&mut self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo
            .tag_lightweight(name, head.as_object(), false)
            .unwrap();
    }

    pub fn tag_annotated(&mut self, name: &str) {
        let sig = self.signature();
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo
            .tag(name, head.as_object(), &sig, &format!("tag {}", name), false)
            .unwrap();
    }

    /// Create a branch at HEAD and check it out.
    pub fn create_branch(&mut self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        let head_id = head.id();
        drop(head);
        self.branch_at(name, head_id);
    }

    /// Create a branch at a specific commit and check it out.
    pub fn branch_at(&mut self, name: &str, target: Oid) {
        let commit = self.repo.find_commit(target).unwrap();
        self.repo.branch(name, &commit, false).unwrap();
        drop(commit);
        self.checkout(name);
    }

    pub fn checkout(&mut self, name: &str) {
        self.repo.set_head(&format!("refs/heads/{}", name)).unwrap();
        let mut builder = CheckoutBuilder::new();
        builder.force();
        self.repo.checkout_head(Some(&mut builder)).unwrap();
    }

    /// Merge another branch into the current one with a real merge commit,
    /// even when a fast-forward would be possible.
    pub fn merge_branch(&mut self, other: &str, message: &str) -> Oid {
        let sig = self.signature();
        let ours = self.repo.head().unwrap().peel_to_commit().unwrap();
        let theirs = self
            .repo
            .find_reference(&format!("refs/heads/{}", other))
            .unwrap()
            .peel_to_commit()
            .unwrap();

        let mut merged = self.repo.merge_commits(&ours, &theirs, None).unwrap();
        assert!(!merged.has_conflicts(), "unexpected merge conflict");
        let tree_id = merged.write_tree_to(&self.repo).unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let merge_id = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&ours, &theirs])
            .unwrap();

        drop(tree);
        drop(ours);
        drop(theirs);
        // Bring the working tree and index up to the merge result.
        let mut builder = CheckoutBuilder::new();
        builder.force();
        self.repo.checkout_head(Some(&mut builder)).unwrap();
        merge_id
    }
}

pub fn scan(fixture: &RepoFixture) -> NotesByVersion {
    scan_with(fixture, |_| {})
}

pub fn scan_with(fixture: &RepoFixture, tweak: impl FnOnce(&mut Config)) -> NotesByVersion {
    let mut config = Config {
        reporoot: fixture.root().to_path_buf(),
        ..Config::default()
    };
    tweak(&mut config);
    Scanner::new(config)
        .expect("could not open scanner")
        .notes_by_version()
        .expect("scan failed")
}

pub fn scanner_with(fixture: &RepoFixture, tweak: impl FnOnce(&mut Config)) -> Scanner {
    let mut config = Config {
        reporoot: fixture.root().to_path_buf(),
        ..Config::default()
    };
    tweak(&mut config);
    Scanner::new(config).expect("could not open scanner")
}

/// Reduce scan results to version labels and note paths, dropping the
/// owning-commit hashes that vary per run.
pub fn paths_only(results: &NotesByVersion) -> Vec<(String, Vec<String>)> {
    results
        .iter()
        .map(|(version, notes)| {
            (
                version.clone(),
                notes.iter().map(|note| note.path.clone()).collect(),
            )
        })
        .collect()
}
