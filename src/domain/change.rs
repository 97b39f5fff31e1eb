use git2::Oid;

/// Kind of a raw path-level change produced by the tree diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawChangeKind {
    Add,
    Delete,
    Modify,
}

/// One path-level change inside the notes subdirectory.
///
/// `path` is relative to the notes subdirectory. For a delete it is the old
/// path; for an add or modify it is the new one. The blob ids on each side
/// are kept so merge diffs can tell whether parents agreed on the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChange {
    pub kind: RawChangeKind,
    pub path: String,
    pub old_id: Option<Oid>,
    pub new_id: Option<Oid>,
}

impl RawChange {
    pub fn add(path: impl Into<String>, new_id: Oid) -> Self {
        RawChange {
            kind: RawChangeKind::Add,
            path: path.into(),
            old_id: None,
            new_id: Some(new_id),
        }
    }

    pub fn delete(path: impl Into<String>, old_id: Oid) -> Self {
        RawChange {
            kind: RawChangeKind::Delete,
            path: path.into(),
            old_id: Some(old_id),
            new_id: None,
        }
    }

    pub fn modify(path: impl Into<String>, old_id: Oid, new_id: Oid) -> Self {
        RawChange {
            kind: RawChangeKind::Modify,
            path: path.into(),
            old_id: Some(old_id),
            new_id: Some(new_id),
        }
    }
}

/// A change to one logical note, keyed by the unique id embedded in its
/// filename. Each variant carries only the fields meaningful for that case,
/// so the aggregation rules stay exhaustiveness-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeRecord {
    Add {
        uid: String,
        path: String,
        commit: String,
    },
    Delete {
        uid: String,
        path: String,
    },
    Modify {
        uid: String,
        path: String,
        commit: String,
    },
    Rename {
        uid: String,
        old_path: String,
        new_path: String,
        commit: String,
    },
}

impl ChangeRecord {
    /// The unique id of the note this record describes.
    pub fn uid(&self) -> &str {
        match self {
            ChangeRecord::Add { uid, .. } => uid,
            ChangeRecord::Delete { uid, .. } => uid,
            ChangeRecord::Modify { uid, .. } => uid,
            ChangeRecord::Rename { uid, .. } => uid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_change_constructors() {
        let id = Oid::from_bytes(&[1; 20]).unwrap();
        let add = RawChange::add("a.yaml", id);
        assert_eq!(add.kind, RawChangeKind::Add);
        assert_eq!(add.old_id, None);
        assert_eq!(add.new_id, Some(id));

        let delete = RawChange::delete("a.yaml", id);
        assert_eq!(delete.kind, RawChangeKind::Delete);
        assert_eq!(delete.old_id, Some(id));
        assert_eq!(delete.new_id, None);
    }

    #[test]
    fn test_change_record_uid() {
        let record = ChangeRecord::Rename {
            uid: "0000000000000001".to_string(),
            old_path: "old.yaml".to_string(),
            new_path: "new.yaml".to_string(),
            commit: "abc".to_string(),
        };
        assert_eq!(record.uid(), "0000000000000001");
    }
}
