use std::fmt;

/// Non-fatal conditions encountered while scanning note history.
/// These are reported as diagnostics and the scan continues.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanWarning {
    /// A file under the notes subdirectory that is not a note file
    IgnoredFile { path: String },
    /// A note id whose final path could not be determined
    UnresolvableNote { uid: String },
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanWarning::IgnoredFile { path } => {
                write!(f, "found and ignored extra file {}", path)
            }
            ScanWarning::UnresolvableNote { uid } => {
                write!(
                    f,
                    "unable to find release notes file associated with unique id '{}', skipping",
                    uid
                )
            }
        }
    }
}
