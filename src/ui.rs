//! Console output: error reporting and the scan report listing.

use console::style;

use crate::scanner::NotesByVersion;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a status message.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Print the version → note files report, most recent version first.
pub fn display_scan_report(results: &NotesByVersion, show_commits: bool) {
    for (version, notes) in results {
        println!("{}", style(version).bold());
        for note in notes {
            if show_commits {
                println!("  {} ({})", note.path, short_hash(&note.commit));
            } else {
                println!("  {}", note.path);
            }
        }
    }
}

fn short_hash(hash: &str) -> &str {
    if hash.len() > 7 {
        &hash[..7]
    } else {
        hash
    }
}
