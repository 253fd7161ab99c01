//! Totals for the files a populate run wrote.

use std::fs;
use std::io;
use std::path::Path;

/// Number and total size of the XML files in an output directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputSummary {
    pub files: u64,
    pub bytes: u64,
}

/// Count the `.xml` files directly inside `directory`.
pub fn summarize_output(directory: &Path) -> io::Result<OutputSummary> {
    let mut summary = OutputSummary::default();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        let is_xml = entry.path().extension().is_some_and(|ext| ext == "xml");
        if metadata.is_file() && is_xml {
            summary.files += 1;
            summary.bytes += metadata.len();
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_summarize_counts_only_xml_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("xml0.xml"), "<a/>").unwrap();
        fs::write(dir.path().join("xml1.xml"), "<root/>").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.xml")).unwrap();

        let summary = summarize_output(dir.path()).unwrap();
        assert_eq!(summary, OutputSummary { files: 2, bytes: 11 });
    }
}
