//! Shared helpers for the populate tests.

use loadtest_populate_xml::{CommonPopulateArgs, XmlPopulateArgs};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const LIBRARY_WORKLOAD: &str = "tests/fixtures/library_workload.yaml";
pub const BROKEN_NAMES_WORKLOAD: &str = "tests/fixtures/broken_names_workload.yaml";

pub fn populate_args(workload: &str, output_dir: &Path, cycles: u64, threads: usize) -> XmlPopulateArgs {
    XmlPopulateArgs {
        output_dir: output_dir.to_path_buf(),
        root: None,
        common: CommonPopulateArgs {
            workload: PathBuf::from(workload),
            cycles,
            start_cycle: 0,
            threads,
            seed: None,
            dry_run: false,
        },
    }
}

/// Element counts of one parsed document.
#[derive(Debug, Default)]
pub struct DocumentStats {
    pub root: Option<String>,
    pub elements: HashMap<String, usize>,
}

impl DocumentStats {
    pub fn count(&self, name: &str) -> usize {
        self.elements.get(name).copied().unwrap_or(0)
    }
}

/// Parse `path`, panicking if the document is not well formed.
pub fn parse_document(path: &Path) -> DocumentStats {
    let xml = std::fs::read_to_string(path).expect("Failed to read document");
    let mut reader = Reader::from_str(&xml);
    let mut stats = DocumentStats::default();
    let mut depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .unwrap_or_else(|e| panic!("{}: malformed XML: {e}", path.display()));
        let start = match &event {
            Event::Start(start) | Event::Empty(start) => Some(start),
            _ => None,
        };
        if let Some(start) = start {
            let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
            if depth == 0 {
                assert!(stats.root.is_none(), "{}: multiple root elements", path.display());
                stats.root = Some(name.clone());
            }
            *stats.elements.entry(name).or_insert(0) += 1;
        }
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => break,
            _ => {}
        }
    }

    assert_eq!(depth, 0, "{}: unbalanced document", path.display());
    stats
}
