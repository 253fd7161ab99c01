//! Per-cycle element operations.

use crate::error::XmlPopulatorError;
use crate::pattern::{cycle_rng, resolve_pattern};
use crate::workload::{Command, Workload};
use xmlgen_core::{DocumentSet, ElementTemplate, XmlGenError};

/// One cycle's operation with every placeholder resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementOp {
    pub cycle: u64,
    pub op_name: String,
    pub command: Command,
    pub file_index: u64,
    pub path: Vec<String>,
    pub template: ElementTemplate,
}

impl ElementOp {
    /// Resolve the op template that `cycle` selects from `workload`.
    ///
    /// The file pattern is resolved first, then the path segments, then the
    /// template text in declaration order, all from the same cycle RNG.
    pub fn resolve(workload: &Workload, seed: u64, cycle: u64) -> Result<Self, XmlPopulatorError> {
        let op = workload.op_for_cycle(cycle);
        let mut rng = cycle_rng(seed, cycle);

        let file_index = match &op.file {
            Some(pattern) => {
                let value = resolve_pattern(pattern, &mut rng, cycle);
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| XmlPopulatorError::FileIndex { cycle, value })?
            }
            None => cycle % workload.files(),
        };
        let path = op
            .path
            .iter()
            .map(|segment| resolve_pattern(segment, &mut rng, cycle))
            .collect();
        let template = op
            .template
            .map_text(&mut |text: &str| resolve_pattern(text, &mut rng, cycle));

        Ok(ElementOp {
            cycle,
            op_name: op.name.clone(),
            command: op.command,
            file_index,
            path,
            template,
        })
    }

    /// Execute the operation against `set`.
    pub fn apply(&self, set: &DocumentSet) -> Result<(), XmlGenError> {
        match self.command {
            Command::Element => set.emit(self.file_index, &self.path, &self.template),
        }
    }
}
