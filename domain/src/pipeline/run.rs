//! Pipeline run record.

use super::output::StageOutput;
use super::plan::StageId;

/// Output of one executed stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub stage: StageId,
    pub agent_name: String,
    pub output: StageOutput,
}

/// Ordered stage outputs of one pipeline execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineRun {
    records: Vec<StageRecord>,
}

impl PipelineRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: StageRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[StageRecord] {
        &self.records
    }

    /// The last stage's output, if any stage ran.
    pub fn final_output(&self) -> Option<&StageOutput> {
        self.records.last().map(|r| &r.output)
    }

    /// Reply surfaced to the caller. Read from the final stage; if that stage
    /// produced no text, the nearest earlier stage with text stands in, and
    /// only when no stage has text does the raw final output surface.
    pub fn final_reply(&self) -> String {
        match self.records.iter().rev().find_map(|r| r.output.reply_text()) {
            Some(text) => text.to_string(),
            None => self
                .final_output()
                .map(StageOutput::extract_reply)
                .unwrap_or_default(),
        }
    }
}
