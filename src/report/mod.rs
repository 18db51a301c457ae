use chrono::{DateTime, Utc};

use crate::types::*;

/// Narrated health report, one section per chunk in chunk order
#[derive(Debug)]
pub struct HealthReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub raw_bytes: usize,
    pub sanitized_bytes: usize,
    pub dropped_lines: usize,
    pub sections: Vec<ReportSection>,
}

#[derive(Debug)]
pub struct ReportSection {
    pub position: ChunkPosition,
    pub narration: Narration,
}

impl HealthReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: None,
            raw_bytes: 0,
            sanitized_bytes: 0,
            dropped_lines: 0,
            sections: Vec::new(),
        }
    }

    pub fn set_input_stats(&mut self, raw: &RawMetrics, sanitized: &SanitizedMetrics) {
        self.raw_bytes = raw.len();
        self.sanitized_bytes = sanitized.len();
        self.dropped_lines = sanitized.dropped_lines;
    }

    pub fn add_section(&mut self, position: ChunkPosition, narration: Narration) {
        self.sections.push(ReportSection { position, narration });
    }

    pub fn finish(&mut self, finished_at: DateTime<Utc>) {
        self.finished_at = Some(finished_at);
    }

    /// Operator-facing output. Sections are only labelled when the payload was split.
    ///
    /// Narrations are written as received, so raw bodies keep any invalid UTF-8.
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            let heading = match section.position.label() {
                Some(label) => format!("LLM Analysis Result ({}):\n", label),
                None => "LLM Analysis Result:\n".to_string(),
            };
            out.extend_from_slice(heading.as_bytes());
            out.extend_from_slice(section.narration.as_bytes());
            out.push(b'\n');
        }
        out
    }

    pub fn summary(&self) -> ReportSummary {
        let elapsed_ms = self
            .finished_at
            .map(|f| (f - self.started_at).num_milliseconds())
            .unwrap_or(0);
        ReportSummary {
            section_count: self.sections.len(),
            raw_bytes: self.raw_bytes,
            sanitized_bytes: self.sanitized_bytes,
            dropped_lines: self.dropped_lines,
            raw_fallback_count: self
                .sections
                .iter()
                .filter(|s| matches!(s.narration, Narration::Raw(_)))
                .count(),
            elapsed_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub section_count: usize,
    pub raw_bytes: usize,
    pub sanitized_bytes: usize,
    pub dropped_lines: usize,
    pub raw_fallback_count: usize,
    pub elapsed_ms: i64,
}

impl ReportSummary {
    pub fn was_split(&self) -> bool {
        self.section_count > 1
    }
}
