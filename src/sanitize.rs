use crate::types::{RawMetrics, SanitizedMetrics};

/// Token the exposition format uses for a sample without a defined value.
pub const UNDEFINED_VALUE_MARKER: &[u8] = b"NaN";

fn contains_marker(line: &[u8]) -> bool {
    line.windows(UNDEFINED_VALUE_MARKER.len())
        .any(|w| w == UNDEFINED_VALUE_MARKER)
}

pub fn sanitize(raw: &RawMetrics) -> SanitizedMetrics {
    let mut dropped_lines = 0;
    let kept: Vec<&[u8]> = raw
        .as_bytes()
        .split(|b| *b == b'\n')
        .filter(|line| {
            let keep = !contains_marker(line);
            if !keep {
                dropped_lines += 1;
            }
            keep
        })
        .collect();

    SanitizedMetrics {
        bytes: kept.join(&b'\n'),
        dropped_lines,
    }
}
