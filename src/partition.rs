use crate::types::{ChunkPosition, MetricsChunk, SanitizedMetrics};

/// Splits the payload into halves by line count once it exceeds `threshold_bytes`.
///
/// The split bisects lines, not bytes, so either half can still be larger than
/// the threshold when lines are long. Joining the two halves' lines with `\n`
/// gives back the input unchanged.
pub fn partition(sanitized: &SanitizedMetrics, threshold_bytes: usize) -> Vec<MetricsChunk> {
    if sanitized.len() <= threshold_bytes {
        return vec![MetricsChunk {
            position: ChunkPosition::Whole,
            bytes: sanitized.bytes.clone(),
        }];
    }

    let lines: Vec<&[u8]> = sanitized.as_bytes().split(|b| *b == b'\n').collect();
    let mid = lines.len() / 2;

    vec![
        MetricsChunk {
            position: ChunkPosition::FirstHalf,
            bytes: lines[..mid].join(&b'\n'),
        },
        MetricsChunk {
            position: ChunkPosition::SecondHalf,
            bytes: lines[mid..].join(&b'\n'),
        },
    ]
}
