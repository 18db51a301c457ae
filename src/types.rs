use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Config {
    pub vault_addr: String,
    pub vault_token: String,
    pub llm_url: String,
    pub llm_token: String,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub llm_trace_name: String,
    pub chunk_threshold_bytes: usize,
}

/// Metrics body exactly as returned by the metrics source, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMetrics(pub Vec<u8>);

impl RawMetrics {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Metrics with every undefined-value line removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedMetrics {
    pub bytes: Vec<u8>,
    pub dropped_lines: usize,
}

impl SanitizedMetrics {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPosition {
    Whole,
    FirstHalf,
    SecondHalf,
}

impl ChunkPosition {
    /// Label shown next to the narration, `None` when the payload was not split.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            ChunkPosition::Whole => None,
            ChunkPosition::FirstHalf => Some("First Half"),
            ChunkPosition::SecondHalf => Some("Second Half"),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ChunkPosition::Whole => "all metrics",
            ChunkPosition::FirstHalf => "first half",
            ChunkPosition::SecondHalf => "second half",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsChunk {
    pub position: ChunkPosition,
    pub bytes: Vec<u8>,
}

impl MetricsChunk {
    pub fn line_count(&self) -> usize {
        self.bytes.split(|b| *b == b'\n').count()
    }
}

/// Narration together with the response shape it was extracted from.
///
/// `Raw` keeps the response body untouched, even when it is not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narration {
    StructuredChoice(String),
    StructuredResult(String),
    Raw(Vec<u8>),
}

impl Narration {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Narration::StructuredChoice(t) | Narration::StructuredResult(t) => t.as_bytes(),
            Narration::Raw(body) => body,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Narration::StructuredChoice(_) => "choice",
            Narration::StructuredResult(_) => "result",
            Narration::Raw(_) => "raw",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NarrationMetadata {
    pub trace_name: String,
}

/// Body posted to the inference endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct NarrationRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub metadata: NarrationMetadata,
}
