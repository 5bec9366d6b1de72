use crate::target::Trackable;

/// Origin reported when an operation has no recorded declaration site
pub const UNKNOWN_ORIGIN: &str = "unknown";

/// Default number of trailing path components kept in an origin
pub const DEFAULT_ORIGIN_SEGMENTS: usize = 5;

/// Resolves a short `path/to/file.rs:line` origin for an operation
#[derive(Debug, Clone, Copy)]
pub struct SourceLocator {
    segments: usize,
}

impl SourceLocator {
    pub fn new(segments: usize) -> Self {
        Self {
            segments: segments.max(1),
        }
    }

    /// Origin of `name` on `target`, or [`UNKNOWN_ORIGIN`]
    pub fn locate(&self, target: &dyn Trackable, name: &str) -> String {
        target
            .operations()
            .into_iter()
            .find(|op| op.name == name)
            .and_then(|op| op.declared_at)
            .map(|site| self.shorten(&site))
            .filter(|origin| !origin.is_empty())
            .unwrap_or_else(|| UNKNOWN_ORIGIN.to_string())
    }

    /// Keep only the last path components of a declaration site
    pub fn shorten(&self, site: &str) -> String {
        let normalized = site.replace('\\', "/");
        let parts: Vec<&str> = normalized.split('/').collect();
        let start = parts.len().saturating_sub(self.segments);
        parts[start..].join("/")
    }
}

impl Default for SourceLocator {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN_SEGMENTS)
    }
}
