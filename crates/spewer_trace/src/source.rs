//! Source text for a frame's current line.
//!
//! Resolution never fails. It tries, in order:
//!
//! 1. The frame's file, through a [`LineCache`]. Compiled-artifact paths are
//!    mapped back to their source file first. A miss gives an empty line.
//! 2. Source the runtime re-derives for the frame's code.
//! 3. A placeholder naming the code object and instruction offset.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use spewer_foundation::Frame;

use crate::config::TracerConfig;

/// Module name used for frames without a file identity.
pub const UNKNOWN_MODULE: &str = "[unknown]";

// =============================================================================
// Line Cache
// =============================================================================

/// Files a [`LineCache`] remembers by default.
pub const DEFAULT_CACHE_FILES: usize = 256;

/// Memoized file contents, split into lines.
///
/// Each file is read once; unreadable files are remembered as such. The cache
/// holds at most `capacity` files. Past that, the file remembered longest ago
/// is forgotten first, so a tracer that sees many distinct paths stays
/// bounded.
#[derive(Debug)]
pub struct LineCache {
    files: Mutex<Files>,
    capacity: usize,
}

/// Cached files and the order they were first read in.
#[derive(Debug, Default)]
struct Files {
    lines: HashMap<PathBuf, Option<Arc<[String]>>>,
    order: VecDeque<PathBuf>,
}

impl Default for LineCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_FILES)
    }
}

impl LineCache {
    /// Creates an empty cache holding up to [`DEFAULT_CACHE_FILES`] files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache holding up to `capacity` files (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            files: Mutex::new(Files::default()),
            capacity: capacity.max(1),
        }
    }

    /// Maximum number of files remembered.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a 1-indexed line of `path`, or `None` if the file cannot be
    /// read or is too short.
    #[must_use]
    pub fn line(&self, path: &Path, line: u32) -> Option<String> {
        let index = usize::try_from(line.checked_sub(1)?).ok()?;
        self.lines(path)?.get(index).cloned()
    }

    /// Forgets one file, so the next lookup reads it again.
    pub fn invalidate(&self, path: &Path) {
        let mut files = self.files.lock();
        if files.lines.remove(path).is_some() {
            files.order.retain(|cached| cached != path);
        }
    }

    /// Forgets every file.
    pub fn clear(&self) {
        let mut files = self.files.lock();
        files.lines.clear();
        files.order.clear();
    }

    /// Number of files remembered, readable or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.lock().lines.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.lock().lines.is_empty()
    }

    fn lines(&self, path: &Path) -> Option<Arc<[String]>> {
        let mut files = self.files.lock();
        if let Some(cached) = files.lines.get(path) {
            return cached.clone();
        }
        let loaded: Option<Arc<[String]>> = match std::fs::read_to_string(path) {
            Ok(text) => Some(text.lines().map(String::from).collect()),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "source file unreadable");
                None
            }
        };
        while files.order.len() >= self.capacity {
            let Some(oldest) = files.order.pop_front() else {
                break;
            };
            files.lines.remove(&oldest);
            tracing::trace!(path = %oldest.display(), "source file evicted");
        }
        files.order.push_back(path.to_path_buf());
        files.lines.insert(path.to_path_buf(), loaded.clone());
        loaded
    }
}

// =============================================================================
// Source Resolver
// =============================================================================

/// Finds the module name and source text for a frame.
#[derive(Debug)]
pub struct SourceResolver {
    cache: LineCache,
    compiled_suffixes: Vec<(String, String)>,
}

impl Default for SourceResolver {
    fn default() -> Self {
        Self::new(&TracerConfig::default())
    }
}

impl SourceResolver {
    /// Creates a resolver using the configuration's suffix table.
    #[must_use]
    pub fn new(config: &TracerConfig) -> Self {
        Self {
            cache: LineCache::new(),
            compiled_suffixes: config.compiled_suffixes().to_vec(),
        }
    }

    /// The resolver's line cache.
    #[must_use]
    pub fn cache(&self) -> &LineCache {
        &self.cache
    }

    /// The frame's module name, or [`UNKNOWN_MODULE`] without a file
    /// identity.
    #[must_use]
    pub fn module_name(frame: &dyn Frame) -> &str {
        frame.origin().map_or(UNKNOWN_MODULE, |origin| origin.module)
    }

    /// Maps a compiled-artifact path to its source path. Other paths are
    /// returned unchanged.
    #[must_use]
    pub fn source_path(&self, path: &Path) -> PathBuf {
        let Some(text) = path.to_str() else {
            return path.to_path_buf();
        };
        self.compiled_suffixes
            .iter()
            .find_map(|(compiled, source)| {
                text.strip_suffix(compiled.as_str())
                    .map(|stem| PathBuf::from(format!("{stem}{source}")))
            })
            .unwrap_or_else(|| path.to_path_buf())
    }

    /// Source text of the frame's current line, right-trimmed.
    #[must_use]
    pub fn source_line(&self, frame: &dyn Frame) -> String {
        let line = frame.line();
        if let Some(origin) = frame.origin() {
            let path = self.source_path(origin.path);
            return self
                .cache
                .line(&path, line)
                .map(|text| text.trim_end().to_string())
                .unwrap_or_default();
        }

        match frame.reconstruct_source() {
            Ok(source) => match source.line(line) {
                Some(text) => text.trim_end().to_string(),
                None => {
                    tracing::debug!(
                        line,
                        first_line = source.first_line,
                        "line outside reconstructed source"
                    );
                    Self::placeholder(frame)
                }
            },
            Err(err) => {
                tracing::debug!(error = %err, "falling back to source placeholder");
                Self::placeholder(frame)
            }
        }
    }

    /// Text used when no source can be found.
    #[must_use]
    pub fn placeholder(frame: &dyn Frame) -> String {
        format!(
            "Unknown code named [{}]. VM instruction #{}",
            frame.code_name(),
            frame.instruction()
        )
    }
}
