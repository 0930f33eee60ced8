//! Lazy hierarchical data resolver.
//!
//! Templates pull structured data on demand through a path-addressed view of
//! the project's `data/` directory. Nothing is loaded up front: each
//! traversal segment is resolved against the filesystem only when it is
//! actually taken. A directory becomes a further-traversable node, a
//! `<name>.json` file becomes a parsed value, and anything else becomes the
//! [`MISSING_SENTINEL`] so an incomplete data tree never aborts a render.
//!
//! The tested contract is the explicit [`LazyResolver::step`] /
//! [`LazyResolver::get`] API. The dynamic template-facing layer (the `data`
//! function registered by the Tera renderer) is a thin wrapper over
//! [`LazyResolver::get`].

use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::constants::{DATA_DIR, MISSING_SENTINEL};

/// A position within the data directory tree.
///
/// Nodes are immutable values: every traversal step produces a new node
/// rather than mutating the current one. The root node starts
/// [`Uninitialized`](ResolverNode::Uninitialized) and is transparently
/// redirected under the data root on its first real step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverNode {
    /// A root node that has not yet taken a traversal step.
    Uninitialized,
    /// A node anchored at `cursor`, a relative path under the project root
    /// whose first component is the data directory.
    Anchored {
        /// Accumulated relative path from the project root
        cursor: PathBuf,
    },
}

impl ResolverNode {
    /// The cursor path of an anchored node, or `None` for the root.
    #[must_use]
    pub fn cursor(&self) -> Option<&Path> {
        match self {
            Self::Uninitialized => None,
            Self::Anchored { cursor } => Some(cursor),
        }
    }
}

/// Result of resolving one traversal step.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A directory exists at the candidate path; traversal may continue.
    Node(ResolverNode),
    /// A `.json` leaf was found and parsed; traversal terminates in a value.
    Value(Value),
    /// No directory or parseable leaf exists at the candidate path.
    Missing,
}

impl Resolution {
    /// Materialize this resolution as a JSON value for template consumption.
    ///
    /// Both a missing entry and a terminal hit on a directory node collapse
    /// to the sentinel string; only `.json` leaves (or values indexed out of
    /// them) carry real data into a template.
    #[must_use]
    pub fn into_template_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Node(_) | Self::Missing => Value::String(MISSING_SENTINEL.to_string()),
        }
    }

    /// Whether this resolution is the missing-data sentinel.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// On-demand, path-addressed accessor over a project's data directory.
///
/// One resolver is constructed per build pass and shared read-only across
/// all concurrent renders. It holds only the project root path; every
/// [`step`](Self::step) is an independent, idempotent filesystem probe, so
/// concurrent traversals cannot corrupt each other.
#[derive(Debug, Clone)]
pub struct LazyResolver {
    project_root: PathBuf,
}

impl LazyResolver {
    /// Create a resolver rooted at a project directory.
    ///
    /// The root is captured once here and inherited by every node derived
    /// from the resolver; there is no process-wide state.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// The uninitialized root node.
    #[must_use]
    pub const fn root(&self) -> ResolverNode {
        ResolverNode::Uninitialized
    }

    /// Resolve a single path segment against a node.
    ///
    /// An uninitialized root first anchors itself under [`DATA_DIR`] and
    /// resolves the same segment again, so callers cannot observe the
    /// redirect. Otherwise the candidate path is `cursor/segment` under the
    /// project root:
    ///
    /// 1. a directory there yields a new [`ResolverNode`] (directories
    ///    shadow same-named `.json` files),
    /// 2. else a `<candidate>.json` file yields its parsed content,
    /// 3. else the result is [`Resolution::Missing`].
    ///
    /// Filesystem and JSON-parse failures are treated as absent entries and
    /// never surface to the caller.
    pub fn step(&self, node: &ResolverNode, segment: &str) -> Resolution {
        let cursor = match node {
            ResolverNode::Uninitialized => {
                trace!("anchoring resolver at {DATA_DIR}/ for segment '{segment}'");
                let anchored = ResolverNode::Anchored {
                    cursor: PathBuf::from(DATA_DIR),
                };
                return self.step(&anchored, segment);
            }
            ResolverNode::Anchored { cursor } => cursor,
        };

        if !is_plain_segment(segment) {
            warn!("rejecting data segment with path syntax: '{segment}'");
            return Resolution::Missing;
        }

        let next = cursor.join(segment);
        let candidate = self.project_root.join(&next);
        trace!("resolving data step at {}", candidate.display());

        if candidate.is_dir() {
            return Resolution::Node(ResolverNode::Anchored { cursor: next });
        }

        let leaf = json_leaf_path(&candidate);
        if leaf.is_file() {
            return match read_json_leaf(&leaf) {
                Some(value) => Resolution::Value(value),
                None => Resolution::Missing,
            };
        }

        debug!("no data at {}", candidate.display());
        Resolution::Missing
    }

    /// Resolve a full path of segments, starting from the root node.
    ///
    /// Drives [`step`](Self::step) while the resolution is a node; once a
    /// JSON value is reached, remaining segments index into it (object keys,
    /// or numeric indices for arrays). A missing key or index yields
    /// [`Resolution::Missing`], never an error.
    pub fn get<I, S>(&self, segments: I) -> Resolution
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut current = Resolution::Node(self.root());

        for segment in segments {
            let segment = segment.as_ref();
            current = match current {
                Resolution::Node(node) => self.step(&node, segment),
                Resolution::Value(value) => index_value(value, segment),
                Resolution::Missing => return Resolution::Missing,
            };
        }

        current
    }
}

/// Index into a parsed JSON value with one path segment.
fn index_value(value: Value, segment: &str) -> Resolution {
    match value {
        Value::Object(mut map) => map.remove(segment).map_or(Resolution::Missing, Resolution::Value),
        Value::Array(array) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| array.get(index).cloned())
            .map_or(Resolution::Missing, Resolution::Value),
        _ => Resolution::Missing,
    }
}

/// Append `.json` to a candidate path without touching existing dots.
///
/// `Path::with_extension` would truncate a segment like `v1.2`, so the
/// suffix is appended to the raw OS string instead.
fn json_leaf_path(candidate: &Path) -> PathBuf {
    let mut leaf = candidate.as_os_str().to_owned();
    leaf.push(".json");
    PathBuf::from(leaf)
}

/// A segment must be a single normal path component; separators and `..`
/// would let a template escape the data directory.
fn is_plain_segment(segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn read_json_leaf(leaf: &Path) -> Option<Value> {
    let raw = match fs::read_to_string(leaf) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("unreadable data leaf {}: {e}", leaf.display());
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            // Lenient by design: a half-written data file resolves to the
            // sentinel instead of failing the build.
            warn!("malformed JSON in {}: {e}", leaf.display());
            None
        }
    }
}
