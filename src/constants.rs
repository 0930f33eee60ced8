//! Global constants used throughout the presite codebase.
//!
//! Directory layout names, template extensions, and the missing-data
//! sentinel live here so the conventions are discoverable in one place.

/// Directory under the project root that holds renderable source files.
pub const INPUT_DIR: &str = "input";

/// Directory under the project root that backs the lazy data resolver.
///
/// Templates address data relative to this directory; the resolver anchors
/// itself here on its first traversal step.
pub const DATA_DIR: &str = "data";

/// Directory under the project root that receives rendered output.
///
/// Fully regenerated on every build; prior contents are removed first.
pub const OUTPUT_DIR: &str = "output";

/// File extension of renderable template files.
pub const TEMPLATE_EXTENSION: &str = "liquid";

/// File extension written when a render entry carries no explicit output path.
pub const RENDERED_EXTENSION: &str = "html";

/// Sentinel string returned to templates when a data path resolves to nothing.
///
/// Distinct from any valid JSON value so incomplete data trees render
/// visibly broken instead of aborting the build.
pub const MISSING_SENTINEL: &str = "[missing]";

/// Default number of concurrent render/write operations.
///
/// Twice the number of logical CPUs with a floor of 10, since most of the
/// per-file work is I/O bound rather than compute bound.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism().map_or(10, |n| (n.get() * 2).max(10))
}
