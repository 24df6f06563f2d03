//! Collision-free local file naming for downloaded media.
//!
//! Many posts share a creator, so the creator username alone is not a unique
//! file name. [`NameAllocator`] hands out `user.ext`, `user_1.ext`,
//! `user_2.ext`, ... for one directory and remembers every name it has handed
//! out, so concurrent download tasks never write to the same path.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::trace;

/// Base name used when a username sanitizes to nothing.
const FALLBACK_BASE_NAME: &str = "media";

#[derive(Debug, Default)]
struct NameRegistry {
    /// Allocations per sanitized base name.
    counts: HashMap<String, usize>,
    /// Every file name handed out so far.
    taken: HashSet<String>,
}

/// Allocates unique file names inside one directory.
///
/// Allocation takes the registry lock and reserves the returned name before
/// releasing it, so two tasks racing on the same base name always get
/// different names even before either file exists on disk.
#[derive(Debug)]
pub struct NameAllocator {
    dir: PathBuf,
    registry: Mutex<NameRegistry>,
}

impl NameAllocator {
    /// Creates an allocator for `dir`. Names already present on disk are
    /// respected at allocation time.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            registry: Mutex::new(NameRegistry::default()),
        }
    }

    /// Directory the allocated names live in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns a file name for `base_name` and `extension` that is neither on
    /// disk nor previously allocated.
    ///
    /// The plain `base.ext` is preferred; otherwise `_1`, `_2`, ... is appended
    /// to the base name, scanning upward until a free name is found.
    #[must_use]
    pub fn allocate(&self, base_name: &str, extension: &str) -> String {
        let base = {
            let sanitized = sanitize_filename(base_name);
            if sanitized.is_empty() {
                FALLBACK_BASE_NAME.to_string()
            } else {
                sanitized
            }
        };
        let extension = sanitize_filename(extension.trim().trim_start_matches('.'));

        let mut registry = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut candidate = compose_name(&base, None, &extension);
        let mut counter = 1usize;
        while registry.taken.contains(&candidate) || self.dir.join(&candidate).exists() {
            candidate = compose_name(&base, Some(counter), &extension);
            counter += 1;
        }

        registry.taken.insert(candidate.clone());
        *registry.counts.entry(base).or_default() += 1;

        trace!(name = %candidate, "allocated file name");
        candidate
    }

    /// Allocates a name and joins it onto the allocator's directory.
    #[must_use]
    pub fn allocate_path(&self, base_name: &str, extension: &str) -> PathBuf {
        self.dir.join(self.allocate(base_name, extension))
    }

    /// Number of names allocated so far for a (sanitized) base name.
    #[must_use]
    pub fn allocations(&self, base_name: &str) -> usize {
        let base = sanitize_filename(base_name);
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .counts
            .get(&base)
            .copied()
            .unwrap_or(0)
    }
}

fn compose_name(base: &str, disambiguator: Option<usize>, extension: &str) -> String {
    let stem = match disambiguator {
        Some(n) => format!("{base}_{n}"),
        None => base.to_string(),
    };
    if extension.is_empty() {
        stem
    } else {
        format!("{stem}.{extension}")
    }
}

/// Sanitizes a name component for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems
/// (`/ \ : * ? " < > |`) and control characters with `_`, and rewrites
/// dot-only names such as `..` so they cannot escape the directory.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
