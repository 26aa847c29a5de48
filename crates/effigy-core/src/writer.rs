//! Fixture output
//!
//! A [`Fixture`] wraps a serialized trace in a function returning the
//! populated type. [`FixtureWriter`] implementations decide where the
//! rendered source ends up.

use crate::error::WriteError;
use effigy_trace::{SerializedTrace, SymbolRefs};
use effigy_types::TypeDescriptor;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Serialized trace packaged as a named function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// Function name
    pub name: String,
    /// Type the function returns
    pub return_type: TypeDescriptor,
    /// Statements building the value
    pub trace: SerializedTrace,
}

impl Fixture {
    /// Create a fixture
    #[must_use]
    pub fn new(name: impl Into<String>, return_type: TypeDescriptor, trace: SerializedTrace) -> Self {
        Self {
            name: name.into(),
            return_type,
            trace,
        }
    }

    /// Whether the name is usable as a function identifier
    #[must_use]
    pub fn has_valid_name(&self) -> bool {
        let mut chars = self.name.chars();
        chars
            .next()
            .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
            && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
    }

    /// Render as a standalone source file
    #[must_use]
    pub fn render(&self) -> String {
        let mut refs = SymbolRefs {
            imports: self.trace.imports.clone(),
            ..SymbolRefs::default()
        };
        refs.add_type(&self.return_type);

        let mut out: String = refs.imports.iter().map(|path| format!("use {path};\n")).collect();
        if !refs.imports.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("pub fn {}() -> {} {{\n", self.name, self.return_type));
        for statement in &self.trace.statements {
            out.push_str(&format!("    {statement}\n"));
        }
        out.push_str(&format!("    {}\n}}\n", self.trace.root));
        out
    }
}

/// Destination for rendered fixtures
pub trait FixtureWriter {
    /// Persist one fixture
    ///
    /// # Errors
    /// [`WriteError::InvalidName`] for a name that is not an identifier, or
    /// the writer's own I/O failure.
    fn write(&mut self, fixture: &Fixture) -> Result<(), WriteError>;
}

/// Writes each fixture to `<dir>/<name>.rs`
#[derive(Debug, Clone)]
pub struct DirectoryWriter {
    dir: PathBuf,
}

impl DirectoryWriter {
    /// Writer targeting `dir`, created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a fixture named `name` is written to
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.rs"))
    }
}

impl FixtureWriter for DirectoryWriter {
    fn write(&mut self, fixture: &Fixture) -> Result<(), WriteError> {
        if !fixture.has_valid_name() {
            return Err(WriteError::InvalidName(fixture.name.clone()));
        }
        std::fs::create_dir_all(&self.dir).map_err(|source| WriteError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(&fixture.name);
        std::fs::write(&path, fixture.render()).map_err(|source| WriteError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Wrote fixture {} to {}", fixture.name, path.display());
        Ok(())
    }
}

/// Keeps rendered fixtures in memory, keyed by name
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    rendered: BTreeMap<String, String>,
}

impl MemoryWriter {
    /// Empty writer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered source of `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.rendered.get(name).map(String::as_str)
    }

    /// Number of fixtures written
    #[must_use]
    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    /// Check if nothing was written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}

impl FixtureWriter for MemoryWriter {
    fn write(&mut self, fixture: &Fixture) -> Result<(), WriteError> {
        if !fixture.has_valid_name() {
            return Err(WriteError::InvalidName(fixture.name.clone()));
        }
        self.rendered.insert(fixture.name.clone(), fixture.render());
        Ok(())
    }
}
