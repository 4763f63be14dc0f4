//! Dependency graph discovery
//!
//! The [`Context`] owns every [`Unit`] in an arena; dependency edges are
//! [`UnitId`] indices into it. Hydration scans `<directory>/units`, asks the
//! introspector for each unit's dependencies and loads them recursively.
//! A unit enters the arena only after all its dependencies have, so a
//! dependency always has a smaller id than its dependents.

use crate::error::{Error, Result};
use crate::introspect::Introspect;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the subdirectory holding unit files.
pub const UNITS_DIR: &str = "units";

/// Index of a unit inside its [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

impl UnitId {
    /// Position in the context arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named, executable configuration step.
#[derive(Debug, Clone)]
pub struct Unit {
    name: String,
    file: PathBuf,
    dependencies: Vec<UnitId>,
}

impl Unit {
    /// Unit name (its file name inside the units directory)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the backing script
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Dependencies in declared order, duplicates kept
    pub fn dependencies(&self) -> &[UnitId] {
        &self.dependencies
    }
}

/// The hydrated unit graph of one context directory.
#[derive(Debug)]
pub struct Context {
    directory: PathBuf,
    units: Vec<Unit>,
    index: HashMap<String, UnitId>,
}

impl Context {
    /// Scan `<directory>/units` and build the full dependency graph.
    ///
    /// A relative `directory` is resolved against the current working
    /// directory. Every non-directory entry is loaded, in file name order.
    /// Entries whose names are not valid UTF-8 are skipped. The first
    /// failure aborts hydration; no partially built context is returned.
    pub fn hydrate(
        directory: impl Into<PathBuf>,
        introspector: &impl Introspect,
    ) -> Result<Self> {
        let directory = directory.into();
        let directory = std::path::absolute(&directory).map_err(|source| Error::UnitsDir {
            path: directory.join(UNITS_DIR),
            source,
        })?;
        let mut context = Self {
            directory,
            units: Vec::new(),
            index: HashMap::new(),
        };

        let units_dir = context.units_dir();
        log::debug!("Hydrating context from {}", units_dir.display());

        let unit_dir_error = |source: std::io::Error| Error::UnitsDir {
            path: units_dir.clone(),
            source,
        };
        let mut names = Vec::new();
        for entry in fs::read_dir(&units_dir).map_err(unit_dir_error)? {
            let entry = entry.map_err(unit_dir_error)?;
            let file_type = entry.file_type().map_err(unit_dir_error)?;
            if file_type.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => log::warn!("Skipping unit with non UTF-8 name {}", name.display()),
            }
        }
        names.sort();

        let mut loader = Loader {
            context: &mut context,
            introspector,
            visiting: Vec::new(),
        };
        for name in names {
            loader.load(&name).map_err(|e| Error::Hydration {
                unit: name.clone(),
                source: Box::new(e),
            })?;
        }

        log::info!("Loaded {} units", context.units.len());
        Ok(context)
    }

    /// Context root directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Directory holding unit files
    pub fn units_dir(&self) -> PathBuf {
        self.directory.join(UNITS_DIR)
    }

    /// Path a unit with this name is loaded from
    pub fn unit_file(&self, name: &str) -> PathBuf {
        self.units_dir().join(name)
    }

    /// Resolve a unit name to its id
    pub fn lookup(&self, name: &str) -> Option<UnitId> {
        self.index.get(name).copied()
    }

    /// Find a unit by name
    pub fn get(&self, name: &str) -> Option<&Unit> {
        self.lookup(name).map(|id| self.unit(id))
    }

    /// Access a unit by id
    ///
    /// Ids are only handed out by this context, so indexing cannot fail for
    /// ids obtained from it.
    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.0]
    }

    /// Resolve a name or fail with [`Error::UnitNotFound`]
    pub fn require(&self, name: &str) -> Result<UnitId> {
        self.lookup(name).ok_or_else(|| Error::UnitNotFound {
            name: name.to_string(),
        })
    }

    /// Direct dependencies of a unit, as units
    pub fn dependencies(&self, id: UnitId) -> impl Iterator<Item = &Unit> {
        self.unit(id).dependencies.iter().map(|&dep| self.unit(dep))
    }

    /// Number of units in the graph
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the graph has no units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// All units, dependencies before dependents
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Unit names sorted alphabetically
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.index.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// `(name, description)` for every unit, sorted by name.
    pub fn describe(&self, introspector: &impl Introspect) -> Result<Vec<(String, String)>> {
        self.names()
            .into_iter()
            .map(|name| {
                let unit = self.unit(self.index[name]);
                let description = introspector.description(&unit.name, &unit.file)?;
                Ok((unit.name.clone(), description))
            })
            .collect()
    }
}

/// Recursive, memoizing unit loader used during hydration.
struct Loader<'a, I: Introspect> {
    context: &'a mut Context,
    introspector: &'a I,
    /// Units whose dependencies are currently being loaded
    visiting: Vec<String>,
}

impl<I: Introspect> Loader<'_, I> {
    fn load(&mut self, name: &str) -> Result<UnitId> {
        if let Some(id) = self.context.lookup(name) {
            return Ok(id);
        }

        if let Some(pos) = self.visiting.iter().position(|v| v == name) {
            let mut path = self.visiting[pos..].to_vec();
            path.push(name.to_string());
            return Err(Error::Cycle { path });
        }

        let file = self.context.unit_file(name);
        let dep_names = self.introspector.dependencies(name, &file)?;
        log::debug!("{name} depends on {dep_names:?}");

        self.visiting.push(name.to_string());
        let mut dependencies = Vec::with_capacity(dep_names.len());
        for dep in &dep_names {
            match self.load(dep) {
                Ok(id) => dependencies.push(id),
                Err(e) => {
                    self.visiting.pop();
                    return Err(wrap_dependency(dep, e));
                }
            }
        }
        self.visiting.pop();

        let id = UnitId(self.context.units.len());
        self.context.units.push(Unit {
            name: name.to_string(),
            file,
            dependencies,
        });
        self.context.index.insert(name.to_string(), id);
        Ok(id)
    }
}

/// Attribute a dependency's failure to the dependency.
///
/// Cycles pass through unwrapped so the reported path stays readable.
fn wrap_dependency(dep: &str, err: Error) -> Error {
    match err {
        Error::Cycle { .. } => err,
        other => Error::Hydration {
            unit: dep.to_string(),
            source: Box::new(other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::introspect::ShellIntrospector;
    use crate::introspect::tests::write_unit;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// In-memory introspector: name -> (description, dependencies)
    #[derive(Default)]
    struct MockIntrospector {
        units: HashMap<String, (String, Vec<String>)>,
        queries: RefCell<Vec<String>>,
    }

    impl MockIntrospector {
        fn with(mut self, name: &str, deps: &[&str]) -> Self {
            self.units.insert(
                name.to_string(),
                (
                    format!("{name} unit"),
                    deps.iter().map(|d| (*d).to_string()).collect(),
                ),
            );
            self
        }

        fn missing(name: &str) -> Error {
            Error::Introspection {
                unit: name.to_string(),
                query: "dependencies",
                reason: "exit status: 1".to_string(),
                stderr: format!("{name}: No such file or directory"),
            }
        }
    }

    impl Introspect for MockIntrospector {
        fn description(&self, name: &str, _file: &Path) -> Result<String> {
            self.units
                .get(name)
                .map(|(d, _)| d.clone())
                .ok_or_else(|| Self::missing(name))
        }

        fn dependencies(&self, name: &str, _file: &Path) -> Result<Vec<String>> {
            self.queries.borrow_mut().push(name.to_string());
            self.units
                .get(name)
                .map(|(_, deps)| deps.clone())
                .ok_or_else(|| Self::missing(name))
        }
    }

    /// Create `<tmp>/units/<name>` placeholders so hydration discovers them.
    fn context_dir(names: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let units = tmp.path().join(UNITS_DIR);
        fs::create_dir(&units).unwrap();
        for name in names {
            fs::write(units.join(name), "").unwrap();
        }
        tmp
    }

    fn dep_names(ctx: &Context, name: &str) -> Vec<String> {
        let id = ctx.lookup(name).unwrap();
        ctx.dependencies(id).map(|u| u.name().to_string()).collect()
    }

    #[test]
    fn test_hydrate_independent_units() {
        let tmp = context_dir(&["a", "b", "c"]);
        let intro = MockIntrospector::default()
            .with("a", &[])
            .with("b", &[])
            .with("c", &[]);

        let ctx = Context::hydrate(tmp.path(), &intro).unwrap();
        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx.names(), vec!["a", "b", "c"]);
        assert_eq!(ctx.get("b").unwrap().file(), tmp.path().join("units").join("b"));
    }

    #[test]
    fn test_hydrate_skips_directories() {
        let tmp = context_dir(&["a"]);
        fs::create_dir(tmp.path().join(UNITS_DIR).join("lib")).unwrap();
        let intro = MockIntrospector::default().with("a", &[]);

        let ctx = Context::hydrate(tmp.path(), &intro).unwrap();
        assert_eq!(ctx.names(), vec!["a"]);
    }

    #[test]
    fn test_relative_directory_is_made_absolute() {
        let tmp = TempDir::new_in(".").unwrap();
        fs::create_dir(tmp.path().join(UNITS_DIR)).unwrap();
        fs::write(tmp.path().join(UNITS_DIR).join("a"), "").unwrap();
        assert!(tmp.path().is_relative());

        let intro = MockIntrospector::default().with("a", &[]);
        let ctx = Context::hydrate(tmp.path(), &intro).unwrap();
        assert!(ctx.directory().is_absolute());
        assert!(ctx.get("a").unwrap().file().is_absolute());
        assert_eq!(ctx.directory(), std::path::absolute(tmp.path()).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = context_dir(&["a"]);
        let invalid = OsStr::from_bytes(b"bad\xffname");
        fs::write(tmp.path().join(UNITS_DIR).join(invalid), "").unwrap();
        let intro = MockIntrospector::default().with("a", &[]);

        let ctx = Context::hydrate(tmp.path(), &intro).unwrap();
        assert_eq!(ctx.names(), vec!["a"]);
        assert_eq!(*intro.queries.borrow(), vec!["a"]);
    }

    #[test]
    fn test_dependencies_keep_declared_order() {
        let tmp = context_dir(&["app", "x", "y", "z"]);
        let intro = MockIntrospector::default()
            .with("app", &["z", "x", "y"])
            .with("x", &[])
            .with("y", &[])
            .with("z", &[]);

        let ctx = Context::hydrate(tmp.path(), &intro).unwrap();
        assert_eq!(dep_names(&ctx, "app"), vec!["z", "x", "y"]);
    }

    #[test]
    fn test_duplicate_dependencies_preserved() {
        let tmp = context_dir(&["a", "b"]);
        let intro = MockIntrospector::default().with("a", &["b", "b"]).with("b", &[]);

        let ctx = Context::hydrate(tmp.path(), &intro).unwrap();
        assert_eq!(dep_names(&ctx, "a"), vec!["b", "b"]);
    }

    #[test]
    fn test_each_unit_introspected_once() {
        let tmp = context_dir(&["a", "b", "c", "d"]);
        let intro = MockIntrospector::default()
            .with("a", &["b", "c"])
            .with("b", &["d"])
            .with("c", &["d"])
            .with("d", &[]);

        let ctx = Context::hydrate(tmp.path(), &intro).unwrap();
        assert_eq!(ctx.len(), 4);

        let mut queries = intro.queries.borrow().clone();
        queries.sort();
        assert_eq!(queries, vec!["a", "b", "c", "d"]);

        // Diamond shares a single node
        let b = ctx.lookup("b").unwrap();
        let c = ctx.lookup("c").unwrap();
        assert_eq!(ctx.unit(b).dependencies(), ctx.unit(c).dependencies());
    }

    #[test]
    fn test_dependencies_precede_dependents_in_arena() {
        let tmp = context_dir(&["a", "b", "c"]);
        let intro = MockIntrospector::default()
            .with("a", &["c"])
            .with("b", &[])
            .with("c", &["b"]);

        let ctx = Context::hydrate(tmp.path(), &intro).unwrap();
        let order: Vec<&str> = ctx.units().iter().map(Unit::name).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_missing_dependency_attributed_to_dependency() {
        let tmp = context_dir(&["app"]);
        let intro = MockIntrospector::default().with("app", &["ghost"]);

        let err = Context::hydrate(tmp.path(), &intro).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GraphConstructionFailure);
        assert_eq!(err.root_cause().kind(), ErrorKind::IntrospectionFailure);
        assert_eq!(err.unit(), Some("ghost"));
        match &err {
            Error::Hydration { unit, source } => {
                assert_eq!(unit, "app");
                assert!(matches!(**source, Error::Hydration { ref unit, .. } if unit == "ghost"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_units_dir() {
        let tmp = TempDir::new().unwrap();
        let err = Context::hydrate(tmp.path(), &MockIntrospector::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let tmp = context_dir(&["loop"]);
        let intro = MockIntrospector::default().with("loop", &["loop"]);

        let err = Context::hydrate(tmp.path(), &intro).unwrap_err();
        match err.root_cause() {
            Error::Cycle { path } => assert_eq!(path, &vec!["loop", "loop"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_mutual_dependency_is_cycle() {
        let tmp = context_dir(&["a", "b", "c"]);
        let intro = MockIntrospector::default()
            .with("a", &["b"])
            .with("b", &["c"])
            .with("c", &["a"]);

        let err = Context::hydrate(tmp.path(), &intro).unwrap_err();
        assert_eq!(err.root_cause().kind(), ErrorKind::CycleDetected);
        assert!(err.root_cause().to_string().contains("a -> b -> c -> a"));
    }

    #[test]
    fn test_require_unknown_unit() {
        let tmp = context_dir(&["a"]);
        let intro = MockIntrospector::default().with("a", &[]);
        let ctx = Context::hydrate(tmp.path(), &intro).unwrap();

        let err = ctx.require("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(ctx.get("nope").is_none());
    }

    #[test]
    fn test_describe_with_shell_units() {
        let tmp = TempDir::new().unwrap();
        let units = tmp.path().join(UNITS_DIR);
        fs::create_dir(&units).unwrap();
        write_unit(&units, "c", "Third", "", "true");
        write_unit(&units, "a", "First", "", "true");
        write_unit(&units, "b", "Second", "", "true");

        let intro = ShellIntrospector::default();
        let ctx = Context::hydrate(tmp.path(), &intro).unwrap();
        assert_eq!(ctx.len(), 3);

        let described = ctx.describe(&intro).unwrap();
        assert_eq!(
            described,
            vec![
                ("a".to_string(), "First".to_string()),
                ("b".to_string(), "Second".to_string()),
                ("c".to_string(), "Third".to_string()),
            ]
        );
    }

    #[test]
    fn test_shell_missing_dependency_file() {
        let tmp = TempDir::new().unwrap();
        let units = tmp.path().join(UNITS_DIR);
        fs::create_dir(&units).unwrap();
        write_unit(&units, "zsh", "Shell", "oh-my-zsh", "true");

        let err = Context::hydrate(tmp.path(), &ShellIntrospector::default()).unwrap_err();
        assert_eq!(err.unit(), Some("oh-my-zsh"));
    }
}
