//! Declaration file loading and the project-wide declaration index
//!
//! Every `.d.ts` under the input root is parsed up front, in a stable
//! path-sorted order, so later stages see a deterministic sequence. The
//! [`DeclIndex`] maps type names to their interface, alias and enum
//! declarations across all files; the type parser resolves named references
//! through it.

use crate::diagnostics::{GenError, GenResult};
use crate::utils::swc::{self, ParsedModule, TopLevelDecl};
use deno_ast::swc::ast as swc_ast;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions treated as declaration files
const DECLARATION_SUFFIXES: &[&str] = &[".d.ts", ".d.cts", ".d.mts"];

/// Base names of aggregator files
const BARREL_FILES: &[&str] = &["index.d.ts", "index.d.cts", "types.d.ts", "bridge.d.ts"];

/// Check if a path names a declaration file
pub fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .map(|f| f.to_string_lossy())
        .is_some_and(|f| DECLARATION_SUFFIXES.iter().any(|s| f.ends_with(s)))
}

/// Check if a path names a barrel file
pub fn is_barrel_file(path: &Path) -> bool {
    path.file_name()
        .map(|f| f.to_string_lossy())
        .is_some_and(|f| BARREL_FILES.contains(&f.as_ref()))
}

/// A file that could not be parsed
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Where a named declaration lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclLocation {
    /// Index into [`SourceSet::modules`]
    pub module: usize,
    /// Index into the module body
    pub item: usize,
}

/// Name to declaration lookup across all loaded files
#[derive(Debug, Default)]
pub struct DeclIndex {
    entries: IndexMap<String, Vec<DeclLocation>>,
}

impl DeclIndex {
    fn insert(&mut self, name: String, location: DeclLocation) {
        self.entries.entry(name).or_default().push(location);
    }

    /// All declarations for a name; interfaces may be declared more than once
    pub fn get(&self, name: &str) -> &[DeclLocation] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A resolved named declaration
#[derive(Debug, Clone, Copy)]
pub struct NamedDecl<'a> {
    pub module: &'a ParsedModule,
    pub decl: TopLevelDecl<'a>,
}

/// A value declaration (`declare function` / `declare const`)
#[derive(Debug, Clone, Copy)]
pub enum ValueDecl<'a> {
    Function {
        module: &'a ParsedModule,
        function: &'a swc_ast::Function,
    },
    Variable {
        module: &'a ParsedModule,
        declarator: &'a swc_ast::VarDeclarator,
    },
}

/// Type annotation of a `const name: T` declarator
pub fn declarator_type(declarator: &swc_ast::VarDeclarator) -> Option<&swc_ast::TsType> {
    match &declarator.name {
        swc_ast::Pat::Ident(binding) => binding.type_ann.as_deref().map(|a| a.type_ann.as_ref()),
        _ => None,
    }
}

/// All declaration files of one input tree
#[derive(Debug, Default)]
pub struct SourceSet {
    pub root: PathBuf,
    pub modules: Vec<ParsedModule>,
    pub failures: Vec<LoadFailure>,
    index: DeclIndex,
}

impl SourceSet {
    /// Load every declaration file under `root` (or `root` itself if it is a file)
    pub fn load(root: impl AsRef<Path>) -> GenResult<Self> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(GenError::InvalidPath(format!(
                "source path does not exist: {}",
                root.display()
            )));
        }

        // deno_ast wants absolute file specifiers
        let root = std::fs::canonicalize(root)?;

        let mut files = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                GenError::Io(std::io::Error::other(format!(
                    "Failed to walk {}: {}",
                    root.display(),
                    e
                )))
            })?;
            if entry.file_type().is_file() && is_declaration_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        tracing::debug!(root = %root.display(), files = files.len(), "loading declaration files");

        let mut set = Self {
            root,
            ..Self::default()
        };
        for path in files {
            match swc::parse_typescript_file(&path) {
                Ok(module) => set.modules.push(module),
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping unparseable file");
                    set.failures.push(LoadFailure {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }
        set.rebuild_index();
        Ok(set)
    }

    /// Build a set from in-memory sources; paths must be absolute
    pub fn from_sources<P, S>(sources: impl IntoIterator<Item = (P, S)>) -> Self
    where
        P: AsRef<Path>,
        S: Into<std::sync::Arc<str>>,
    {
        let mut set = Self::default();
        for (path, text) in sources {
            let path = path.as_ref();
            match swc::parse_typescript_source(path, text) {
                Ok(module) => set.modules.push(module),
                Err(e) => set.failures.push(LoadFailure {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }),
            }
        }
        set.rebuild_index();
        set
    }

    fn rebuild_index(&mut self) {
        let mut index = DeclIndex::default();
        for (module_idx, module) in self.modules.iter().enumerate() {
            let Ok(ast) = module.module() else { continue };
            for (item_idx, item) in ast.body.iter().enumerate() {
                let Some(decl) = TopLevelDecl::from_item(item) else {
                    continue;
                };
                let indexed = matches!(
                    decl.decl,
                    swc_ast::Decl::TsInterface(_)
                        | swc_ast::Decl::TsTypeAlias(_)
                        | swc_ast::Decl::TsEnum(_)
                );
                if let (true, Some(name)) = (indexed, decl.name()) {
                    index.insert(
                        name,
                        DeclLocation {
                            module: module_idx,
                            item: item_idx,
                        },
                    );
                }
            }
        }
        self.index = index;
    }

    pub fn index(&self) -> &DeclIndex {
        &self.index
    }

    /// Look up the declarations of a type name, in load order
    pub fn lookup(&self, name: &str) -> Vec<NamedDecl<'_>> {
        self.index
            .get(name)
            .iter()
            .filter_map(|loc| {
                let module = self.modules.get(loc.module)?;
                let item = module.module().ok()?.body.get(loc.item)?;
                Some(NamedDecl {
                    module,
                    decl: TopLevelDecl::from_item(item)?,
                })
            })
            .collect()
    }

    /// First declaration of a type name
    pub fn lookup_first(&self, name: &str) -> Option<NamedDecl<'_>> {
        self.lookup(name).into_iter().next()
    }

    /// Find a function or variable declaration by name, in load order
    pub fn lookup_value(&self, name: &str) -> Option<ValueDecl<'_>> {
        for module in &self.modules {
            let Ok(decls) = module.top_level_decls() else {
                continue;
            };
            for top in decls {
                match top.decl {
                    swc_ast::Decl::Fn(f) if &*f.ident.sym == name => {
                        return Some(ValueDecl::Function {
                            module,
                            function: &f.function,
                        });
                    }
                    swc_ast::Decl::Var(v) => {
                        let found = v.decls.iter().find(|d| {
                            matches!(&d.name, swc_ast::Pat::Ident(b) if &*b.id.sym == name)
                        });
                        if let Some(declarator) = found {
                            return Some(ValueDecl::Variable { module, declarator });
                        }
                    }
                    _ => {}
                }
            }
        }
        None
    }

    /// Find a module by file name
    pub fn module_named(&self, file_name: &str) -> Option<&ParsedModule> {
        self.modules.iter().find(|m| {
            m.path()
                .file_name()
                .is_some_and(|f| f.to_string_lossy() == file_name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_declaration_and_barrel_detection() {
        assert!(is_declaration_file(Path::new("/x/appLogin.d.ts")));
        assert!(is_declaration_file(Path::new("index.d.cts")));
        assert!(!is_declaration_file(Path::new("main.ts")));
        assert!(is_barrel_file(Path::new("/x/index.d.ts")));
        assert!(is_barrel_file(Path::new("bridge.d.ts")));
        assert!(!is_barrel_file(Path::new("getLocale.d.ts")));
    }

    #[test]
    fn test_load_sorted_and_skip_failures() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.d.ts"), "export declare function b(): void;").unwrap();
        std::fs::write(dir.path().join("a.d.ts"), "export interface A { x: number }").unwrap();
        std::fs::write(dir.path().join("broken.d.ts"), "export declare function (").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let set = SourceSet::load(dir.path()).unwrap();
        let names: Vec<String> = set.modules.iter().map(|m| m.stem()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(set.failures.len(), 1);
        assert!(set.failures[0].path.ends_with("broken.d.ts"));
        assert!(set.index().contains("A"));
    }

    #[test]
    fn test_lookup_across_files() {
        let set = SourceSet::from_sources([
            ("/tmp/one.d.ts", "export interface Location { lat: number }"),
            ("/tmp/two.d.ts", "interface Location { lng: number }\nexport type Id = string;"),
        ]);
        assert_eq!(set.lookup("Location").len(), 2);
        assert!(set.lookup_first("Id").is_some());
        assert!(set.lookup_first("Missing").is_none());
    }

    #[test]
    fn test_lookup_value() {
        let set = SourceSet::from_sources([(
            "/tmp/v.d.ts",
            "export declare function getLocale(): string;\nexport declare const IAP: { a(): void };",
        )]);
        assert!(matches!(set.lookup_value("getLocale"), Some(ValueDecl::Function { .. })));
        let Some(ValueDecl::Variable { declarator, .. }) = set.lookup_value("IAP") else {
            panic!("expected variable");
        };
        assert!(declarator_type(declarator).is_some());
        assert!(set.lookup_value("nope").is_none());
    }

    #[test]
    fn test_missing_root() {
        assert!(SourceSet::load("/definitely/not/here").is_err());
    }
}
