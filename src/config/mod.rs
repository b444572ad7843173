//! Workspace configuration
//!
//! This module aggregates one or more declaration sources into the ordered,
//! deduplicated set of workspace elements every command operates on.
//!
//! - `element.rs`: workspace elements and raw declarations
//! - `source.rs`: declaration-source parsing and persistence
//! - `select.rs`: resolving a name or path to one element

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, WsyncError};
use crate::vcs::VcsRegistry;

pub mod element;
pub mod select;
pub mod source;

pub use element::{ElementDeclaration, WorkspaceElement};
pub use select::select_element;

/// Default config filename searched for in the workspace and in directory sources
pub const WORKSPACE_CONFIG_FILE: &str = "wsync.yaml";

/// The deduplicated, ordered set of elements plus the workspace base path.
///
/// Read-only for the remainder of a command invocation once built.
pub struct Configuration {
    elements: Vec<WorkspaceElement>,
    base_path: PathBuf,
}

impl Configuration {
    pub fn elements(&self) -> &[WorkspaceElement] {
        &self.elements
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Re-serialize the aggregated configuration in the source file format
    pub fn to_yaml(&self) -> Result<String> {
        let declarations: Vec<&ElementDeclaration> = self
            .elements
            .iter()
            .map(WorkspaceElement::declaration)
            .collect();
        source::serialize_declarations(&declarations)
    }
}

/// Aggregate declaration sources into a [`Configuration`].
///
/// When `sources` is empty, the workspace's own config file is the single
/// source. Declarations concatenate across sources in order; duplicates by
/// resolved path are consolidated by keeping the last declaration seen, at
/// the position of its own occurrence.
pub fn aggregate(
    sources: &[PathBuf],
    base_path: &Path,
    config_filename: &str,
    registry: &VcsRegistry,
) -> Result<Configuration> {
    let default_source = base_path.join(config_filename);
    let sources: Vec<&Path> = if sources.is_empty() {
        vec![default_source.as_path()]
    } else {
        sources.iter().map(PathBuf::as_path).collect()
    };

    let mut declarations = Vec::new();
    for source in &sources {
        declarations.extend(source::read_declarations(source, config_filename)?);
    }
    if declarations.is_empty() {
        return Err(WsyncError::NoConfigSources {
            searched: sources
                .iter()
                .map(|s| s.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    from_declarations(declarations, base_path, registry)
}

/// Build a configuration from an already-expanded declaration list
pub fn from_declarations(
    declarations: Vec<ElementDeclaration>,
    base_path: &Path,
    registry: &VcsRegistry,
) -> Result<Configuration> {
    if declarations.is_empty() {
        return Err(WsyncError::EmptyConfiguration);
    }

    // Consolidate duplicates by resolved path: the last declaration wins and
    // keeps the position of its own occurrence, so later slots never move.
    let mut slots: Vec<Option<ElementDeclaration>> = Vec::with_capacity(declarations.len());
    let mut by_path: HashMap<PathBuf, usize> = HashMap::new();
    for declaration in declarations {
        let key = dedup_key(&resolve_path(&declaration.local_name, base_path));
        if let Some(previous) = by_path.insert(key, slots.len()) {
            slots[previous] = None;
        }
        slots.push(Some(declaration));
    }

    let mut elements = Vec::new();
    for declaration in slots.into_iter().flatten() {
        let path = resolve_path(&declaration.local_name, base_path);
        let vcs = registry.create(&declaration)?;
        elements.push(WorkspaceElement::new(declaration, path, vcs));
    }

    Ok(Configuration {
        elements,
        base_path: base_path.to_path_buf(),
    })
}

/// Resolve a declared local name against the workspace base path
fn resolve_path(local_name: &str, base_path: &Path) -> PathBuf {
    let path = Path::new(local_name);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_path.join(path)
    }
}

/// Key used to group duplicate declarations.
///
/// Existing paths compare by their canonical form so that symlinked or
/// differently-spelled declarations of the same tree collapse; paths that do
/// not exist yet fall back to a lexical normalization.
fn dedup_key(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| lexical_normalize(path))
}

pub(crate) fn lexical_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(Component::ParentDir);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::vcs::ScmType;

    fn git_declaration(local_name: &str, uri: &str) -> ElementDeclaration {
        ElementDeclaration {
            scm: ScmType::Git,
            local_name: local_name.to_string(),
            uri: Some(uri.to_string()),
            version: None,
        }
    }

    fn names(config: &Configuration) -> Vec<&str> {
        config
            .elements()
            .iter()
            .map(WorkspaceElement::local_name)
            .collect()
    }

    #[test]
    fn test_dedup_keeps_last_occurrence_position_a_b_a() {
        // A@0, B@1, A@2: the surviving A sits where the second occurrence was
        let config = from_declarations(
            vec![
                git_declaration("a", "https://example.com/a-old.git"),
                git_declaration("b", "https://example.com/b.git"),
                git_declaration("a", "https://example.com/a-new.git"),
            ],
            Path::new("/ws"),
            &VcsRegistry::with_defaults(),
        )
        .unwrap();

        assert_eq!(names(&config), vec!["b", "a"]);
        assert_eq!(
            config.elements()[1].declaration().uri.as_deref(),
            Some("https://example.com/a-new.git")
        );
    }

    #[test]
    fn test_dedup_keeps_last_occurrence_position_a_a_b() {
        // A@0, A@1, B@2: result order is [A, B]
        let config = from_declarations(
            vec![
                git_declaration("a", "https://example.com/a-old.git"),
                git_declaration("a", "https://example.com/a-new.git"),
                git_declaration("b", "https://example.com/b.git"),
            ],
            Path::new("/ws"),
            &VcsRegistry::with_defaults(),
        )
        .unwrap();

        assert_eq!(names(&config), vec!["a", "b"]);
        assert_eq!(
            config.elements()[0].declaration().uri.as_deref(),
            Some("https://example.com/a-new.git")
        );
    }

    #[test]
    fn test_dedup_groups_by_resolved_path_not_spelling() {
        let config = from_declarations(
            vec![
                git_declaration("x", "https://example.com/one.git"),
                git_declaration("./x", "https://example.com/two.git"),
            ],
            Path::new("/ws"),
            &VcsRegistry::with_defaults(),
        )
        .unwrap();

        assert_eq!(config.elements().len(), 1);
        assert_eq!(
            config.elements()[0].declaration().uri.as_deref(),
            Some("https://example.com/two.git")
        );
    }

    #[test]
    fn test_absolute_local_names_are_kept_as_is() {
        let config = from_declarations(
            vec![git_declaration("/opt/src/x", "https://example.com/x.git")],
            Path::new("/ws"),
            &VcsRegistry::with_defaults(),
        )
        .unwrap();
        assert_eq!(config.elements()[0].path(), Path::new("/opt/src/x"));
    }

    #[test]
    fn test_relative_local_names_resolve_against_base_path() {
        let config = from_declarations(
            vec![git_declaration("src/x", "https://example.com/x.git")],
            Path::new("/ws"),
            &VcsRegistry::with_defaults(),
        )
        .unwrap();
        assert_eq!(config.elements()[0].path(), Path::new("/ws/src/x"));
    }

    #[test]
    fn test_empty_declarations_is_an_error() {
        let result = from_declarations(
            Vec::new(),
            Path::new("/ws"),
            &VcsRegistry::with_defaults(),
        );
        assert!(matches!(result, Err(WsyncError::EmptyConfiguration)));
    }

    #[test]
    fn test_aggregate_missing_default_source_errors() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = aggregate(
            &[],
            temp.path(),
            WORKSPACE_CONFIG_FILE,
            &VcsRegistry::with_defaults(),
        );
        assert!(matches!(result, Err(WsyncError::SourceNotFound { .. })));
    }

    #[test]
    fn test_aggregate_concatenates_sources_in_order() {
        let temp = tempfile::TempDir::new().unwrap();
        let first = temp.path().join("first.yaml");
        let second = temp.path().join("second.yaml");
        std::fs::write(
            &first,
            "- git:\n    local-name: a\n    uri: https://example.com/a.git\n",
        )
        .unwrap();
        std::fs::write(
            &second,
            "- git:\n    local-name: b\n    uri: https://example.com/b.git\n\
             - git:\n    local-name: a\n    uri: https://example.com/a-override.git\n",
        )
        .unwrap();

        let config = aggregate(
            &[first, second],
            temp.path(),
            WORKSPACE_CONFIG_FILE,
            &VcsRegistry::with_defaults(),
        )
        .unwrap();

        // Later source overrides earlier, at the later position
        assert_eq!(names(&config), vec!["b", "a"]);
        assert_eq!(
            config.elements()[1].declaration().uri.as_deref(),
            Some("https://example.com/a-override.git")
        );
    }

    #[test]
    fn test_to_yaml_round_trips_surviving_elements() {
        let config = from_declarations(
            vec![
                git_declaration("a", "https://example.com/a.git"),
                git_declaration("b", "https://example.com/b.git"),
            ],
            Path::new("/ws"),
            &VcsRegistry::with_defaults(),
        )
        .unwrap();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("local-name: a"));
        assert!(yaml.contains("local-name: b"));
    }

    #[test]
    fn test_lexical_normalize() {
        assert_eq!(
            lexical_normalize(Path::new("/ws/./a/../b")),
            PathBuf::from("/ws/b")
        );
        assert_eq!(lexical_normalize(Path::new("a/./b")), PathBuf::from("a/b"));
    }
}
