//! Declaration sources
//!
//! A source is a filesystem path: either a YAML file listing element
//! declarations, or a directory searched for the workspace config filename.
//! The file format is a YAML list of single-key maps tagged by scm type:
//!
//! ```yaml
//! - git:
//!     local-name: tools/ros_comm
//!     uri: https://github.com/ros/ros_comm.git
//!     version: noetic-devel
//! - other:
//!     local-name: notes
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WsyncError};
use crate::vcs::ScmType;

use super::element::ElementDeclaration;

#[derive(Debug, Serialize, Deserialize)]
struct RawFields {
    #[serde(rename = "local-name")]
    local_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

/// One entry in the on-disk list: a map whose single key is the scm tag.
///
/// A plain map, not a serde enum, so the entries read and write as
/// `- git:\n    local-name: …` rather than YAML `!tag` values.
type RawEntry = BTreeMap<String, RawFields>;

fn scm_for_tag(tag: &str) -> Option<ScmType> {
    match tag {
        "git" => Some(ScmType::Git),
        "svn" => Some(ScmType::Svn),
        "hg" => Some(ScmType::Hg),
        "bzr" => Some(ScmType::Bzr),
        "tar" => Some(ScmType::Tar),
        "other" => Some(ScmType::None),
        _ => None,
    }
}

fn tag_for_scm(scm: ScmType) -> &'static str {
    match scm {
        ScmType::Git => "git",
        ScmType::Svn => "svn",
        ScmType::Hg => "hg",
        ScmType::Bzr => "bzr",
        ScmType::Tar => "tar",
        ScmType::None => "other",
    }
}

/// Read all declarations from one source, in declaration order.
///
/// Directory sources are searched for `config_filename`; a directory without
/// it cannot contribute declarations and is an error.
pub fn read_declarations(source: &Path, config_filename: &str) -> Result<Vec<ElementDeclaration>> {
    let file = locate_source_file(source, config_filename)?;

    let content = fs::read_to_string(&file).map_err(|e| WsyncError::SourceReadFailed {
        path: file.display().to_string(),
        reason: e.to_string(),
    })?;

    parse_declarations(&content).map_err(|reason| WsyncError::SourceParseFailed {
        path: file.display().to_string(),
        reason,
    })
}

fn locate_source_file(source: &Path, config_filename: &str) -> Result<PathBuf> {
    if source.is_dir() {
        let candidate = source.join(config_filename);
        if candidate.is_file() {
            return Ok(candidate);
        }
        return Err(WsyncError::SourceNotFound {
            path: candidate.display().to_string(),
        });
    }
    if !source.is_file() {
        return Err(WsyncError::SourceNotFound {
            path: source.display().to_string(),
        });
    }
    Ok(source.to_path_buf())
}

fn parse_declarations(content: &str) -> std::result::Result<Vec<ElementDeclaration>, String> {
    // An empty file is an empty list, not a parse error
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<RawEntry> = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    let mut declarations = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let mut pairs = entry.into_iter();
        let Some((tag, fields)) = pairs.next() else {
            return Err(format!("entry {index} is empty; expected a single '<scm>:' key"));
        };
        if pairs.next().is_some() {
            return Err(format!(
                "entry {index} has more than one key; expected a single '<scm>:' key"
            ));
        }
        let scm = scm_for_tag(&tag)
            .ok_or_else(|| format!("entry {index} has unknown scm type '{tag}'"))?;
        declarations.push(ElementDeclaration {
            scm,
            local_name: fields.local_name,
            uri: fields.uri,
            version: fields.version,
        });
    }
    Ok(declarations)
}

/// Serialize declarations back into the source file format
pub fn serialize_declarations(declarations: &[&ElementDeclaration]) -> Result<String> {
    let entries: Vec<RawEntry> = declarations
        .iter()
        .map(|declaration| {
            let fields = RawFields {
                local_name: declaration.local_name.clone(),
                uri: declaration.uri.clone(),
                version: declaration.version.clone(),
            };
            RawEntry::from([(tag_for_scm(declaration.scm).to_string(), fields)])
        })
        .collect();
    serde_yaml::to_string(&entries).map_err(|e| WsyncError::SourceParseFailed {
        path: "<serialize>".to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
- git:
    local-name: tools/ros_comm
    uri: https://github.com/ros/ros_comm.git
    version: noetic-devel
- other:
    local-name: notes
- git:
    local-name: deps/vendored
    uri: https://example.com/vendored.git
";

    #[test]
    fn test_parse_sample_config() {
        let declarations = parse_declarations(SAMPLE).unwrap();
        assert_eq!(declarations.len(), 3);

        assert_eq!(declarations[0].scm, ScmType::Git);
        assert_eq!(declarations[0].local_name, "tools/ros_comm");
        assert_eq!(
            declarations[0].uri.as_deref(),
            Some("https://github.com/ros/ros_comm.git")
        );
        assert_eq!(declarations[0].version.as_deref(), Some("noetic-devel"));

        assert_eq!(declarations[1].scm, ScmType::None);
        assert_eq!(declarations[1].uri, None);

        assert_eq!(declarations[2].version, None);
    }

    #[test]
    fn test_parse_preserves_declaration_order() {
        let declarations = parse_declarations(SAMPLE).unwrap();
        let names: Vec<&str> = declarations
            .iter()
            .map(|d| d.local_name.as_str())
            .collect();
        assert_eq!(names, vec!["tools/ros_comm", "notes", "deps/vendored"]);
    }

    #[test]
    fn test_empty_file_yields_no_declarations() {
        assert!(parse_declarations("").unwrap().is_empty());
        assert!(parse_declarations("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_yaml_is_a_parse_error() {
        assert!(parse_declarations("- git: [not a map").is_err());
        assert!(parse_declarations("- cvs:\n    local-name: ancient\n").is_err());
    }

    #[test]
    fn test_entry_with_multiple_keys_is_a_parse_error() {
        let two_keys = "- git:\n    local-name: a\n  hg:\n    local-name: b\n";
        assert!(parse_declarations(two_keys).unwrap_err().contains("single"));
    }

    #[test]
    fn test_serialized_entries_are_plain_single_key_maps() {
        let declarations = parse_declarations(SAMPLE).unwrap();
        let refs: Vec<&ElementDeclaration> = declarations.iter().collect();
        let yaml = serialize_declarations(&refs).unwrap();
        // The on-disk format uses map keys, never YAML enum tags
        assert!(yaml.contains("git:"));
        assert!(yaml.contains("other:"));
        assert!(!yaml.contains('!'));
    }

    #[test]
    fn test_serialize_round_trips() {
        let declarations = parse_declarations(SAMPLE).unwrap();
        let refs: Vec<&ElementDeclaration> = declarations.iter().collect();
        let yaml = serialize_declarations(&refs).unwrap();
        let reparsed = parse_declarations(&yaml).unwrap();
        assert_eq!(declarations, reparsed);
    }

    #[test]
    fn test_file_source_is_read_directly() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("custom.yaml");
        std::fs::write(&file, SAMPLE).unwrap();
        let declarations = read_declarations(&file, "wsync.yaml").unwrap();
        assert_eq!(declarations.len(), 3);
    }

    #[test]
    fn test_directory_source_is_searched_for_config_filename() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("wsync.yaml"), SAMPLE).unwrap();
        let declarations = read_declarations(temp.path(), "wsync.yaml").unwrap();
        assert_eq!(declarations.len(), 3);
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            read_declarations(&temp.path().join("absent.yaml"), "wsync.yaml"),
            Err(WsyncError::SourceNotFound { .. })
        ));
        assert!(matches!(
            read_declarations(temp.path(), "wsync.yaml"),
            Err(WsyncError::SourceNotFound { .. })
        ));
    }
}
