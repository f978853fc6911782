//! # Data Layout Convention
//!
//! Every evaluation record lives at
//!
//! ```text
//! data/{leaderboard}/{developer}/{model}/{uuid}.json
//! ```
//!
//! where `{uuid}` is a freshly generated version-4 UUID. Multiple runs of the
//! same model on the same leaderboard never collide because each gets its
//! own UUID.
//!
//! [`EvalFilePath`] parses and generates such paths. [`check_consistency`]
//! compares the identifying fields of a parsed document against the
//! directory names, so a record for `openai/gpt-4o` cannot silently land
//! under `anthropic/`.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::LayoutError;
use crate::identity::ModelId;

/// File extension of every data file.
pub const DATA_FILE_EXTENSION: &str = "json";

/// Check that `s` can be used as a single directory name.
pub(crate) fn check_segment(s: &str) -> Result<(), &'static str> {
    if s.is_empty() {
        return Err("must not be empty");
    }
    if s == "." || s == ".." {
        return Err("must not be a relative path component");
    }
    if s.starts_with('.') {
        return Err("must not start with '.'");
    }
    if s.contains(['/', '\\']) {
        return Err("must not contain path separators");
    }
    if s.chars().any(char::is_control) {
        return Err("must not contain control characters");
    }
    Ok(())
}

/// Remove `.` components and fold `..` into the preceding component,
/// without touching the filesystem.
///
/// Leading `..` components of a relative path are kept; `..` directly
/// under the root is dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// A data file location: leaderboard, model, and the run UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EvalFilePath {
    leaderboard: String,
    model: ModelId,
    uuid: Uuid,
}

impl EvalFilePath {
    /// Assemble a path from its parts, validating each.
    pub fn new(leaderboard: impl Into<String>, model: ModelId, uuid: Uuid) -> Result<Self, LayoutError> {
        let leaderboard = leaderboard.into();
        check_segment(&leaderboard).map_err(|reason| LayoutError::Segment {
            component: "leaderboard",
            value: leaderboard.clone(),
            reason,
        })?;
        if uuid.get_version_num() != 4 {
            return Err(LayoutError::NotVersion4 {
                uuid: uuid.to_string(),
                version: uuid.get_version_num(),
            });
        }
        Ok(Self { leaderboard, model, uuid })
    }

    /// A new path for `model` on `leaderboard` with a random UUID v4.
    pub fn generate(leaderboard: impl Into<String>, model: ModelId) -> Result<Self, LayoutError> {
        Self::new(leaderboard, model, Uuid::new_v4())
    }

    /// Parse a path relative to the data directory.
    ///
    /// # Errors
    ///
    /// Returns the first [`LayoutError`] encountered, checking depth first,
    /// then the directory components from the top down, then the file name.
    pub fn parse(relative: &Path) -> Result<Self, LayoutError> {
        let mut parts: Vec<&str> = Vec::with_capacity(4);
        for component in relative.components() {
            match component {
                Component::CurDir => continue,
                Component::Normal(os) => {
                    let Some(s) = os.to_str() else {
                        return Err(LayoutError::Segment {
                            component: "path",
                            value: os.to_string_lossy().into_owned(),
                            reason: "must be valid UTF-8",
                        });
                    };
                    parts.push(s);
                }
                other => {
                    return Err(LayoutError::Segment {
                        component: "path",
                        value: other.as_os_str().to_string_lossy().into_owned(),
                        reason: "must be a plain relative component",
                    });
                }
            }
        }

        let &[leaderboard, developer, model, file_name] = parts.as_slice() else {
            return Err(LayoutError::Depth { found: parts.len() });
        };

        let model = ModelId::new(developer, model).map_err(|e| match e {
            crate::IdentityError::Segment { segment, value, reason } => LayoutError::Segment {
                component: segment,
                value,
                reason,
            },
            other => LayoutError::Model(other),
        })?;

        let Some(stem) = file_name
            .strip_suffix(DATA_FILE_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
        else {
            return Err(LayoutError::Extension {
                file_name: file_name.to_string(),
            });
        };

        let uuid = parse_uuid_stem(stem)?;
        Self::new(leaderboard, model, uuid)
    }

    /// Parse `path` as a location under `data_root`.
    ///
    /// Both paths are normalized lexically first, so `scripts/../data/...`
    /// is recognized as lying under `data`.
    pub fn from_data_path(path: &Path, data_root: &Path) -> Result<Self, LayoutError> {
        let normalized = normalize_path(path);
        let relative = normalized
            .strip_prefix(normalize_path(data_root))
            .map_err(|_| LayoutError::OutsideDataRoot {
                path: path.display().to_string(),
                data_root: data_root.display().to_string(),
            })?;
        Self::parse(relative)
    }

    /// The leaderboard directory name.
    pub fn leaderboard(&self) -> &str {
        &self.leaderboard
    }

    /// The model identifier encoded by the developer and model directories.
    pub fn model_id(&self) -> &ModelId {
        &self.model
    }

    /// The developer directory name.
    pub fn developer(&self) -> &str {
        self.model.developer()
    }

    /// The model directory name.
    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    /// The run UUID from the file name.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// `{leaderboard}/{developer}/{model}/{uuid}.json`.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.leaderboard)
            .join(self.model.developer())
            .join(self.model.model())
            .join(format!("{}.{DATA_FILE_EXTENSION}", self.uuid.hyphenated()))
    }

    /// The full path of this file under `data_root`.
    pub fn to_path(&self, data_root: &Path) -> PathBuf {
        data_root.join(self.relative_path())
    }
}

impl std::fmt::Display for EvalFilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.relative_path().display())
    }
}

fn parse_uuid_stem(stem: &str) -> Result<Uuid, LayoutError> {
    let uuid = Uuid::try_parse(stem).map_err(|e| LayoutError::InvalidUuid {
        stem: stem.to_string(),
        reason: e.to_string(),
    })?;

    let canonical = uuid.hyphenated().to_string();
    if stem != canonical {
        return Err(LayoutError::NonCanonicalUuid {
            stem: stem.to_string(),
            canonical,
        });
    }

    if uuid.get_version_num() != 4 {
        return Err(LayoutError::NotVersion4 {
            uuid: canonical,
            version: uuid.get_version_num(),
        });
    }

    Ok(uuid)
}

/// A disagreement between a document field and the directory it is stored in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutIssue {
    /// Dotted path of the document field (e.g. `model_info.developer`).
    pub field: String,
    /// Which directory level the field should match.
    pub directory: &'static str,
    /// The directory name.
    pub expected: String,
    /// The value found in the document.
    pub found: String,
}

impl std::fmt::Display for LayoutIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} is {:?} but the {} directory is {:?}",
            self.field, self.found, self.directory, self.expected
        )
    }
}

/// Compare identifying fields of `doc` against the directories in `path`.
///
/// Only fields that are present with the expected shape are compared; a
/// missing or mistyped field is a schema concern, not a layout one.
///
/// - `model_info` as a string: `developer/model` must match both
///   directories; a bare API identifier must match the model directory.
/// - `model_info` as an object: `developer` must match the developer
///   directory and `id` (when `developer/model`) must match both.
/// - `evaluation_source.evaluation_source_name` must match the leaderboard.
pub fn check_consistency(path: &EvalFilePath, doc: &Value) -> Vec<LayoutIssue> {
    let mut issues = Vec::new();

    match doc.get("model_info") {
        Some(Value::String(s)) => match ModelId::parse(s) {
            Ok(id) => compare_model_id(&mut issues, "model_info", path, &id),
            Err(_) if !s.contains('/') => {
                compare(&mut issues, "model_info", "model", path.model_name(), s);
            }
            Err(_) => {}
        },
        Some(Value::Object(info)) => {
            if let Some(developer) = info.get("developer").and_then(Value::as_str) {
                compare(
                    &mut issues,
                    "model_info.developer",
                    "developer",
                    path.developer(),
                    developer,
                );
            }
            if let Some(id) = info
                .get("id")
                .and_then(Value::as_str)
                .and_then(|s| ModelId::parse(s).ok())
            {
                compare_model_id(&mut issues, "model_info.id", path, &id);
            }
        }
        _ => {}
    }

    if let Some(name) = doc
        .pointer("/evaluation_source/evaluation_source_name")
        .and_then(Value::as_str)
    {
        compare(
            &mut issues,
            "evaluation_source.evaluation_source_name",
            "leaderboard",
            path.leaderboard(),
            name,
        );
    }

    issues
}

fn compare_model_id(issues: &mut Vec<LayoutIssue>, field: &str, path: &EvalFilePath, id: &ModelId) {
    compare(issues, field, "developer", path.developer(), id.developer());
    compare(issues, field, "model", path.model_name(), id.model());
}

fn compare(
    issues: &mut Vec<LayoutIssue>,
    field: &str,
    directory: &'static str,
    expected: &str,
    found: &str,
) {
    if expected != found {
        issues.push(LayoutIssue {
            field: field.to_string(),
            directory,
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const V4: &str = "3f2b8c1e-9d4a-4e6b-8f0a-1c2d3e4f5a6b";

    fn sample() -> EvalFilePath {
        EvalFilePath::parse(Path::new(&format!("helm_lite/openai/gpt-4o/{V4}.json"))).unwrap()
    }

    #[test]
    fn parse_conforming_path() {
        let p = sample();
        assert_eq!(p.leaderboard(), "helm_lite");
        assert_eq!(p.developer(), "openai");
        assert_eq!(p.model_name(), "gpt-4o");
        assert_eq!(p.uuid().to_string(), V4);
        assert_eq!(p.to_string(), format!("helm_lite/openai/gpt-4o/{V4}.json"));
    }

    #[test]
    fn parse_ignores_leading_cur_dir() {
        let p = EvalFilePath::parse(Path::new(&format!("./helm_lite/openai/gpt-4o/{V4}.json")));
        assert_eq!(p.unwrap(), sample());
    }

    #[test]
    fn parse_rejects_shallow_path() {
        let err = EvalFilePath::parse(Path::new(&format!("openai/gpt-4o/{V4}.json"))).unwrap_err();
        assert_eq!(err, LayoutError::Depth { found: 3 });
    }

    #[test]
    fn parse_rejects_deep_path() {
        let err =
            EvalFilePath::parse(Path::new(&format!("lb/extra/openai/gpt-4o/{V4}.json"))).unwrap_err();
        assert_eq!(err, LayoutError::Depth { found: 5 });
    }

    #[test]
    fn parse_rejects_absolute_path() {
        let err = EvalFilePath::parse(Path::new(&format!("/lb/openai/gpt-4o/{V4}.json"))).unwrap_err();
        assert!(matches!(err, LayoutError::Segment { component: "path", .. }));
    }

    #[test]
    fn parse_rejects_wrong_extension() {
        let err = EvalFilePath::parse(Path::new(&format!("lb/openai/gpt-4o/{V4}.yaml"))).unwrap_err();
        assert!(matches!(err, LayoutError::Extension { .. }));
    }

    #[test]
    fn parse_rejects_non_uuid_stem() {
        let err = EvalFilePath::parse(Path::new("lb/openai/gpt-4o/results.json")).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidUuid { .. }));
    }

    #[test]
    fn parse_rejects_uppercase_uuid() {
        let upper = V4.to_uppercase();
        let err = EvalFilePath::parse(Path::new(&format!("lb/openai/gpt-4o/{upper}.json"))).unwrap_err();
        match err {
            LayoutError::NonCanonicalUuid { canonical, .. } => assert_eq!(canonical, V4),
            other => panic!("expected NonCanonicalUuid, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_simple_uuid_form() {
        let simple = V4.replace('-', "");
        let err = EvalFilePath::parse(Path::new(&format!("lb/openai/gpt-4o/{simple}.json"))).unwrap_err();
        assert!(matches!(err, LayoutError::NonCanonicalUuid { .. }));
    }

    #[test]
    fn parse_rejects_version_1_uuid() {
        let v1 = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";
        let err = EvalFilePath::parse(Path::new(&format!("lb/openai/gpt-4o/{v1}.json"))).unwrap_err();
        assert_eq!(
            err,
            LayoutError::NotVersion4 { uuid: v1.to_string(), version: 1 }
        );
    }

    #[test]
    fn parse_rejects_hidden_leaderboard() {
        let err = EvalFilePath::parse(Path::new(&format!(".cache/openai/gpt-4o/{V4}.json"))).unwrap_err();
        assert!(matches!(err, LayoutError::Segment { component: "leaderboard", .. }));
    }

    #[test]
    fn from_data_path_strips_root() {
        let root = Path::new("/repo/data");
        let full = root.join(format!("helm_lite/openai/gpt-4o/{V4}.json"));
        assert_eq!(EvalFilePath::from_data_path(&full, root).unwrap(), sample());
    }

    #[test]
    fn from_data_path_folds_parent_components() {
        let root = Path::new("/repo/data");
        let full = Path::new("/repo/scripts/../data/.").join(sample().relative_path());
        assert_eq!(EvalFilePath::from_data_path(&full, root).unwrap(), sample());

        let dotted_root = Path::new("/repo/scripts/../data");
        let plain = root.join(sample().relative_path());
        assert_eq!(EvalFilePath::from_data_path(&plain, dotted_root).unwrap(), sample());
    }

    #[test]
    fn normalize_path_is_lexical() {
        assert_eq!(normalize_path(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("../a/../../b")), PathBuf::from("../../b"));
        assert_eq!(normalize_path(Path::new("a/./b/")), PathBuf::from("a/b"));
    }

    #[test]
    fn from_data_path_outside_root() {
        let err = EvalFilePath::from_data_path(
            Path::new(&format!("/elsewhere/lb/openai/gpt-4o/{V4}.json")),
            Path::new("/repo/data"),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::OutsideDataRoot { .. }));
    }

    #[test]
    fn generate_produces_v4_under_root() {
        let id = ModelId::parse("openai/gpt-4o").unwrap();
        let p = EvalFilePath::generate("helm_lite", id).unwrap();
        assert_eq!(p.uuid().get_version_num(), 4);
        let full = p.to_path(Path::new("data"));
        assert!(full.starts_with("data/helm_lite/openai/gpt-4o"));
        assert_eq!(full.extension().and_then(|e| e.to_str()), Some("json"));
    }

    #[test]
    fn generate_rejects_bad_leaderboard() {
        let id = ModelId::parse("openai/gpt-4o").unwrap();
        assert!(EvalFilePath::generate("a/b", id).is_err());
    }

    #[test]
    fn consistency_string_model_info_matches() {
        let doc = json!({ "model_info": "openai/gpt-4o" });
        assert!(check_consistency(&sample(), &doc).is_empty());
    }

    #[test]
    fn consistency_string_model_info_mismatch() {
        let doc = json!({ "model_info": "anthropic/gpt-4o" });
        let issues = check_consistency(&sample(), &doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].directory, "developer");
        assert_eq!(issues[0].expected, "openai");
        assert_eq!(issues[0].found, "anthropic");
    }

    #[test]
    fn consistency_bare_api_identifier_compared_to_model_dir() {
        let issues = check_consistency(&sample(), &json!({ "model_info": "gpt-4o" }));
        assert!(issues.is_empty());
        let issues = check_consistency(&sample(), &json!({ "model_info": "gpt-4" }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].directory, "model");
    }

    #[test]
    fn consistency_object_model_info() {
        let doc = json!({
            "model_info": { "name": "GPT-4o", "id": "openai/gpt-4o", "developer": "openai" },
            "evaluation_source": { "evaluation_source_name": "helm_lite" }
        });
        assert!(check_consistency(&sample(), &doc).is_empty());
    }

    #[test]
    fn consistency_reports_each_disagreeing_field() {
        let doc = json!({
            "model_info": { "id": "meta/llama-3", "developer": "meta" },
            "evaluation_source": { "evaluation_source_name": "helm_capabilities" }
        });
        let issues = check_consistency(&sample(), &doc);
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "model_info.developer",
                "model_info.id",
                "model_info.id",
                "evaluation_source.evaluation_source_name"
            ]
        );
    }

    #[test]
    fn consistency_ignores_missing_or_mistyped_fields() {
        let doc = json!({ "model_info": 42, "evaluation_source": "helm" });
        assert!(check_consistency(&sample(), &doc).is_empty());
        assert!(check_consistency(&sample(), &json!([])).is_empty());
    }

    #[test]
    fn layout_issue_display() {
        let issue = LayoutIssue {
            field: "model_info.developer".into(),
            directory: "developer",
            expected: "openai".into(),
            found: "meta".into(),
        };
        assert_eq!(
            issue.to_string(),
            r#"model_info.developer is "meta" but the developer directory is "openai""#
        );
    }
}
