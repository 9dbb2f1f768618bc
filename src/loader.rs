/*!
Reads gold and predicted annotations from JSON Lines files. Every line is a JSON object holding a
list of `{"text": .., "type": ..}` entity objects under a configurable key (`"entity"` by default).
Line `i` of the gold file and line `i` of the prediction file describe the same instance.
*/
use crate::config::EvalConfig;
use crate::entity::EntityAnnotation;
use crate::metrics::{check_consistent_length, ComputationError, EvaluationResult};
use crate::evaluate_conf;
use serde::de::Error as _;
use serde_json::Value;
use serde_jsonlines::json_lines;
use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::{Path, PathBuf},
};
use tracing::debug;

#[derive(Debug)]
/// Failures that can happen when evaluating annotations read from files.
pub enum LoadError {
    /// The file can't be opened or one of its lines is not valid JSON.
    Io { path: PathBuf, source: io::Error },
    /// A line holds something else than a list of entity objects under the entity key.
    InvalidEntities {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
    /// The files can't be aligned.
    Computation(ComputationError),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Could not read {}: {}", path.display(), source)
            }
            Self::InvalidEntities { path, line, source } => write!(
                f,
                "Invalid entities at line {} of {}: {}",
                line,
                path.display(),
                source
            ),
            Self::Computation(comp_err) => Display::fmt(comp_err, f),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidEntities { source, .. } => Some(source),
            Self::Computation(comp_err) => Some(comp_err),
        }
    }
}

impl From<ComputationError> for LoadError {
    fn from(value: ComputationError) -> Self {
        Self::Computation(value)
    }
}

/// Extracts the entity list of a single line. A line without the key has no entity.
fn entities_of(mut line: Value, entity_field: &str) -> Result<Vec<EntityAnnotation>, serde_json::Error> {
    let object = line
        .as_object_mut()
        .ok_or_else(|| serde_json::Error::custom("expected a JSON object"))?;
    match object.remove(entity_field) {
        Some(entities) => serde_json::from_value(entities),
        None => Ok(Vec::new()),
    }
}

/// Reads one instance per line of the JSONL file at `path`.
///
/// * `path`: Path of a JSONL file.
/// * `entity_field`: Key of the entity list in each line.
pub fn read_instances<P: AsRef<Path>>(
    path: P,
    entity_field: &str,
) -> Result<Vec<Vec<EntityAnnotation>>, LoadError> {
    let path = path.as_ref();
    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let lines = json_lines::<Value, _>(path).map_err(io_error)?;
    let mut instances = Vec::new();
    for (index, line) in lines.enumerate() {
        let entities = entities_of(line.map_err(io_error)?, entity_field).map_err(|source| {
            LoadError::InvalidEntities {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            }
        })?;
        instances.push(entities);
    }
    debug!(path = %path.display(), instances = instances.len(), "read annotations");
    Ok(instances)
}

/// Evaluates the predictions of `pred_path` against the gold annotations of `gold_path`. Both
/// files must have the same number of lines, which is checked before any scoring.
///
/// * `gold_path`: JSONL file of the gold annotations.
/// * `pred_path`: JSONL file of the predicted annotations.
/// * `config`: Entity key, known types.
pub fn evaluate_from_files<G: AsRef<Path>, P: AsRef<Path>>(
    gold_path: G,
    pred_path: P,
    config: &EvalConfig,
) -> Result<EvaluationResult, LoadError> {
    let gold = read_instances(gold_path, config.entity_field())?;
    let predicted = read_instances(pred_path, config.entity_field())?;
    check_consistent_length(&gold, &predicted).map_err(ComputationError::from)?;
    Ok(evaluate_conf(&gold, &predicted, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvalConfigBuilder;
    use crate::metrics::InconsistentLengthError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn jsonl_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_read_instances() {
        let file = jsonl_file(&[
            r#"{"entity": [{"text": "Apple", "type": "organization"}, {"text": "Paris", "type": "location"}]}"#,
            r#"{"entity": []}"#,
            r#"{"id": 3}"#,
        ]);
        let actual = read_instances(file.path(), "entity").unwrap();
        let expected = vec![
            vec![
                EntityAnnotation::new("organization", "Apple"),
                EntityAnnotation::new("location", "Paris"),
            ],
            vec![],
            vec![],
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_read_instances_other_field() {
        let file = jsonl_file(&[
            r#"{"entity": [{"text": "Apple", "type": "organization"}], "predicted": [{"text": "Apple", "type": "product"}]}"#,
        ]);
        let actual = read_instances(file.path(), "predicted").unwrap();
        assert_eq!(actual, vec![vec![EntityAnnotation::new("product", "Apple")]]);
    }

    #[test]
    fn test_read_instances_missing_keys_use_defaults() {
        let file = jsonl_file(&[r#"{"entity": [{"text": "Apple"}, {"type": "location"}]}"#]);
        let actual = read_instances(file.path(), "entity").unwrap();
        let expected = vec![vec![
            EntityAnnotation::new("UNKNOWN", "Apple"),
            EntityAnnotation::new("location", ""),
        ]];
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_read_instances_invalid_entities() {
        let file = jsonl_file(&[r#"{"entity": []}"#, r#"{"entity": "Apple"}"#]);
        let err = read_instances(file.path(), "entity").unwrap_err();
        assert!(matches!(err, LoadError::InvalidEntities { line: 2, .. }));
        assert!(err.to_string().starts_with("Invalid entities at line 2 of"));
    }

    #[test]
    fn test_read_instances_line_not_an_object() {
        let file = jsonl_file(&[r#"[{"text": "Apple", "type": "organization"}]"#]);
        let err = read_instances(file.path(), "entity").unwrap_err();
        assert!(matches!(err, LoadError::InvalidEntities { line: 1, .. }));
    }

    #[test]
    fn test_read_instances_missing_file() {
        let err = read_instances("this/file/does/not/exist.jsonl", "entity").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_evaluate_from_files() {
        let gold = jsonl_file(&[
            r#"{"entity": [{"text": "Apple", "type": "organization"}]}"#,
            r#"{"entity": [{"text": "Paris", "type": "location"}]}"#,
        ]);
        let pred = jsonl_file(&[
            r#"{"entity": [{"text": "Apple", "type": "organization"}]}"#,
            r#"{"entity": []}"#,
        ]);
        let config = EvalConfigBuilder::default()
            .known_types(["location", "organization", "person"])
            .build();
        let result = evaluate_from_files(gold.path(), pred.path(), &config).unwrap();
        assert_eq!(
            (result.total_tp(), result.total_fp(), result.total_fn()),
            (1, 0, 1)
        );
        assert_eq!(result.types(), vec!["location", "organization", "person"]);
    }

    #[test]
    fn test_evaluate_from_files_shape_mismatch() {
        let gold = jsonl_file(&[r#"{"entity": []}"#, r#"{"entity": []}"#]);
        let pred = jsonl_file(&[r#"{"entity": []}"#]);
        let err = evaluate_from_files(gold.path(), pred.path(), &EvalConfig::default()).unwrap_err();
        match err {
            LoadError::Computation(ComputationError::ShapeMismatch(length_err)) => assert_eq!(
                length_err,
                InconsistentLengthError {
                    gold: 2,
                    predicted: 1
                }
            ),
            e => panic!("unexpected error: {e}"),
        }
    }
}
