/*!
Entity-level evaluation of Named Entity Recognition predictions. This library scores the entities
extracted by a model (e.g. an LLM prompted with a code-style or a natural-language template)
against gold annotations, so that experiments can be compared with the exact same metric.

# Matching
An entity annotation is a `(type, text)` pair, such as `("organization", "Apple")`. A predicted
annotation is correct only if an identical pair is present in the gold annotations of the same
instance. There is no partial match: a correct span with the wrong type counts as one false
positive (for the predicted type) and one false negative (for the gold type). Annotations are
compared as sets, so emitting the same entity twice in an instance counts once.

# Metrics
* Per type: precision, recall, f-score and support (number of gold annotations).
* Micro: the same metrics over the pooled counts of every type.
* Macro: mean of the per-type metrics over the types with a non-zero support. Types only present in
    the predictions are not averaged.
* Weighted: mean of the per-type metrics weighted by their support.

Every ratio with a zero denominator is `0`. Metrics are always finite and in `[0, 1]`.

# Terminology
* An instance is one evaluated unit (a sentence, a document) with its list of gold annotations and
    its list of predicted annotations.
* A type is any string; the set of types is discovered from the data or given explicitly.
*/

mod config;
mod entity;
mod loader;
mod metrics;
mod reporter;

// The public api starts here
pub use entity::{EntityAnnotation, UNKNOWN_TYPE};

pub use metrics::{
    evaluate, evaluate_predictions, safe_ratio, Average, AverageParsingError, ComputationError,
    EvaluationResult, InconsistentLengthError, MicroSummary, Scores, TypeCounter,
};

pub use reporter::{ClassificationTable, Counts, Report, Summary, TypeReport};

pub use config::{EvalConfig, EvalConfigBuilder, DEFAULT_ENTITY_FIELD};

pub use loader::{evaluate_from_files, read_instances, LoadError};

/// Runs `evaluate` with the known types of an `EvalConfig`.
///
/// * `gold`: Gold annotations, one list per instance
/// * `predicted`: Predicted annotations, one list per instance
/// * `config`: Parameters of the evaluation.
///
/// # Example
/// ```rust
/// use nereval::{evaluate_conf, EntityAnnotation, EvalConfigBuilder};
///
/// let gold = vec![
///     vec![EntityAnnotation::new("organization", "Apple")],
///     vec![EntityAnnotation::new("location", "Paris")],
/// ];
/// let predicted = vec![vec![EntityAnnotation::new("organization", "Apple")], vec![]];
/// let config = EvalConfigBuilder::default()
///     .known_types(["location", "organization", "person"])
///     .build();
///
/// let result = evaluate_conf(&gold, &predicted, &config).unwrap();
/// assert_eq!(result.types(), vec!["location", "organization", "person"]);
/// assert_eq!(result.micro_precision(), 1.0);
/// assert_eq!(result.micro_recall(), 0.5);
/// // `person` has no gold annotation, it is left out of the macro average
/// assert_eq!(result.macro_recall(), 0.5);
/// ```
pub fn evaluate_conf<I: AsRef<[EntityAnnotation]>>(
    gold: &[I],
    predicted: &[I],
    config: &EvalConfig,
) -> Result<EvaluationResult, ComputationError> {
    let known_types = config.known_types_str();
    evaluate(gold, predicted, known_types.as_deref())
}
