/**
This module computes the entity-level metrics (precision, recall, f-score, support) of gold
annotations against predicted annotations. Matching is exact on the `(type, text)` pair and is done
per instance on sets, so repeated annotations are only counted once.
*/
use crate::entity::{unique_types, AnnotationSet, EntityAnnotation};
use ahash::AHashMap;
use enum_iterator::Sequence;
use itertools::Itertools;
use ndarray::Array1;
use ndarray_stats::SummaryStatisticsExt;
use num::Float;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    error::Error,
    fmt::{self, Display},
    str::FromStr,
};
use tracing::{debug, trace};

/// Divides `numerator` by `denominator`, returning `0` when the denominator is `0`. Every ratio of
/// this crate goes through this function: precision, recall and f-score are always finite.
pub fn safe_ratio<F: Float>(numerator: F, denominator: F) -> F {
    if denominator.is_zero() {
        F::zero()
    } else {
        numerator / denominator
    }
}

/// Harmonic mean of a precision and a recall.
fn f1_score(precision: f64, recall: f64) -> f64 {
    safe_ratio(2. * precision * recall, precision + recall)
}

#[derive(Debug, PartialEq, Clone, Copy, Eq)]
/// Error type to represent when the gold and predicted instances are not of the same length.
pub struct InconsistentLengthError {
    pub gold: usize,
    pub predicted: usize,
}

impl Display for InconsistentLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Inconsistent number of instances. Gold has {} instances, predictions have {}",
            self.gold, self.predicted
        )
    }
}
impl Error for InconsistentLengthError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Failures that can happen when evaluating predictions. Degenerate statistics (e.g. a type that
/// is never predicted) are not errors.
pub enum ComputationError {
    /// Gold and predicted instances can't be aligned.
    ShapeMismatch(InconsistentLengthError),
}

impl Display for ComputationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch(length_err) => Display::fmt(length_err, f),
        }
    }
}

impl Error for ComputationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ShapeMismatch(length_err) => Some(length_err),
        }
    }
}

impl From<InconsistentLengthError> for ComputationError {
    fn from(value: InconsistentLengthError) -> Self {
        Self::ShapeMismatch(value)
    }
}

pub(crate) fn check_consistent_length<G, P>(
    gold: &[G],
    predicted: &[P],
) -> Result<(), InconsistentLengthError> {
    if gold.len() != predicted.len() {
        return Err(InconsistentLengthError {
            gold: gold.len(),
            predicted: predicted.len(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    TruePositive,
    FalsePositive,
    FalseNegative,
}

/// True positives, false positives and false negatives of a single entity type, summed over all
/// the instances. The metrics are derived from the counts every time they are asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct TypeCounter {
    pub(crate) true_positives: usize,
    pub(crate) false_positives: usize,
    pub(crate) false_negatives: usize,
}

impl TypeCounter {
    pub fn from_counts(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        TypeCounter {
            true_positives,
            false_positives,
            false_negatives,
        }
    }

    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::TruePositive => self.true_positives += 1,
            Outcome::FalsePositive => self.false_positives += 1,
            Outcome::FalseNegative => self.false_negatives += 1,
        }
    }

    pub fn true_positives(&self) -> usize {
        self.true_positives
    }
    pub fn false_positives(&self) -> usize {
        self.false_positives
    }
    pub fn false_negatives(&self) -> usize {
        self.false_negatives
    }

    /// Number of gold annotations, `TP + FN`.
    pub fn support(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    /// Number of predicted annotations, `TP + FP`.
    pub fn predicted(&self) -> usize {
        self.true_positives + self.false_positives
    }

    pub fn precision(&self) -> f64 {
        safe_ratio(self.true_positives as f64, self.predicted() as f64)
    }

    pub fn recall(&self) -> f64 {
        safe_ratio(self.true_positives as f64, self.support() as f64)
    }

    pub fn f1(&self) -> f64 {
        f1_score(self.precision(), self.recall())
    }

    pub fn scores(&self) -> Scores {
        Scores {
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1(),
        }
    }
}

/// Enumeration of the overall averages supported by this crate. &str can be parsed to create an
/// `Average`.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Serialize, Deserialize, Sequence)]
pub enum Average {
    /// Metrics of the pooled counts. Every annotation weighs the same.
    Micro,
    /// Mean of the per-type metrics, over the types with a non-zero support.
    Macro,
    /// Mean of the per-type metrics weighted by their support.
    Weighted,
}

impl Average {
    /// Name of the row holding this average in a `ClassificationTable`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Micro => "Overall_Micro",
            Self::Macro => "Overall_Macro",
            Self::Weighted => "Overall_Weighted",
        }
    }
}

impl Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Average {
    type Err = AverageParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "micro" => Ok(Average::Micro),
            "macro" => Ok(Average::Macro),
            "weighted" => Ok(Average::Weighted),
            _ => Err(AverageParsingError(String::from(s))),
        }
    }
}

#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone)]
pub struct AverageParsingError(String);

impl Display for AverageParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Impossible to parse the string ({}) into an Average",
            self.0
        )
    }
}
impl Error for AverageParsingError {}

/// Precision, recall and f-score, as fractions in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Reduced view of an evaluation: micro metrics and raw counts only. The macro f-score is not part
/// of it, use `evaluate` and `EvaluationResult::macro_f1` to get it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MicroSummary {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub tp: usize,
    pub gold_count: usize,
    pub pred_count: usize,
}

/// Outcome of an evaluation: one counter per entity type and the corpus-wide totals. It can't be
/// modified once built by `evaluate`. Types are always visited in lexicographic order, whatever
/// the order in which they were first seen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvaluationResult {
    pub(crate) per_type: AHashMap<String, TypeCounter>,
    pub(crate) total: TypeCounter,
}

impl EvaluationResult {
    fn with_types<'a, I: IntoIterator<Item = &'a str>>(types: I) -> Self {
        let per_type: AHashMap<String, TypeCounter> = types
            .into_iter()
            .map(|t| (String::from(t), TypeCounter::default()))
            .collect();
        EvaluationResult {
            per_type,
            total: TypeCounter::default(),
        }
    }

    fn record(&mut self, entity_type: &str, outcome: Outcome) {
        match self.per_type.get_mut(entity_type) {
            Some(counter) => counter.record(outcome),
            None => {
                debug!(entity_type, "type outside of the evaluated types, adding a counter");
                let mut counter = TypeCounter::default();
                counter.record(outcome);
                self.per_type.insert(String::from(entity_type), counter);
            }
        }
        self.total.record(outcome);
    }

    /// Counters of every type, sorted by type name. Types without any gold annotation are included.
    pub fn per_type(&self) -> impl Iterator<Item = (&str, &TypeCounter)> {
        self.per_type
            .iter()
            .sorted_unstable_by(|a, b| a.0.cmp(b.0))
            .map(|(t, c)| (t.as_str(), c))
    }

    pub fn counter(&self, entity_type: &str) -> Option<&TypeCounter> {
        self.per_type.get(entity_type)
    }

    /// Sorted names of the evaluated types.
    pub fn types(&self) -> Vec<&str> {
        self.per_type().map(|(t, _)| t).collect()
    }

    /// Corpus-wide counts.
    pub fn totals(&self) -> &TypeCounter {
        &self.total
    }
    pub fn total_tp(&self) -> usize {
        self.total.true_positives
    }
    pub fn total_fp(&self) -> usize {
        self.total.false_positives
    }
    pub fn total_fn(&self) -> usize {
        self.total.false_negatives
    }
    pub fn total_gold(&self) -> usize {
        self.total.support()
    }
    pub fn total_pred(&self) -> usize {
        self.total.predicted()
    }

    pub fn micro_precision(&self) -> f64 {
        self.total.precision()
    }
    pub fn micro_recall(&self) -> f64 {
        self.total.recall()
    }
    pub fn micro_f1(&self) -> f64 {
        self.total.f1()
    }

    pub fn macro_precision(&self) -> f64 {
        self.scores(Average::Macro).precision
    }
    pub fn macro_recall(&self) -> f64 {
        self.scores(Average::Macro).recall
    }
    pub fn macro_f1(&self) -> f64 {
        self.scores(Average::Macro).f1
    }

    /// Overall precision, recall and f-score for the given average.
    pub fn scores(&self, average: Average) -> Scores {
        match average {
            Average::Micro => self.total.scores(),
            Average::Macro => self.averaged_over_supported_types(false),
            Average::Weighted => self.averaged_over_supported_types(true),
        }
    }

    /// Averages the per-type metrics of the types having at least one gold annotation. The types
    /// only seen in the predictions are left out.
    fn averaged_over_supported_types(&self, weighted: bool) -> Scores {
        let supported: Vec<&TypeCounter> = self
            .per_type()
            .map(|(_, c)| c)
            .filter(|c| c.support() > 0)
            .collect();
        if supported.is_empty() {
            return Scores::default();
        }
        let precision = Array1::from_iter(supported.iter().map(|c| c.precision()));
        let recall = Array1::from_iter(supported.iter().map(|c| c.recall()));
        let f1 = Array1::from_iter(supported.iter().map(|c| c.f1()));
        if weighted {
            let weights = Array1::from_iter(supported.iter().map(|c| c.support() as f64));
            Scores {
                precision: precision.weighted_mean(&weights).unwrap_or(0.),
                recall: recall.weighted_mean(&weights).unwrap_or(0.),
                f1: f1.weighted_mean(&weights).unwrap_or(0.),
            }
        } else {
            Scores {
                precision: precision.mean().unwrap_or(0.),
                recall: recall.mean().unwrap_or(0.),
                f1: f1.mean().unwrap_or(0.),
            }
        }
    }

    /// Projection of the result on the micro metrics and the raw counts.
    pub fn micro_summary(&self) -> MicroSummary {
        MicroSummary {
            precision: self.micro_precision(),
            recall: self.micro_recall(),
            f1: self.micro_f1(),
            tp: self.total_tp(),
            gold_count: self.total_gold(),
            pred_count: self.total_pred(),
        }
    }
}

/// One of the main entrypoints of the library. Computes the per-type and overall counts of the
/// predicted annotations against the gold annotations.
///
/// * `gold`: Gold annotations, one list per instance.
/// * `predicted`: Predicted annotations, one list per instance, aligned with `gold`.
/// * `known_types`: Types to report on. Each of them gets a counter, even without any occurrence.
///   When `None`, the types are the ones found in `gold` and `predicted`. Annotations of types
///   outside of `known_types` are still counted, under their own type.
///
/// # Example
///
/// ```rust
/// use nereval::{evaluate, EntityAnnotation};
///
/// let gold = vec![vec![EntityAnnotation::new("organization", "Apple")]];
/// let predicted = vec![vec![EntityAnnotation::new("product", "Apple")]];
/// let result = evaluate(&gold, &predicted, None).unwrap();
///
/// assert_eq!((result.total_tp(), result.total_fp(), result.total_fn()), (0, 1, 1));
/// assert_eq!(result.micro_f1(), 0.0);
/// ```
pub fn evaluate<I: AsRef<[EntityAnnotation]>>(
    gold: &[I],
    predicted: &[I],
    known_types: Option<&[&str]>,
) -> Result<EvaluationResult, ComputationError> {
    check_consistent_length(gold, predicted)?;
    let target_names = match known_types {
        Some(types) => BTreeSet::from_iter(types.iter().copied()),
        None => BTreeSet::from_iter(&unique_types(gold) | &unique_types(predicted)),
    };
    debug!(
        instances = gold.len(),
        types = target_names.len(),
        "evaluating entity annotations"
    );
    let mut result = EvaluationResult::with_types(target_names);
    for (index, (gold_instance, pred_instance)) in gold.iter().zip_eq(predicted).enumerate() {
        let gold_set = AnnotationSet::from(gold_instance.as_ref());
        let pred_set = AnnotationSet::from(pred_instance.as_ref());
        let mut instance_counts = TypeCounter::default();
        for (outcome, matched) in [
            (Outcome::TruePositive, gold_set.intersection(&pred_set).collect_vec()),
            (Outcome::FalsePositive, pred_set.difference(&gold_set).collect_vec()),
            (Outcome::FalseNegative, gold_set.difference(&pred_set).collect_vec()),
        ] {
            for (entity_type, _) in matched {
                result.record(entity_type, outcome);
                instance_counts.record(outcome);
            }
        }
        trace!(
            instance = index,
            tp = instance_counts.true_positives,
            fp = instance_counts.false_positives,
            false_negatives = instance_counts.false_negatives,
            "instance matched"
        );
    }
    debug!(
        tp = result.total_tp(),
        fp = result.total_fp(),
        false_negatives = result.total_fn(),
        "evaluation done"
    );
    Ok(result)
}

/// Reduced variant of `evaluate`, for callers only interested in the micro metrics.
pub fn evaluate_predictions<I: AsRef<[EntityAnnotation]>>(
    gold: &[I],
    predicted: &[I],
) -> Result<MicroSummary, ComputationError> {
    Ok(evaluate(gold, predicted, None)?.micro_summary())
}
