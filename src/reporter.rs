/**
This modules gives a few tools to output the result of an evaluation: a serializable `Report`, the
plain-text summary printed by the command line and a comma-separated `ClassificationTable`.
*/
use crate::metrics::{Average, EvaluationResult, Scores, TypeCounter};
use enum_iterator::all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

const RULE_WIDTH: usize = 60;

/// Converts a fraction into a percentage rounded to two decimals. Rounding is done on the exact
/// value of `value * 100`, with ties to even.
fn as_percent(value: f64) -> f64 {
    format!("{:.2}", value * 100.).parse().unwrap_or(0.)
}

impl Scores {
    /// Same scores, as percentages rounded to two decimals.
    pub fn as_percent(&self) -> Scores {
        Scores {
            precision: as_percent(self.precision),
            recall: as_percent(self.recall),
            f1: as_percent(self.f1),
        }
    }
}

/// Raw corpus-wide counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counts {
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_count: usize,
    pub total_gold: usize,
    pub total_pred: usize,
}

/// Metrics of a single type. The scores are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeReport {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_count: usize,
}

impl TypeReport {
    fn new(entity_type: &str, counter: &TypeCounter) -> Self {
        let scores = counter.scores().as_percent();
        TypeReport {
            entity_type: String::from(entity_type),
            precision: scores.precision,
            recall: scores.recall,
            f1: scores.f1,
            support: counter.support(),
            tp: counter.true_positives(),
            fp: counter.false_positives(),
            fn_count: counter.false_negatives(),
        }
    }
}

/// Structured view of an `EvaluationResult`, serialized as
/// `{"micro": {..}, "macro": {..}, "counts": {..}, "per_type": {..}}`. Scores are percentages
/// rounded to two decimals and the types are sorted by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub micro: Scores,
    #[serde(rename = "macro")]
    pub macro_avg: Scores,
    pub counts: Counts,
    pub per_type: BTreeMap<String, TypeReport>,
}

impl From<&EvaluationResult> for Report {
    fn from(value: &EvaluationResult) -> Self {
        Report {
            micro: value.scores(Average::Micro).as_percent(),
            macro_avg: value.scores(Average::Macro).as_percent(),
            counts: Counts {
                tp: value.total_tp(),
                fp: value.total_fp(),
                fn_count: value.total_fn(),
                total_gold: value.total_gold(),
                total_pred: value.total_pred(),
            },
            per_type: value
                .per_type()
                .map(|(t, c)| (String::from(t), TypeReport::new(t, c)))
                .collect(),
        }
    }
}

/// Human-readable summary of an evaluation. The per-type table only lists the types having at
/// least one gold annotation.
pub struct Summary<'a> {
    result: &'a EvaluationResult,
    include_per_type: bool,
}

impl<'a> Summary<'a> {
    pub fn new(result: &'a EvaluationResult, include_per_type: bool) -> Self {
        Summary {
            result,
            include_per_type,
        }
    }
}

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let double_rule = "=".repeat(RULE_WIDTH);
        let rule = "-".repeat(RULE_WIDTH);
        let micro = self.result.scores(Average::Micro);
        let macro_avg = self.result.scores(Average::Macro);
        writeln!(f, "{}", double_rule)?;
        writeln!(f, "                 EVALUATION RESULTS")?;
        writeln!(f, "{}", double_rule)?;
        writeln!(f)?;
        for (name, scores) in [("Micro", micro), ("Macro", macro_avg)] {
            writeln!(
                f,
                "{} F1:  {:6.2}%  (P: {:.2}%, R: {:.2}%)",
                name,
                scores.f1 * 100.,
                scores.precision * 100.,
                scores.recall * 100.
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "TP: {}, FP: {}, FN: {}",
            self.result.total_tp(),
            self.result.total_fp(),
            self.result.total_fn()
        )?;
        writeln!(
            f,
            "Total Gold: {}, Total Pred: {}",
            self.result.total_gold(),
            self.result.total_pred()
        )?;
        if self.include_per_type && !self.result.per_type.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", rule)?;
            writeln!(f, "Per-Type Metrics:")?;
            writeln!(f, "{}", rule)?;
            writeln!(
                f,
                "{:<30} {:>8} {:>8} {:>8} {:>8}",
                "Type", "P", "R", "F1", "Support"
            )?;
            writeln!(f, "{}", rule)?;
            for (entity_type, counter) in self.result.per_type().filter(|(_, c)| c.support() > 0) {
                writeln!(
                    f,
                    "{:<30} {:>7.1}% {:>7.1}% {:>7.1}% {:>8}",
                    entity_type,
                    counter.precision() * 100.,
                    counter.recall() * 100.,
                    counter.f1() * 100.,
                    counter.support()
                )?;
            }
        }
        write!(f, "{}", double_rule)
    }
}

/// The classification table acts as a dataframe when displayed: one line for each overall average
/// followed by one line per type, including the types without gold annotations.
pub struct ClassificationTable<'a>(&'a EvaluationResult);

impl Display for ClassificationTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Class, Precision, Recall, Fscore, Support")?;
        for average in all::<Average>() {
            let scores = self.0.scores(average);
            writeln!(
                f,
                "{}, {}, {}, {}, {}",
                average.label(),
                scores.precision,
                scores.recall,
                scores.f1,
                self.0.total_gold()
            )?;
        }
        for (entity_type, counter) in self.0.per_type() {
            writeln!(
                f,
                "{}, {}, {}, {}, {}",
                entity_type,
                counter.precision(),
                counter.recall(),
                counter.f1(),
                counter.support()
            )?;
        }
        Ok(())
    }
}

impl EvaluationResult {
    /// Structured view of the result, ready to be serialized.
    pub fn to_report(&self) -> Report {
        Report::from(self)
    }

    /// Plain-text summary. With `include_per_type`, the summary ends with a table of the types
    /// having a non-zero support.
    pub fn summary(&self, include_per_type: bool) -> String {
        Summary::new(self, include_per_type).to_string()
    }

    pub fn classification_table(&self) -> ClassificationTable<'_> {
        ClassificationTable(self)
    }
}

/// Displays the summary without the per-type table.
impl Display for EvaluationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&Summary::new(self, false), f)
    }
}
