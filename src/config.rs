/*
 * This modules contains the `EvalConfig` struct and its builder. The config groups the parameters
 * of an evaluation (which types to report on, where to find the entities in the JSONL files and
 * how much to print) and can be passed to `evaluate_conf` or `evaluate_from_files`.
*/
use std::fmt::Display;

/// Key of the entity list in the gold and prediction files.
pub const DEFAULT_ENTITY_FIELD: &str = "entity";

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
/// Config struct used to simplify the inputs of the evaluation functions. It implements the default
/// trait.
pub struct EvalConfig {
    /// Types to report on. Every one of them appears in the result, even with 0 support. When
    /// `None`, the types are discovered from the annotations.
    known_types: Option<Vec<String>>,
    /// Key holding the list of entities in every line of the JSONL files.
    entity_field: String,
    /// Should the text summary end with the per-type table?
    include_per_type: bool,
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn known_types(&self) -> Option<&[String]> {
        self.known_types.as_deref()
    }
    pub fn entity_field(&self) -> &str {
        &self.entity_field
    }
    pub fn include_per_type(&self) -> bool {
        self.include_per_type
    }
    /// Borrowed view of the known types, in the shape expected by `evaluate`.
    pub(crate) fn known_types_str(&self) -> Option<Vec<&str>> {
        self.known_types
            .as_ref()
            .map(|v| v.iter().map(String::as_str).collect())
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            known_types: None,
            entity_field: String::from(DEFAULT_ENTITY_FIELD),
            include_per_type: false,
        }
    }
}

impl From<EvalConfigBuilder> for EvalConfig {
    fn from(value: EvalConfigBuilder) -> Self {
        Self {
            known_types: value.known_types,
            entity_field: value.entity_field,
            include_per_type: value.include_per_type,
        }
    }
}

impl From<EvalConfig> for (Option<Vec<String>>, String, bool) {
    fn from(value: EvalConfig) -> Self {
        (value.known_types, value.entity_field, value.include_per_type)
    }
}

impl Display for EvalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let string = format!(
            "Known entity types: {:?}\n Field holding the entities: {}\n Per-type breakdown: {}",
            self.known_types, self.entity_field, self.include_per_type
        );
        write!(f, "{}", string)
    }
}

/// This builder can be used to build and customize an `EvalConfig` structure.
#[derive(Clone, Debug)]
pub struct EvalConfigBuilder {
    known_types: Option<Vec<String>>,
    entity_field: String,
    include_per_type: bool,
}

impl Default for EvalConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalConfigBuilder {
    pub fn known_types<I, S>(mut self, known_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_types = Some(known_types.into_iter().map(|s| s.into()).collect());
        self
    }
    pub fn entity_field<S: Into<String>>(mut self, entity_field: S) -> Self {
        self.entity_field = entity_field.into();
        self
    }
    pub fn include_per_type(mut self, include_per_type: bool) -> Self {
        self.include_per_type = include_per_type;
        self
    }
    pub fn new() -> Self {
        Self {
            known_types: None,
            entity_field: String::from(DEFAULT_ENTITY_FIELD),
            include_per_type: false,
        }
    }
    pub fn build(self) -> EvalConfig {
        EvalConfig::from(self)
    }
}
