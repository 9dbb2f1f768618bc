use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, ops::Deref};

/// Type given to an entity object that carries no `type` key.
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

fn unknown_type() -> String {
    String::from(UNKNOWN_TYPE)
}

/// An entity annotation is a typed surface span, such as `("organization", "Apple")`. The type is
/// taken from an open vocabulary and the text is compared by exact, case-sensitive equality.
///
/// Deserializes from the `{"text": ..., "type": ...}` objects found in the gold and prediction
/// files. A missing `type` becomes `"UNKNOWN"` and a missing `text` becomes the empty string.
#[derive(Debug, Hash, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityAnnotation {
    #[serde(rename = "type", default = "unknown_type")]
    pub entity_type: String,
    #[serde(default)]
    pub text: String,
}

impl EntityAnnotation {
    pub fn new<T: Into<String>, S: Into<String>>(entity_type: T, text: S) -> Self {
        EntityAnnotation {
            entity_type: entity_type.into(),
            text: text.into(),
        }
    }

    /// Borrowed `(type, text)` pair, the unit of matching.
    pub fn as_tuple(&self) -> (&str, &str) {
        (self.entity_type.as_str(), self.text.as_str())
    }
}

impl Display for EntityAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.entity_type, self.text)
    }
}

/// The annotations of a single instance, seen as a set of `(type, text)` pairs. Repeated
/// annotations collapse into one element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct AnnotationSet<'a>(AHashSet<(&'a str, &'a str)>);

impl<'a> From<&'a [EntityAnnotation]> for AnnotationSet<'a> {
    fn from(value: &'a [EntityAnnotation]) -> Self {
        AnnotationSet(value.iter().map(|e| e.as_tuple()).collect())
    }
}

impl<'a> Deref for AnnotationSet<'a> {
    type Target = AHashSet<(&'a str, &'a str)>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Collects every entity type found in the given instances.
pub(crate) fn unique_types<I: AsRef<[EntityAnnotation]>>(instances: &[I]) -> AHashSet<&str> {
    instances
        .iter()
        .flat_map(|v| v.as_ref().iter())
        .map(|e| e.entity_type.as_str())
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use enum_iterator::{all, Sequence};

    /// Small closed vocabulary of annotations. Collisions between the generated gold and
    /// predicted lists are frequent, which is what the property tests need.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Sequence)]
    pub(crate) enum AnnotationsToTest {
        OrgApple,
        OrgGoogle,
        ProductApple,
        LocParis,
        LocLondon,
        PerMarie,
    }

    impl From<AnnotationsToTest> for EntityAnnotation {
        fn from(value: AnnotationsToTest) -> Self {
            match value {
                AnnotationsToTest::OrgApple => EntityAnnotation::new("organization", "Apple"),
                AnnotationsToTest::OrgGoogle => EntityAnnotation::new("organization", "Google"),
                AnnotationsToTest::ProductApple => EntityAnnotation::new("product", "Apple"),
                AnnotationsToTest::LocParis => EntityAnnotation::new("location", "Paris"),
                AnnotationsToTest::LocLondon => EntityAnnotation::new("location", "London"),
                AnnotationsToTest::PerMarie => EntityAnnotation::new("person", "Marie Curie"),
            }
        }
    }

    impl quickcheck::Arbitrary for AnnotationsToTest {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            let choice_slice: Vec<AnnotationsToTest> = all::<AnnotationsToTest>().collect();
            *g.choose(choice_slice.as_ref()).unwrap()
        }
    }

    pub(crate) fn to_annotations(instances: Vec<Vec<AnnotationsToTest>>) -> Vec<Vec<EntityAnnotation>> {
        instances
            .into_iter()
            .map(|v| v.into_iter().map(EntityAnnotation::from).collect())
            .collect()
    }

    #[test]
    fn test_annotation_set_collapses_duplicates() {
        let annotations = vec![
            EntityAnnotation::new("organization", "Apple"),
            EntityAnnotation::new("organization", "Apple"),
            EntityAnnotation::new("location", "Paris"),
        ];
        let set = AnnotationSet::from(annotations.as_slice());
        assert_eq!(set.len(), 2);
        assert!(set.contains(&("organization", "Apple")));
        assert!(set.contains(&("location", "Paris")));
    }

    #[test]
    fn test_annotation_set_is_case_sensitive() {
        let annotations = vec![
            EntityAnnotation::new("organization", "Apple"),
            EntityAnnotation::new("organization", "apple"),
            EntityAnnotation::new("Organization", "Apple"),
        ];
        let set = AnnotationSet::from(annotations.as_slice());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_deserialize_annotation() {
        let actual: EntityAnnotation =
            serde_json::from_str(r#"{"text": "Apple", "type": "organization"}"#).unwrap();
        assert_eq!(actual, EntityAnnotation::new("organization", "Apple"));
    }

    #[test]
    fn test_deserialize_annotation_defaults() {
        let missing_type: EntityAnnotation = serde_json::from_str(r#"{"text": "Apple"}"#).unwrap();
        assert_eq!(missing_type, EntityAnnotation::new(UNKNOWN_TYPE, "Apple"));
        let missing_text: EntityAnnotation =
            serde_json::from_str(r#"{"type": "location"}"#).unwrap();
        assert_eq!(missing_text, EntityAnnotation::new("location", ""));
    }

    #[test]
    fn test_serialize_annotation_uses_type_key() {
        let value = serde_json::to_value(EntityAnnotation::new("person", "Marie Curie")).unwrap();
        assert_eq!(value["type"], "person");
        assert_eq!(value["text"], "Marie Curie");
    }

    #[test]
    fn test_unique_types() {
        let instances = vec![
            vec![
                EntityAnnotation::new("organization", "Apple"),
                EntityAnnotation::new("location", "Paris"),
            ],
            vec![],
            vec![EntityAnnotation::new("organization", "Google")],
        ];
        let actual = unique_types(&instances);
        let expected = AHashSet::from_iter(["organization", "location"]);
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_display() {
        let annotation = EntityAnnotation::new("location", "Paris");
        assert_eq!(annotation.to_string(), "(location, Paris)");
    }
}
