use crate::webhook_models::Submission;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Static map from Fillout question id to Attio attribute slug, in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    entries: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingParseError(String);

impl fmt::Display for MappingParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MappingParseError {}

/// Attribute values to PATCH onto a list entry.
pub type UpdateSet = Map<String, Value>;

/// How an update set was produced. Reported back in the success details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingMode {
    Explicit,
    Automatic,
}

impl FieldMapping {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut mapping = Self::default();
        for (question_id, attribute) in entries {
            mapping.insert(question_id.into(), attribute.into());
        }
        mapping
    }

    /// Accepts either a JSON object (`{"wrV6": "hdd_evaluation_1"}`) or a
    /// comma separated list of `question_id:attribute` pairs.
    pub fn parse(raw: &str) -> Result<Self, MappingParseError> {
        let raw = raw.trim();
        if raw.starts_with('{') {
            let object: Map<String, Value> = serde_json::from_str(raw)
                .map_err(|e| MappingParseError(format!("invalid JSON object: {}", e)))?;
            let mut mapping = Self::default();
            for (question_id, attribute) in object {
                let attribute = attribute.as_str().ok_or_else(|| {
                    MappingParseError(format!("attribute for '{}' must be a string", question_id))
                })?;
                mapping.insert(question_id, attribute.to_string());
            }
            return Ok(mapping);
        }

        let mut mapping = Self::default();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (question_id, attribute) = pair
                .split_once(':')
                .map(|(q, a)| (q.trim(), a.trim()))
                .filter(|(q, a)| !q.is_empty() && !a.is_empty())
                .ok_or_else(|| {
                    MappingParseError(format!("expected 'question_id:attribute', got '{}'", pair))
                })?;
            mapping.insert(question_id.to_string(), attribute.to_string());
        }
        Ok(mapping)
    }

    /// Re-mapping an existing question id replaces its attribute in place.
    fn insert(&mut self, question_id: String, attribute: String) {
        match self.entries.iter_mut().find(|(q, _)| *q == question_id) {
            Some(entry) => entry.1 = attribute,
            None => self.entries.push((question_id, attribute)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }

    /// Builds the attribute values to update for `submission`.
    ///
    /// Explicit mappings win. Only when none of them matched a present,
    /// non-null answer does every truthy answer get copied under its question
    /// name (or id). The domain question never takes part in that fallback.
    pub fn build_update_set(
        &self,
        submission: &Submission,
        domain_field_id: &str,
    ) -> (UpdateSet, MappingMode) {
        let mut update = UpdateSet::new();

        for (question_id, attribute) in self.iter() {
            if let Some(question) = submission.find(question_id) {
                if !question.value.is_null() {
                    tracing::debug!(
                        "📝 Mapping: {} ({}) → {} = {}",
                        question_id,
                        question.name.as_deref().unwrap_or("-"),
                        attribute,
                        question.value
                    );
                    update.insert(attribute.to_string(), question.value.clone());
                }
            }
        }

        if !update.is_empty() {
            return (update, MappingMode::Explicit);
        }

        tracing::info!("⚠️  No explicit field mapping matched, using automatic mapping");
        for question in &submission.questions {
            if question.id.as_deref() == Some(domain_field_id) || !is_truthy(&question.value) {
                continue;
            }
            // Neither a name nor an id: nothing to key the attribute on
            let Some(attribute) = question.attribute_name() else {
                continue;
            };
            tracing::debug!("📝 Auto-mapped: {} = {}", attribute, question.value);
            update.insert(attribute.to_string(), question.value.clone());
        }

        (update, MappingMode::Automatic)
    }
}

/// JavaScript-style truthiness for JSON answers.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(questions: Value) -> Submission {
        Submission::from_payload(&json!({ "questions": questions }))
    }

    fn sample() -> Submission {
        submission(json!([
            {"id": "6aYW", "name": "domain", "value": "acme.com"},
            {"id": "wrV6", "name": "q1", "value": "yes"}
        ]))
    }

    #[test]
    fn test_explicit_mapping() {
        let mapping = FieldMapping::new([("wrV6", "hdd_evaluation_1")]);
        let (update, mode) = mapping.build_update_set(&sample(), "6aYW");
        assert_eq!(mode, MappingMode::Explicit);
        assert_eq!(Value::Object(update), json!({"hdd_evaluation_1": "yes"}));
    }

    #[test]
    fn test_automatic_mapping_with_empty_table() {
        let (update, mode) = FieldMapping::default().build_update_set(&sample(), "6aYW");
        assert_eq!(mode, MappingMode::Automatic);
        assert_eq!(Value::Object(update), json!({"q1": "yes"}));
    }

    #[test]
    fn test_explicit_match_disables_fallback() {
        let s = submission(json!([
            {"id": "6aYW", "name": "domain", "value": "acme.com"},
            {"id": "wrV6", "name": "q1", "value": false},
            {"id": "6rxp", "name": "q2", "value": "other"}
        ]));
        let mapping = FieldMapping::new([("wrV6", "hdd_evaluation_1")]);
        let (update, mode) = mapping.build_update_set(&s, "6aYW");
        assert_eq!(mode, MappingMode::Explicit);
        // false is non-null, so the explicit mapping keeps it
        assert_eq!(Value::Object(update), json!({"hdd_evaluation_1": false}));
    }

    #[test]
    fn test_null_explicit_value_falls_back() {
        let s = submission(json!([
            {"id": "6aYW", "name": "domain", "value": "acme.com"},
            {"id": "wrV6", "name": "q1", "value": null},
            {"id": "6rxp", "name": "q2", "value": "other"}
        ]));
        let mapping = FieldMapping::new([("wrV6", "hdd_evaluation_1")]);
        let (update, mode) = mapping.build_update_set(&s, "6aYW");
        assert_eq!(mode, MappingMode::Automatic);
        assert_eq!(Value::Object(update), json!({"q2": "other"}));
    }

    #[test]
    fn test_automatic_mapping_skips_falsy_and_uses_id_without_name() {
        let s = submission(json!([
            {"id": "6aYW", "name": "domain", "value": "acme.com"},
            {"id": "a", "name": "zero", "value": 0},
            {"id": "b", "name": "empty", "value": ""},
            {"id": "c", "value": 5},
            {"id": "d", "name": "", "value": ["x"]}
        ]));
        let (update, _) = FieldMapping::default().build_update_set(&s, "6aYW");
        assert_eq!(Value::Object(update), json!({"c": 5, "d": ["x"]}));
    }

    #[test]
    fn test_automatic_mapping_keeps_questions_without_string_id() {
        let s = submission(json!([
            {"id": "6aYW", "name": "domain", "value": "acme.com"},
            {"name": "notes", "value": "hi"},
            {"id": 7, "name": "score", "value": 3}
        ]));
        let (update, mode) = FieldMapping::default().build_update_set(&s, "6aYW");
        assert_eq!(mode, MappingMode::Automatic);
        assert_eq!(Value::Object(update), json!({"notes": "hi", "score": 3}));
    }

    #[test]
    fn test_numeric_id_matches_explicit_mapping() {
        let s = submission(json!([
            {"id": "6aYW", "name": "domain", "value": "acme.com"},
            {"id": 7, "name": "score", "value": 3}
        ]));
        let mapping = FieldMapping::new([("7", "lead_score")]);
        let (update, mode) = mapping.build_update_set(&s, "6aYW");
        assert_eq!(mode, MappingMode::Explicit);
        assert_eq!(Value::Object(update), json!({"lead_score": 3}));
    }

    #[test]
    fn test_mapping_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_value(MappingMode::Explicit).unwrap(), json!("explicit"));
        assert_eq!(serde_json::to_value(MappingMode::Automatic).unwrap(), json!("automatic"));
    }

    #[test]
    fn test_nothing_to_update() {
        let s = submission(json!([{"id": "6aYW", "name": "domain", "value": "acme.com"}]));
        let (update, _) = FieldMapping::default().build_update_set(&s, "6aYW");
        assert!(update.is_empty());
    }

    #[test]
    fn test_parse_pairs() {
        let mapping = FieldMapping::parse("wrV6:hdd_evaluation_1, 6rxp : hdd_evaluation_2,").unwrap();
        let entries: Vec<_> = mapping.iter().collect();
        assert_eq!(
            entries,
            vec![("wrV6", "hdd_evaluation_1"), ("6rxp", "hdd_evaluation_2")]
        );
    }

    #[test]
    fn test_parse_json_object_keeps_order() {
        let mapping =
            FieldMapping::parse(r#"{"zz": "last_attr", "aa": "first_attr"}"#).unwrap();
        let entries: Vec<_> = mapping.iter().collect();
        assert_eq!(entries, vec![("zz", "last_attr"), ("aa", "first_attr")]);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(FieldMapping::parse("wrV6").is_err());
        assert!(FieldMapping::parse("wrV6:").is_err());
        assert!(FieldMapping::parse(r#"{"wrV6": 1}"#).is_err());
        assert!(FieldMapping::parse("{not json").is_err());
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }
}
