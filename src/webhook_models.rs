use crate::field_mapping::MappingMode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single answered question from a Fillout submission.
///
/// `id` and `name` accept any scalar; numbers and booleans are kept in their
/// string form, anything else reads as absent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Question {
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "scalar_as_string")]
    pub name: Option<String>,

    /// Missing values deserialize as null
    #[serde(default)]
    pub value: Value,
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

impl Question {
    /// Attribute slug used by the automatic mapping: the name, or the id when the name is blank.
    pub fn attribute_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.id.as_deref().filter(|i| !i.is_empty()))
    }
}

/// Inbound payload shapes Fillout is known to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{ "questions": [...] }`
    Flat,
    /// `{ "responses": [ { "questions": [...] } ] }`
    ResponsesArray,
    /// `{ "response": { "questions": [...] } }`
    SingleResponse,
}

type ShapeMatcher = fn(&Value) -> Option<&Vec<Value>>;

fn flat_questions(body: &Value) -> Option<&Vec<Value>> {
    body.get("questions")?.as_array()
}

fn first_response_questions(body: &Value) -> Option<&Vec<Value>> {
    body.get("responses")?
        .as_array()?
        .first()?
        .get("questions")?
        .as_array()
}

fn single_response_questions(body: &Value) -> Option<&Vec<Value>> {
    body.get("response")?.get("questions")?.as_array()
}

/// Tried in order; the first match wins.
const SHAPE_MATCHERS: [(PayloadShape, ShapeMatcher); 3] = [
    (PayloadShape::Flat, flat_questions),
    (PayloadShape::ResponsesArray, first_response_questions),
    (PayloadShape::SingleResponse, single_response_questions),
];

/// The ordered question/answer pairs of one submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    pub shape: Option<PayloadShape>,
    pub questions: Vec<Question>,
}

impl Submission {
    /// Tries each known shape in order and keeps the first one that matches.
    ///
    /// Elements that are not JSON objects are skipped. When no shape
    /// matches the submission is empty.
    pub fn from_payload(body: &Value) -> Self {
        for (shape, matcher) in SHAPE_MATCHERS {
            if let Some(raw) = matcher(body) {
                let questions = raw
                    .iter()
                    .filter(|q| q.is_object())
                    .filter_map(|q| serde_json::from_value::<Question>(q.clone()).ok())
                    .collect();
                return Self {
                    shape: Some(shape),
                    questions,
                };
            }
        }
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id.as_deref() == Some(id))
    }

    /// Returns the trimmed domain answer for `domain_field_id`.
    ///
    /// Absent, non-string, empty and whitespace-only answers all count as missing.
    pub fn resolve_domain(&self, domain_field_id: &str) -> Option<String> {
        self.find(domain_field_id)
            .and_then(|q| q.value.as_str())
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }

    pub fn received_fields(&self) -> Vec<ReceivedField> {
        self.questions
            .iter()
            .map(|q| ReceivedField {
                id: q.id.clone(),
                name: q.name.clone(),
                value: q.value.clone(),
            })
            .collect()
    }
}

/// Echo of a received question, returned in 400 responses to help debug forms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceivedField {
    pub id: Option<String>,
    pub name: Option<String>,
    pub value: Value,
}

/// Body of a successful relay response.
#[derive(Debug, Serialize)]
pub struct WebhookSuccess {
    pub success: bool,
    pub message: String,
    pub details: WebhookDetails,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookDetails {
    pub company_id: String,
    pub entry_id: String,
    pub updated_fields: Vec<String>,
    pub values: Map<String, Value>,
    pub mapping_mode: MappingMode,
    pub attio_response: Value,
}
