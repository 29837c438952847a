use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::{ClientError, MISSING_FIELDS};

/// Placeholder shown for any organization field the service left empty.
pub const NOT_AVAILABLE: &str = "N/A";

// ────────────────────────────────────────────────────────────────────────────
// Generation request / status
// ────────────────────────────────────────────────────────────────────────────

/// Body of `POST /api/generate-grant`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub nonprofit_name: String,
    pub nonprofit_mission: String,
    pub nonprofit_website: String,
    pub grant_url: String,
}

impl GenerationRequest {
    /// Every field must be non-blank; nothing else is checked.
    pub fn validate(&self) -> Result<(), ClientError> {
        let fields = [
            &self.nonprofit_name,
            &self.nonprofit_mission,
            &self.nonprofit_website,
            &self.grant_url,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ClientError::Validation(MISSING_FIELDS.to_string()));
        }
        Ok(())
    }
}

/// Generation state as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationStatus {
    Processing,
    Completed,
    Error,
    /// Anything the client does not recognise, including a missing field.
    Other(String),
}

impl Default for GenerationStatus {
    fn default() -> Self {
        GenerationStatus::Other(String::new())
    }
}

impl GenerationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GenerationStatus::Processing => "processing",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Error => "error",
            GenerationStatus::Other(s) => s,
        }
    }
}

impl From<String> for GenerationStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "processing" => GenerationStatus::Processing,
            "completed" => GenerationStatus::Completed,
            "error" => GenerationStatus::Error,
            _ => GenerationStatus::Other(raw),
        }
    }
}

impl<'de> Deserialize<'de> for GenerationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => GenerationStatus::from(raw),
            Value::Null => GenerationStatus::default(),
            other => GenerationStatus::Other(other.to_string()),
        })
    }
}

impl Serialize for GenerationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Response of `POST /api/generate-grant`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub status: GenerationStatus,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `GET /api/get-grant-status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: GenerationStatus,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// One named part of the grant document, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    ExecutiveSummary,
    ProblemStatement,
    ProjectDescription,
    GoalsObjectives,
    ImplementationPlan,
    Evaluation,
    Sustainability,
    Conclusion,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::ExecutiveSummary,
        Section::ProblemStatement,
        Section::ProjectDescription,
        Section::GoalsObjectives,
        Section::ImplementationPlan,
        Section::Evaluation,
        Section::Sustainability,
        Section::Conclusion,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::ExecutiveSummary => "Executive Summary",
            Section::ProblemStatement => "Problem Statement",
            Section::ProjectDescription => "Project Description",
            Section::GoalsObjectives => "Goals & Objectives",
            Section::ImplementationPlan => "Implementation Plan",
            Section::Evaluation => "Evaluation & Impact",
            Section::Sustainability => "Sustainability Plan",
            Section::Conclusion => "Conclusion",
        }
    }

    /// Key used when sending content back for export.
    pub fn canonical_key(self) -> &'static str {
        self.candidate_keys()[0]
    }

    /// Keys the service may use for this section, in priority order.
    pub fn candidate_keys(self) -> &'static [&'static str] {
        match self {
            Section::ExecutiveSummary => &["executive_summary", "Executive Summary"],
            Section::ProblemStatement => &["problem_statement", "Problem Statement"],
            Section::ProjectDescription => &["project_description", "Project Description"],
            Section::GoalsObjectives => &["goals_objectives", "Goals and Objectives"],
            Section::ImplementationPlan => &["implementation_plan", "Implementation Plan"],
            Section::Evaluation => &["evaluation", "Evaluation and Impact"],
            Section::Sustainability => &["sustainability", "Sustainability Plan"],
            Section::Conclusion => &["conclusion", "Conclusion"],
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Grant content
// ────────────────────────────────────────────────────────────────────────────

/// Structured draft returned by the service once generation completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantContent(Map<String, Value>);

impl GrantContent {
    /// Anything other than a JSON object yields empty content.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => GrantContent(map),
            other => {
                tracing::warn!("Grant data is not an object: {other}");
                GrantContent::default()
            }
        }
    }

    /// First candidate key whose value is truthy; an empty canonical
    /// value falls through to the title-case key.
    pub fn section(&self, section: Section) -> Option<&Value> {
        section
            .candidate_keys()
            .iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| is_truthy(value))
    }

    pub fn organization_info(&self) -> OrganizationInfo {
        self.0
            .get("organization_info")
            .map(OrganizationInfo::from_value)
            .unwrap_or_default()
    }

    pub fn budget(&self) -> Option<&Value> {
        self.0.get("budget")
    }
}

/// Empty strings, zero, false and null count as absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Read-only organization details displayed above the editors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationInfo {
    pub name: Option<String>,
    pub mission: Option<String>,
    pub website: Option<String>,
}

impl OrganizationInfo {
    fn from_value(value: &Value) -> Self {
        let field = |key: &str| match value.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Null) | Some(Value::String(_)) | None => None,
            Some(other) => Some(other.to_string()),
        };
        OrganizationInfo {
            name: field("name"),
            mission: field("mission"),
            website: field("website"),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn display_mission(&self) -> &str {
        self.mission.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn display_website(&self) -> &str {
        self.website.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    /// Link target for the website field.
    pub fn website_href(&self) -> &str {
        self.website.as_deref().unwrap_or("#")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_with_wire_field_names() {
        let request = GenerationRequest {
            nonprofit_name: "Helping Hands".to_string(),
            nonprofit_mission: "Feed families".to_string(),
            nonprofit_website: "helpinghands.org".to_string(),
            grant_url: "grants.example.org/123".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "nonprofit_name": "Helping Hands",
                "nonprofit_mission": "Feed families",
                "nonprofit_website": "helpinghands.org",
                "grant_url": "grants.example.org/123"
            })
        );
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_blank_field_fails_validation() {
        let request = GenerationRequest {
            nonprofit_name: "Helping Hands".to_string(),
            nonprofit_mission: "   ".to_string(),
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_status_parsing_handles_unknown_and_missing() {
        let r: GenerateResponse = serde_json::from_value(json!({"status": "processing"})).unwrap();
        assert_eq!(r.status, GenerationStatus::Processing);

        let r: StatusResponse = serde_json::from_value(json!({"status": "pending"})).unwrap();
        assert_eq!(r.status, GenerationStatus::Other("pending".to_string()));

        let r: GenerateResponse = serde_json::from_value(json!({"message": "nope"})).unwrap();
        assert_eq!(r.status, GenerationStatus::Other(String::new()));
        assert_eq!(r.message.as_deref(), Some("nope"));

        let r: GenerateResponse =
            serde_json::from_value(json!({"status": 5, "message": "Queue full"})).unwrap();
        assert_eq!(r.status, GenerationStatus::Other("5".to_string()));
        assert_eq!(r.message.as_deref(), Some("Queue full"));
    }

    #[test]
    fn test_section_prefers_canonical_key() {
        let content = GrantContent::from_value(json!({
            "executive_summary": "canonical",
            "Executive Summary": "title case",
            "Goals and Objectives": ["a", "b"],
            "evaluation": null,
            "Evaluation and Impact": "fallback"
        }));
        assert_eq!(
            content.section(Section::ExecutiveSummary),
            Some(&json!("canonical"))
        );
        assert_eq!(
            content.section(Section::GoalsObjectives),
            Some(&json!(["a", "b"]))
        );
        assert_eq!(content.section(Section::Evaluation), Some(&json!("fallback")));
        assert_eq!(content.section(Section::Conclusion), None);
    }

    #[test]
    fn test_falsy_canonical_value_falls_through_to_title_key() {
        let content = GrantContent::from_value(json!({
            "executive_summary": "",
            "Executive Summary": "<p>Real summary</p>",
            "conclusion": false,
            "Conclusion": "Thank you.",
            "evaluation": 0
        }));
        assert_eq!(
            content.section(Section::ExecutiveSummary),
            Some(&json!("<p>Real summary</p>"))
        );
        assert_eq!(content.section(Section::Conclusion), Some(&json!("Thank you.")));
        assert_eq!(content.section(Section::Evaluation), None);
    }

    #[test]
    fn test_canonical_keys_match_export_names() {
        let keys: Vec<&str> = Section::ALL.iter().map(|s| s.canonical_key()).collect();
        assert_eq!(
            keys,
            vec![
                "executive_summary",
                "problem_statement",
                "project_description",
                "goals_objectives",
                "implementation_plan",
                "evaluation",
                "sustainability",
                "conclusion"
            ]
        );
    }

    #[test]
    fn test_organization_info_fallbacks() {
        let content = GrantContent::from_value(json!({
            "organization_info": {"name": "Helping Hands", "mission": ""}
        }));
        let info = content.organization_info();
        assert_eq!(info.display_name(), "Helping Hands");
        assert_eq!(info.display_mission(), NOT_AVAILABLE);
        assert_eq!(info.display_website(), NOT_AVAILABLE);
        assert_eq!(info.website_href(), "#");

        let empty = GrantContent::from_value(json!("not an object"));
        assert_eq!(empty.organization_info(), OrganizationInfo::default());
    }
}
