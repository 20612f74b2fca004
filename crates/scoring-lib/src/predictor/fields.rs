//! Field alias table and resolver
//!
//! Upstream producers send the same logical field under several naming
//! conventions. Each logical field maps to an ordered list of accepted keys;
//! the first key holding a non-empty value wins.

use crate::models::JobPosting;
use serde_json::Value;

/// Logical job posting fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Description,
    Requirements,
    CompanyProfile,
    Telecommuting,
    HasCompanyLogo,
    HasQuestions,
    SalaryRange,
    EmploymentType,
    RequiredExperience,
    RequiredEducation,
    Industry,
    Function,
    Department,
    Benefits,
    Location,
}

impl Field {
    /// Accepted payload keys, in lookup order
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Title => &["title", "Title"],
            Field::Description => &["description", "Description"],
            Field::Requirements => &["requirements", "Requirements"],
            Field::CompanyProfile => &["companyProfile", "company_profile", "CompanyProfile"],
            Field::Telecommuting => &["telecommuting", "Telecommuting"],
            Field::HasCompanyLogo => &["has_company_logo", "hasCompanyLogo", "HasCompanyLogo"],
            Field::HasQuestions => &["has_questions", "hasQuestions", "HasQuestions"],
            Field::SalaryRange => &["salaryRange", "salary_range", "SalaryRange"],
            Field::EmploymentType => &["employmentType", "EmploymentType", "employment_type"],
            Field::RequiredExperience => &[
                "requiredExperience",
                "RequiredExperience",
                "required_experience",
            ],
            Field::RequiredEducation => &[
                "requiredEducation",
                "RequiredEducation",
                "required_education",
            ],
            Field::Industry => &["industry", "Industry"],
            Field::Function => &["function", "Function"],
            Field::Department => &["department", "Department"],
            Field::Benefits => &["benefits", "Benefits"],
            Field::Location => &["location", "Location"],
        }
    }

    /// Key of the label encoder for a categorical field
    pub fn encoder_key(&self) -> Option<&'static str> {
        match self {
            Field::EmploymentType => Some("employment_type"),
            Field::RequiredExperience => Some("required_experience"),
            Field::RequiredEducation => Some("required_education"),
            Field::Industry => Some("industry"),
            Field::Function => Some("function"),
            _ => None,
        }
    }
}

/// Categorical fields fed through label encoders, in vector order
pub const CATEGORICAL_FIELDS: [Field; 5] = [
    Field::EmploymentType,
    Field::RequiredExperience,
    Field::RequiredEducation,
    Field::Industry,
    Field::Function,
];

/// Placeholder for categorical fields that are absent
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// First alias holding a non-empty value
pub fn lookup<'a>(posting: &'a JobPosting, field: Field) -> Option<&'a Value> {
    field
        .aliases()
        .iter()
        .filter_map(|key| posting.get(key))
        .find(|value| is_present(value))
}

/// Resolve a text field, empty string when absent
pub fn text(posting: &JobPosting, field: Field) -> String {
    lookup(posting, field).map(render_text).unwrap_or_default()
}

/// Resolve a numeric or boolean field, 0 when absent or unparseable
pub fn number(posting: &JobPosting, field: Field) -> f64 {
    let value = match lookup(posting, field) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Resolve a categorical field, [`UNKNOWN_CATEGORY`] when absent
pub fn category(posting: &JobPosting, field: Field) -> String {
    lookup(posting, field)
        .map(render_text)
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}

/// Whether a field carries a non-blank value
pub fn has_text(posting: &JobPosting, field: Field) -> bool {
    !text(posting, field).trim().is_empty()
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|x| x != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn render_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
