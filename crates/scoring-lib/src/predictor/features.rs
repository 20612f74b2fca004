//! Feature extraction for ML inference
//!
//! Turns a loosely structured job posting into the fixed 25-slot vector the
//! offline models were trained on. Extraction is total: missing fields,
//! alternate key spellings and unseen category values all fall back to
//! defaults instead of failing the request.

use super::fields::{self, Field, CATEGORICAL_FIELDS};
use crate::artifacts::ArtifactBundle;
use crate::models::{FeatureVector, JobPosting};

/// Phrases that show up disproportionately in fraudulent postings
pub const SUSPICIOUS_KEYWORDS: [&str; 5] =
    ["free", "easy", "work from home", "no experience", "immediate"];

/// Company profile length at which the completeness score saturates
pub const PROFILE_SATURATION_CHARS: f64 = 500.0;

/// Extracts model features from job postings
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    keywords: Vec<String>,
    profile_saturation: f64,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            keywords: SUSPICIOUS_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            profile_saturation: PROFILE_SATURATION_CHARS,
        }
    }

    pub fn extract(&self, posting: &JobPosting, artifacts: &ArtifactBundle) -> FeatureVector {
        let title = fields::text(posting, Field::Title);
        let description = fields::text(posting, Field::Description);
        let requirements = fields::text(posting, Field::Requirements);
        let company_profile = fields::text(posting, Field::CompanyProfile);
        let benefits = fields::text(posting, Field::Benefits);
        let location = fields::text(posting, Field::Location);

        let title_len = char_len(&title);
        let description_len = char_len(&description);
        let requirements_len = char_len(&requirements);
        let profile_len = char_len(&company_profile);

        let [employment_type, required_experience, required_education, industry, function] =
            CATEGORICAL_FIELDS.map(|field| {
                let value = fields::category(posting, field);
                field
                    .encoder_key()
                    .map(|key| artifacts.encode(key, &value))
                    .unwrap_or(0.0)
            });

        FeatureVector {
            title_length: title_len,
            description_length: description_len,
            requirements_length: requirements_len,
            company_profile_length: profile_len,
            telecommuting: fields::number(posting, Field::Telecommuting),
            has_company_logo: fields::number(posting, Field::HasCompanyLogo),
            has_questions: fields::number(posting, Field::HasQuestions),
            has_salary_range: flag(fields::has_text(posting, Field::SalaryRange)),
            employment_type_code: employment_type,
            required_experience_code: required_experience,
            required_education_code: required_education,
            industry_code: industry,
            function_code: function,
            title_words: word_count(&title),
            description_words: word_count(&description),
            requirements_words: word_count(&requirements),
            company_profile_words: word_count(&company_profile),
            has_department: flag(fields::has_text(posting, Field::Department)),
            benefits_length: char_len(&benefits),
            has_benefits: flag(!benefits.trim().is_empty()),
            suspicious_keyword_hits: self.keyword_hits(&title, &description),
            location_length: char_len(&location),
            description_title_ratio: ratio(description_len, title_len),
            requirements_description_ratio: ratio(requirements_len, description_len),
            company_profile_score: (profile_len / self.profile_saturation).min(1.0),
        }
    }

    /// Number of keywords found in either the title or the description
    fn keyword_hits(&self, title: &str, description: &str) -> f64 {
        let title = title.to_lowercase();
        let description = description.to_lowercase();
        self.keywords
            .iter()
            .filter(|kw| title.contains(kw.as_str()) || description.contains(kw.as_str()))
            .count() as f64
    }
}

fn char_len(s: &str) -> f64 {
    s.chars().count() as f64
}

fn word_count(s: &str) -> f64 {
    s.split_whitespace().count() as f64
}

fn flag(present: bool) -> f64 {
    if present {
        1.0
    } else {
        0.0
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{LabelEncoder, LabelEncoders};
    use crate::models::FEATURE_COUNT;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn posting(value: Value) -> JobPosting {
        JobPosting::from_value(value).unwrap()
    }

    fn encoders() -> LabelEncoders {
        let mut map = HashMap::new();
        map.insert(
            "employment_type".to_string(),
            LabelEncoder::new(vec!["Contract".into(), "Full-time".into(), "Part-time".into()]),
        );
        map.insert(
            "industry".to_string(),
            LabelEncoder::new(vec!["Marketing".into(), "Oil & Energy".into(), "Unknown".into()]),
        );
        LabelEncoders::new(map)
    }

    #[test]
    fn test_empty_posting_yields_full_finite_vector() {
        let extractor = FeatureExtractor::new();
        let v = extractor.extract(&JobPosting::default(), &ArtifactBundle::empty());
        let arr = v.to_array();
        assert_eq!(arr.len(), FEATURE_COUNT);
        assert!(arr.iter().all(|x| x.is_finite()));
        assert!(arr.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_text_length_and_word_features() {
        let extractor = FeatureExtractor::new();
        let v = extractor.extract(
            &posting(json!({
                "title": "Data Entry Clerk",
                "description": "Type  records\tinto the system",
                "requirements": "Typing",
                "companyProfile": "Acme"
            })),
            &ArtifactBundle::empty(),
        );
        assert_eq!(v.title_length, 16.0);
        assert_eq!(v.description_length, 29.0);
        assert_eq!(v.requirements_length, 6.0);
        assert_eq!(v.company_profile_length, 4.0);
        assert_eq!(v.title_words, 3.0);
        assert_eq!(v.description_words, 5.0);
        assert_eq!(v.requirements_words, 1.0);
        assert_eq!(v.company_profile_words, 1.0);
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let extractor = FeatureExtractor::new();
        let p = posting(json!({"title": "数据录入员"}));
        let v = extractor.extract(&p, &ArtifactBundle::empty());
        assert_eq!(v.title_length, 5.0);
    }

    #[test]
    fn test_flags_and_numeric_fields() {
        let extractor = FeatureExtractor::new();
        let v = extractor.extract(
            &posting(json!({
                "telecommuting": 1,
                "hasCompanyLogo": 0,
                "has_questions": 1,
                "salaryRange": "40000-50000",
                "department": "Sales",
                "benefits": "Health insurance"
            })),
            &ArtifactBundle::empty(),
        );
        assert_eq!(v.telecommuting, 1.0);
        assert_eq!(v.has_company_logo, 0.0);
        assert_eq!(v.has_questions, 1.0);
        assert_eq!(v.has_salary_range, 1.0);
        assert_eq!(v.has_department, 1.0);
        assert_eq!(v.benefits_length, 16.0);
        assert_eq!(v.has_benefits, 1.0);
    }

    #[test]
    fn test_categorical_encoding_with_fallback() {
        let extractor = FeatureExtractor::new();
        let bundle = ArtifactBundle::empty().with_encoders(encoders());
        let v = extractor.extract(
            &posting(json!({
                "employmentType": "Part-time",
                "industry": "Aerospace",
                "function": "Sales"
            })),
            &bundle,
        );
        assert_eq!(v.employment_type_code, 2.0);
        // unseen by the encoder
        assert_eq!(v.industry_code, 0.0);
        // no encoder for this field
        assert_eq!(v.function_code, 0.0);
    }

    #[test]
    fn test_absent_category_encodes_unknown() {
        let extractor = FeatureExtractor::new();
        let bundle = ArtifactBundle::empty().with_encoders(encoders());
        let v = extractor.extract(&JobPosting::default(), &bundle);
        assert_eq!(v.industry_code, 2.0);
    }

    #[test]
    fn test_keyword_hits_count_each_keyword_once() {
        let extractor = FeatureExtractor::new();
        let v = extractor.extract(
            &posting(json!({
                "title": "EASY money, Work From Home",
                "description": "No experience needed. Free training. Easy easy easy."
            })),
            &ArtifactBundle::empty(),
        );
        // easy, work from home, no experience, free
        assert_eq!(v.suspicious_keyword_hits, 4.0);
    }

    #[test]
    fn test_ratios_and_profile_score() {
        let extractor = FeatureExtractor::new();
        let v = extractor.extract(
            &posting(json!({
                "title": "abcd",
                "description": "abcdefgh",
                "requirements": "ab",
                "companyProfile": "x".repeat(250)
            })),
            &ArtifactBundle::empty(),
        );
        assert_eq!(v.description_title_ratio, 2.0);
        assert_eq!(v.requirements_description_ratio, 0.25);
        assert_eq!(v.company_profile_score, 0.5);

        let long = extractor.extract(
            &posting(json!({"companyProfile": "x".repeat(2000)})),
            &ArtifactBundle::empty(),
        );
        assert_eq!(long.company_profile_score, 1.0);
        assert_eq!(long.description_title_ratio, 0.0);
        assert_eq!(long.requirements_description_ratio, 0.0);
    }

    #[test]
    fn test_camel_and_snake_case_are_equivalent() {
        let extractor = FeatureExtractor::new();
        let bundle = ArtifactBundle::empty().with_encoders(encoders());
        let camel = posting(json!({
            "title": "Marketing Intern",
            "companyProfile": "We are a startup",
            "hasCompanyLogo": 1,
            "hasQuestions": 1,
            "salaryRange": "10-20",
            "employmentType": "Contract",
            "requiredExperience": "Internship",
            "requiredEducation": "Bachelor's Degree"
        }));
        let snake = posting(json!({
            "title": "Marketing Intern",
            "company_profile": "We are a startup",
            "has_company_logo": 1,
            "has_questions": 1,
            "salary_range": "10-20",
            "employment_type": "Contract",
            "required_experience": "Internship",
            "required_education": "Bachelor's Degree"
        }));
        assert_eq!(
            extractor.extract(&camel, &bundle),
            extractor.extract(&snake, &bundle)
        );
    }

    #[test]
    fn test_scenario_posting_from_service_docs() {
        let extractor = FeatureExtractor::new();
        let v = extractor.extract(
            &posting(json!({
                "title": "Data Entry",
                "description": "",
                "telecommuting": 1,
                "hasCompanyLogo": 0
            })),
            &ArtifactBundle::empty(),
        );
        let arr = v.to_array();
        assert_eq!(arr[0], 10.0);
        assert_eq!(arr[1], 0.0);
        assert_eq!(arr[4], 1.0);
        assert_eq!(arr[5], 0.0);
        assert_eq!(arr[13], 2.0);
        assert_eq!(arr[22], 0.0);
    }
}
