//! Analysis record model
//!
//! One record per analyzed audio submission, produced by the external
//! analysis pipeline and read back through the record store. Every field is
//! optional: the store is a flat feed with no schema enforcement, so the
//! portal decodes defensively at the boundary and quarantines entries that
//! are not objects at all.
//!
//! Structural equality (`PartialEq`) over all fields is what the
//! change-detection watcher policy uses to decide "this record is new".

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// A single analysis result for one uploaded audio submission.
///
/// Field names mirror the remote store's camelCase keys. `audio_file`
/// correlates a record with a prior upload; a present `summary` signals that
/// the analysis has completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub sn: Option<String>,
    pub mentor: Option<String>,
    pub student_id: Option<String>,
    pub audio_file: Option<String>,
    pub summary: Option<String>,
    pub voice_modulation: Option<String>,
    pub supportive_environment: Option<String>,
    pub positive_approach: Option<String>,
    pub polite_introduction: Option<String>,
    pub language_comfort: Option<String>,
    pub active_listening: Option<String>,
    pub positive_language: Option<String>,
    pub probing_questions: Option<String>,
    pub open_questions: Option<String>,
    pub student_comfort: Option<String>,
    pub exploration_areas: Option<String>,
    pub academic_progress: Option<String>,
    pub career_goals: Option<String>,
    pub challenges_identified: Option<String>,
    pub guidance_provided: Option<String>,
    pub scholarship_discussion: Option<String>,
    pub next_steps: Option<String>,
    pub student_agreed: Option<String>,
    pub mentor_listened: Option<String>,
    pub provides_guidance: Option<String>,
    pub overall_impact: Option<String>,
}

impl AnalysisRecord {
    /// Decode a single record from a JSON value.
    ///
    /// Returns None if the value is not an object (the caller quarantines
    /// it). Scalar values of any JSON type are coerced to strings, because
    /// spreadsheet-backed stores return numerics for coded fields.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Self {
            sn: text(value, "sn"),
            mentor: text(value, "mentor"),
            student_id: text(value, "studentId"),
            audio_file: text(value, "audioFile"),
            summary: text(value, "summary"),
            voice_modulation: text(value, "voiceModulation"),
            supportive_environment: text(value, "supportiveEnvironment"),
            positive_approach: text(value, "positiveApproach"),
            polite_introduction: text(value, "politeIntroduction"),
            language_comfort: text(value, "languageComfort"),
            active_listening: text(value, "activeListening"),
            positive_language: text(value, "positiveLanguage"),
            probing_questions: text(value, "probingQuestions"),
            open_questions: text(value, "openQuestions"),
            student_comfort: text(value, "studentComfort"),
            exploration_areas: text(value, "explorationAreas"),
            academic_progress: text(value, "academicProgress"),
            career_goals: text(value, "careerGoals"),
            challenges_identified: text(value, "challengesIdentified"),
            guidance_provided: text(value, "guidanceProvided"),
            scholarship_discussion: text(value, "scholarshipDiscussion"),
            next_steps: text(value, "nextSteps"),
            student_agreed: text(value, "studentAgreed"),
            mentor_listened: text(value, "mentorListened"),
            provides_guidance: text(value, "providesGuidance"),
            overall_impact: text(value, "overallImpact"),
        })
    }

    /// True if the record carries either a student ID or an audio filename.
    /// The store pads its feed with empty rows; these are filtered out.
    pub fn is_meaningful(&self) -> bool {
        has_content(&self.student_id) || has_content(&self.audio_file)
    }

    /// True if `audio_file` contains `identifier` as a case-insensitive
    /// substring. Used to correlate a record with a prior upload.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        match &self.audio_file {
            Some(name) => name.to_lowercase().contains(&identifier.to_lowercase()),
            None => false,
        }
    }

    /// True once the analysis has produced a non-empty summary
    pub fn has_summary(&self) -> bool {
        has_content(&self.summary)
    }

    /// All fields with their display labels, in the fixed display order
    /// used by the quick view and both export renderings.
    pub fn labeled_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("SN.NO", self.sn.as_deref()),
            ("Mentor", self.mentor.as_deref()),
            ("Student ID", self.student_id.as_deref()),
            ("Audio File", self.audio_file.as_deref()),
            ("Summary", self.summary.as_deref()),
            ("Voice Modulation", self.voice_modulation.as_deref()),
            ("Supportive Environment", self.supportive_environment.as_deref()),
            ("Positive Approach", self.positive_approach.as_deref()),
            ("Polite Introduction", self.polite_introduction.as_deref()),
            ("Language Comfort", self.language_comfort.as_deref()),
            ("Active Listening", self.active_listening.as_deref()),
            ("Positive Language", self.positive_language.as_deref()),
            ("Probing Questions", self.probing_questions.as_deref()),
            ("Open-Ended Questions", self.open_questions.as_deref()),
            ("Student Comfort", self.student_comfort.as_deref()),
            ("Exploration Areas", self.exploration_areas.as_deref()),
            ("Academic Progress", self.academic_progress.as_deref()),
            ("Career Goals", self.career_goals.as_deref()),
            ("Challenges Identified", self.challenges_identified.as_deref()),
            ("Guidance Provided", self.guidance_provided.as_deref()),
            ("Scholarship Discussion", self.scholarship_discussion.as_deref()),
            ("Next Steps", self.next_steps.as_deref()),
            ("Student Agreed", self.student_agreed.as_deref()),
            ("Mentor Listened", self.mentor_listened.as_deref()),
            ("Provides Guidance", self.provides_guidance.as_deref()),
            ("Overall Impact", self.overall_impact.as_deref()),
        ]
    }
}

/// Decode a record collection from a JSON value.
///
/// Expects a JSON array; each element that decodes as an object becomes a
/// record, elements that do not are quarantined (skipped and counted).
/// Empty padding rows are filtered out. Returns the records in collection
/// order plus the number of quarantined elements.
///
/// A non-array value decodes as an empty collection with everything
/// quarantined; callers that need to distinguish "not a list" from "empty
/// list" check the shape before calling this.
pub fn decode_collection(value: &Value) -> (Vec<AnalysisRecord>, usize) {
    let Some(items) = value.as_array() else {
        return (Vec::new(), 1);
    };

    let mut records = Vec::with_capacity(items.len());
    let mut quarantined = 0;
    for (i, item) in items.iter().enumerate() {
        match AnalysisRecord::from_value(item) {
            Some(record) => {
                if record.is_meaningful() {
                    records.push(record);
                }
            }
            None => {
                warn!(index = i, "Quarantined non-object record store entry");
                quarantined += 1;
            }
        }
    }
    (records, quarantined)
}

/// Coerce a JSON field to text: strings pass through, other scalars are
/// stringified, null/missing/compound values become None.
fn text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn has_content(field: &Option<String>) -> bool {
    field.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}
