use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull, DisplayFromStr, PickFirst};
use uuid::Uuid;

pub const DEFAULT_QUIZ_TITLE: &str = "Module Quiz";
pub const DEFAULT_PASSING_SCORE: u8 = 70;
pub const DEFAULT_DEADLINE_DAYS: u32 = 7;
pub const DEFAULT_MAX_SCORE: u32 = 100;
pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Development,
    Design,
    Business,
    Marketing,
    #[serde(rename = "Data Science")]
    DataScience,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// A reference the backend may send either as a bare id or populated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum EntityRef {
    Id(String),
    Populated(EntitySummary),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct EntitySummary {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl EntityRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            EntityRef::Id(id) => Some(id),
            EntityRef::Populated(s) => s.id.as_deref(),
        }
    }

    /// Person name or course title, whichever the backend populated.
    pub fn label(&self) -> Option<&str> {
        match self {
            EntityRef::Id(_) => None,
            EntityRef::Populated(s) => s.name.as_deref().or(s.title.as_deref()),
        }
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Course {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub title: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub description: String,
    // the authoring form posts price as a string
    #[serde_as(as = "DefaultOnNull<PickFirst<(_, DisplayFromStr)>>")]
    pub price: f64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub category: Category,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub level: Level,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub thumbnail: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub batch: String,
    #[serde(with = "crate::wire::date_only")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing)]
    pub instructor: Option<EntityRef>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub milestones: Vec<Milestone>,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Milestone {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub title: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub description: String,
    pub order: u32,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub modules: Vec<Module>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Module {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub title: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub description: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub video_url: String,
    /// Minutes.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub duration: u32,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub is_free: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
}

impl Module {
    /// A quiz scaffold without questions is not a takeable quiz.
    pub fn has_quiz(&self) -> bool {
        self.quiz.as_ref().is_some_and(|q| !q.questions.is_empty())
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Quiz {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub title: String,
    pub passing_score: u8,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub questions: Vec<Question>,
}

impl Default for Quiz {
    fn default() -> Self {
        Self {
            title: DEFAULT_QUIZ_TITLE.to_string(),
            passing_score: DEFAULT_PASSING_SCORE,
            questions: Vec::new(),
        }
    }
}

/// Questions are addressed by position in the authoring form; `key` is a
/// local identity that survives removals of sibling questions. It is never
/// sent to the backend.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(skip, default = "Uuid::new_v4")]
    pub key: Uuid,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "question", default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub text: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub options: Vec<String>,
    // learner projections may omit the answer key
    #[serde(default)]
    pub correct_answer: usize,
}

impl Question {
    pub fn blank() -> Self {
        Self {
            key: Uuid::new_v4(),
            id: None,
            text: String::new(),
            options: vec![String::new(); OPTIONS_PER_QUESTION],
            correct_answer: 0,
        }
    }
}

impl PartialEq for Question {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.text == other.text
            && self.options == other.options
            && self.correct_answer == other.correct_answer
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Assignment {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub title: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub description: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub instructions: String,
    /// Days after the milestone starts.
    pub deadline: u32,
    pub max_score: u32,
}

impl Default for Assignment {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            instructions: String::new(),
            deadline: DEFAULT_DEADLINE_DAYS,
            max_score: DEFAULT_MAX_SCORE,
        }
    }
}

impl Assignment {
    /// True while the assignment still equals the untouched scaffold.
    pub fn is_blank(&self) -> bool {
        *self == Assignment::default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Reviewed,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Amber,
    Blue,
    Emerald,
    Rose,
}

impl SubmissionStatus {
    pub fn badge(self) -> BadgeTone {
        match self {
            SubmissionStatus::Pending => BadgeTone::Amber,
            SubmissionStatus::Reviewed => BadgeTone::Blue,
            SubmissionStatus::Approved => BadgeTone::Emerald,
            SubmissionStatus::Rejected => BadgeTone::Rose,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Reviewed => "reviewed",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Enrollment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub student: Option<EntityRef>,
    pub course: Option<EntityRef>,
    /// Backend-computed percentage; never recomputed locally.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub progress: f64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub completed_modules: Vec<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub quiz_attempts: Vec<QuizAttempt>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub assignment_submissions: Vec<AssignmentSubmission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub module_id: String,
    pub score: f64,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempted_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSubmission {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub milestone_id: String,
    pub submission_url: String,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Server verdict for one quiz submission.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: f64,
    pub passed: bool,
    pub correct_count: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub passing_score: Option<u8>,
}
