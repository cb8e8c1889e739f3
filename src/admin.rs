// Administrator dashboard figures and course rosters.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::api::AdminApi;
use crate::error::RemoteError;
use crate::models::{EntityRef, Enrollment};

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStats {
    pub total_students: u64,
    pub total_courses: u64,
    pub total_enrollments: u64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub pending_assignments: u64,
    /// Enrollments per day over the last week, oldest first.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub chart_data: Vec<DailyCount>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DailyCount {
    /// `YYYY-MM-DD`, as grouped by the backend.
    #[serde(rename = "_id")]
    pub day: String,
    pub count: u64,
}

impl AdminStats {
    pub fn recent_enrollments(&self) -> u64 {
        self.chart_data.iter().map(|d| d.count).sum()
    }
}

/// Everyone enrolled in one course.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    course_id: String,
    enrollments: Vec<Enrollment>,
}

impl Roster {
    pub async fn load<A: AdminApi + ?Sized>(api: &A, course_id: &str) -> Result<Self, RemoteError> {
        let enrollments = api.course_enrollments(course_id).await?;
        tracing::debug!(course_id, students = enrollments.len(), "roster loaded");
        Ok(Self { course_id: course_id.to_string(), enrollments })
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn len(&self) -> usize {
        self.enrollments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enrollments.is_empty()
    }

    /// Case-insensitive search over student name and email. Rows whose
    /// student was not populated only match an empty search.
    pub fn filtered(&self, search: &str) -> Vec<&Enrollment> {
        let needle = search.trim().to_lowercase();
        self.enrollments
            .iter()
            .filter(|e| needle.is_empty() || student_matches(e, &needle))
            .collect()
    }
}

fn student_matches(enrollment: &Enrollment, needle: &str) -> bool {
    let Some(EntityRef::Populated(student)) = &enrollment.student else {
        return false;
    };
    [student.name.as_deref(), student.email.as_deref()]
        .into_iter()
        .flatten()
        .any(|h| h.to_lowercase().contains(needle))
}
