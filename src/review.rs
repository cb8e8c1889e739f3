// Instructor-side review of assignment submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::ReviewApi;
use crate::error::ReviewError;
use crate::models::{EntitySummary, SubmissionStatus, DEFAULT_MAX_SCORE};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub enrollment_id: String,
    #[serde(default)]
    pub student: Option<EntitySummary>,
    #[serde(default)]
    pub course: Option<EntitySummary>,
    #[serde(default)]
    pub milestone_id: Option<String>,
    #[serde(default)]
    pub assignment_title: String,
    pub submission_url: String,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub max_score: Option<u32>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// The body of `PUT /admin/assignments/:enrollmentId/:submissionId`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Review {
    pub status: SubmissionStatus,
    pub score: u32,
    pub feedback: String,
}

impl Default for Review {
    fn default() -> Self {
        Self {
            status: SubmissionStatus::Approved,
            score: DEFAULT_MAX_SCORE,
            feedback: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(SubmissionStatus),
}

impl StatusFilter {
    fn admits(self, status: SubmissionStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(s) => s == status,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReviewQueue {
    items: Vec<ReviewItem>,
}

impl ReviewQueue {
    pub fn new(items: Vec<ReviewItem>) -> Self {
        Self { items }
    }

    pub async fn load<A: ReviewApi + ?Sized>(api: &A) -> Result<Self, ReviewError> {
        Ok(Self::new(api.list_submissions().await?))
    }

    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    pub fn pending(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == SubmissionStatus::Pending)
            .count()
    }

    /// Case-insensitive search over student name, course title and
    /// assignment title, combined with a status filter.
    pub fn filtered(&self, filter: StatusFilter, search: &str) -> Vec<&ReviewItem> {
        let needle = search.trim().to_lowercase();
        self.items
            .iter()
            .filter(|i| filter.admits(i.status))
            .filter(|i| needle.is_empty() || matches_search(i, &needle))
            .collect()
    }

    /// Send a review and fold it into the local row once the backend accepts it.
    pub async fn submit<A: ReviewApi + ?Sized>(
        &mut self,
        api: &A,
        submission_id: &str,
        review: Review,
    ) -> Result<&ReviewItem, ReviewError> {
        let pos = self
            .items
            .iter()
            .position(|i| i.id == submission_id)
            .ok_or_else(|| ReviewError::UnknownSubmission(submission_id.to_string()))?;

        if review.status == SubmissionStatus::Pending {
            return Err(ReviewError::PendingStatus);
        }
        let max = self.items[pos].max_score.unwrap_or(DEFAULT_MAX_SCORE);
        if review.score > max {
            return Err(ReviewError::ScoreAboveMax { score: review.score, max });
        }

        let enrollment_id = self.items[pos].enrollment_id.clone();
        api.review_submission(&enrollment_id, submission_id, &review).await?;
        info!(submission_id, status = review.status.as_str(), "submission reviewed");

        let item = &mut self.items[pos];
        item.status = review.status;
        item.score = Some(review.score);
        item.feedback = Some(review.feedback);
        Ok(item)
    }
}

fn matches_search(item: &ReviewItem, needle: &str) -> bool {
    let student = item.student.as_ref().and_then(|s| s.name.as_deref());
    let course = item.course.as_ref().and_then(|c| c.title.as_deref());
    [student, course, Some(item.assignment_title.as_str())]
        .into_iter()
        .flatten()
        .any(|h| h.to_lowercase().contains(needle))
}
