//! Seams to the remote backend. [`crate::client::HttpBackend`] implements all
//! of them over REST; tests substitute recording stubs.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::admin::AdminStats;
use crate::catalog::{CoursePage, CourseQuery};
use crate::error::RemoteError;
use crate::models::{Course, Enrollment, QuizResult};
use crate::review::{Review, ReviewItem};

#[async_trait]
pub trait CourseApi: Send + Sync {
    async fn list_courses(&self, query: &CourseQuery) -> Result<CoursePage, RemoteError>;
    async fn get_course(&self, course_id: &str) -> Result<Course, RemoteError>;
    async fn create_course(&self, payload: &Value) -> Result<Course, RemoteError>;
    async fn update_course(&self, course_id: &str, payload: &Value) -> Result<Course, RemoteError>;
    async fn delete_course(&self, course_id: &str) -> Result<(), RemoteError>;
}

/// Progress-reporting calls made from the learning player.
#[async_trait]
pub trait ProgressApi: Send + Sync {
    async fn enrollment_details(&self, course_id: &str) -> Result<Enrollment, RemoteError>;
    async fn report_progress(&self, course_id: &str, module_id: &str) -> Result<Enrollment, RemoteError>;
    async fn submit_quiz(
        &self,
        course_id: &str,
        module_id: &str,
        answers: &[usize],
    ) -> Result<QuizResult, RemoteError>;
    async fn submit_assignment(
        &self,
        course_id: &str,
        milestone_id: &str,
        submission_url: &str,
    ) -> Result<Enrollment, RemoteError>;
}

#[async_trait]
pub trait EnrollmentApi: Send + Sync {
    async fn check_enrollment(&self, course_id: &str) -> Result<bool, RemoteError>;
    async fn enroll(&self, course_id: &str) -> Result<Enrollment, RemoteError>;
    async fn my_courses(&self) -> Result<Vec<Enrollment>, RemoteError>;
}

#[async_trait]
pub trait PaymentApi: Send + Sync {
    /// Returns the external checkout url to redirect to.
    async fn create_checkout_session(&self, course_id: &str) -> Result<String, RemoteError>;
    async fn verify_payment(&self, session_id: &str) -> Result<(), RemoteError>;
}

#[async_trait]
pub trait ReviewApi: Send + Sync {
    async fn list_submissions(&self) -> Result<Vec<ReviewItem>, RemoteError>;
    async fn review_submission(
        &self,
        enrollment_id: &str,
        submission_id: &str,
        review: &Review,
    ) -> Result<(), RemoteError>;
}

/// Dashboard figures and per-course rosters for administrators.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn dashboard_stats(&self) -> Result<AdminStats, RemoteError>;
    async fn course_enrollments(&self, course_id: &str) -> Result<Vec<Enrollment>, RemoteError>;
}

#[async_trait]
impl<T: ProgressApi + ?Sized> ProgressApi for Arc<T> {
    async fn enrollment_details(&self, course_id: &str) -> Result<Enrollment, RemoteError> {
        (**self).enrollment_details(course_id).await
    }

    async fn report_progress(&self, course_id: &str, module_id: &str) -> Result<Enrollment, RemoteError> {
        (**self).report_progress(course_id, module_id).await
    }

    async fn submit_quiz(
        &self,
        course_id: &str,
        module_id: &str,
        answers: &[usize],
    ) -> Result<QuizResult, RemoteError> {
        (**self).submit_quiz(course_id, module_id, answers).await
    }

    async fn submit_assignment(
        &self,
        course_id: &str,
        milestone_id: &str,
        submission_url: &str,
    ) -> Result<Enrollment, RemoteError> {
        (**self).submit_assignment(course_id, milestone_id, submission_url).await
    }
}
