//! REST client for the course backend.

use async_trait::async_trait;
use http::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::admin::AdminStats;
use crate::api::{AdminApi, CourseApi, EnrollmentApi, PaymentApi, ProgressApi, ReviewApi};
use crate::catalog::{CoursePage, CourseQuery};
use crate::config::Config;
use crate::error::RemoteError;
use crate::models::{Course, Enrollment, QuizResult};
use crate::review::{Review, ReviewItem};
use crate::wire::{Envelope, ErrorBody};

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// The signed-in user's credential. Created when the app mounts, cleared on
/// logout; passed explicitly to whatever talks to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()) }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn clear(&mut self) {
        self.token = None;
    }
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: String,
    session: Session,
}

impl HttpBackend {
    pub fn new(config: &Config, session: Session) -> Result<Self, RemoteError> {
        let mut builder = Client::builder().cookie_store(true).gzip(true);
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Uses `COURSEMASTER_TOKEN` as the session credential when set.
    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        let session = config.token.clone().map(Session::with_token).unwrap_or_default();
        Self::new(config, session)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn end_session(&mut self) {
        self.session.clear();
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        for s in segments {
            url.push('/');
            url.extend(utf8_percent_encode(s, PATH_SEGMENT));
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let rb = self.client.request(method, self.url(segments));
        match self.session.token() {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    async fn send<T: DeserializeOwned>(&self, rb: RequestBuilder) -> Result<T, RemoteError> {
        let res = checked(rb.send().await.map_err(transport)?).await?;
        let body: Envelope<T> = res.json().await.map_err(transport)?;
        Ok(body.data)
    }

    async fn send_empty(&self, rb: RequestBuilder) -> Result<(), RemoteError> {
        checked(rb.send().await.map_err(transport)?).await?;
        Ok(())
    }
}

async fn checked(res: Response) -> Result<Response, RemoteError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body: ErrorBody = res.json().await.unwrap_or_default();
    let err = RemoteError::from_status(status, body.message);
    if !matches!(err, RemoteError::Unauthorized) {
        tracing::error!(%status, error = %err, "backend rejected request");
    }
    Err(err)
}

fn transport(e: reqwest::Error) -> RemoteError {
    tracing::error!(error = %e, "request failed");
    e.into()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressBody<'a> {
    course_id: &'a str,
    module_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuizBody<'a> {
    course_id: &'a str,
    module_id: &'a str,
    answers: &'a [usize],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentBody<'a> {
    course_id: &'a str,
    milestone_id: &'a str,
    submission_url: &'a str,
}

#[derive(Deserialize)]
struct EnrolledFlag {
    enrolled: bool,
}

#[derive(Deserialize)]
struct CheckoutSession {
    url: String,
}

#[async_trait]
impl CourseApi for HttpBackend {
    async fn list_courses(&self, query: &CourseQuery) -> Result<CoursePage, RemoteError> {
        self.send(self.request(Method::GET, &["courses"]).query(query)).await
    }

    async fn get_course(&self, course_id: &str) -> Result<Course, RemoteError> {
        self.send(self.request(Method::GET, &["courses", course_id])).await
    }

    async fn create_course(&self, payload: &Value) -> Result<Course, RemoteError> {
        self.send(self.request(Method::POST, &["courses"]).json(payload)).await
    }

    async fn update_course(&self, course_id: &str, payload: &Value) -> Result<Course, RemoteError> {
        self.send(self.request(Method::PATCH, &["courses", course_id]).json(payload))
            .await
    }

    async fn delete_course(&self, course_id: &str) -> Result<(), RemoteError> {
        self.send_empty(self.request(Method::DELETE, &["courses", course_id]))
            .await
    }
}

#[async_trait]
impl ProgressApi for HttpBackend {
    async fn enrollment_details(&self, course_id: &str) -> Result<Enrollment, RemoteError> {
        self.send(self.request(Method::GET, &["enrollments", "details", course_id]))
            .await
    }

    async fn report_progress(&self, course_id: &str, module_id: &str) -> Result<Enrollment, RemoteError> {
        let body = ProgressBody { course_id, module_id };
        self.send(self.request(Method::POST, &["enrollments", "progress"]).json(&body))
            .await
    }

    async fn submit_quiz(
        &self,
        course_id: &str,
        module_id: &str,
        answers: &[usize],
    ) -> Result<QuizResult, RemoteError> {
        let body = QuizBody { course_id, module_id, answers };
        self.send(self.request(Method::POST, &["enrollments", "quiz"]).json(&body))
            .await
    }

    async fn submit_assignment(
        &self,
        course_id: &str,
        milestone_id: &str,
        submission_url: &str,
    ) -> Result<Enrollment, RemoteError> {
        let body = AssignmentBody { course_id, milestone_id, submission_url };
        self.send(self.request(Method::POST, &["enrollments", "assignment"]).json(&body))
            .await
    }
}

#[async_trait]
impl EnrollmentApi for HttpBackend {
    async fn check_enrollment(&self, course_id: &str) -> Result<bool, RemoteError> {
        let flag: EnrolledFlag = self
            .send(self.request(Method::GET, &["enrollments", "check", course_id]))
            .await?;
        Ok(flag.enrolled)
    }

    async fn enroll(&self, course_id: &str) -> Result<Enrollment, RemoteError> {
        self.send(self.request(Method::POST, &["enrollments", course_id])).await
    }

    async fn my_courses(&self) -> Result<Vec<Enrollment>, RemoteError> {
        self.send(self.request(Method::GET, &["enrollments", "my-courses"]))
            .await
    }
}

#[async_trait]
impl PaymentApi for HttpBackend {
    async fn create_checkout_session(&self, course_id: &str) -> Result<String, RemoteError> {
        let rb = self
            .request(Method::POST, &["payments", "create-checkout-session"])
            .json(&json!({ "courseId": course_id }));
        let session: CheckoutSession = self.send(rb).await?;
        Ok(session.url)
    }

    async fn verify_payment(&self, session_id: &str) -> Result<(), RemoteError> {
        let rb = self
            .request(Method::POST, &["payments", "verify"])
            .json(&json!({ "sessionId": session_id }));
        self.send_empty(rb).await
    }
}

#[async_trait]
impl ReviewApi for HttpBackend {
    async fn list_submissions(&self) -> Result<Vec<ReviewItem>, RemoteError> {
        self.send(self.request(Method::GET, &["admin", "assignments"])).await
    }

    async fn review_submission(
        &self,
        enrollment_id: &str,
        submission_id: &str,
        review: &Review,
    ) -> Result<(), RemoteError> {
        let rb = self
            .request(Method::PUT, &["admin", "assignments", enrollment_id, submission_id])
            .json(review);
        self.send_empty(rb).await
    }
}

#[async_trait]
impl AdminApi for HttpBackend {
    async fn dashboard_stats(&self) -> Result<AdminStats, RemoteError> {
        self.send(self.request(Method::GET, &["admin", "stats"])).await
    }

    async fn course_enrollments(&self, course_id: &str) -> Result<Vec<Enrollment>, RemoteError> {
        self.send(self.request(Method::GET, &["admin", "courses", course_id, "enrollments"]))
            .await
    }
}
