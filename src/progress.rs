//! Learner-side view state: joins a read-only course tree with the
//! backend-owned enrollment record and drives the learning player.
//!
//! The enrollment is only ever replaced wholesale by the snapshot the
//! backend returns; the single exception is the quiz attempt appended after
//! a graded submission. All actions take `&mut self`, so a session never has
//! two progress calls in flight at once.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{error, info, warn};

use crate::api::{CourseApi, ProgressApi};
use crate::error::{IndexError, Node, ProgressError, RemoteError};
use crate::models::{Assignment, AssignmentSubmission, Course, Enrollment, Milestone, Module, QuizAttempt, QuizResult};

pub fn is_module_completed(enrollment: &Enrollment, module_id: &str) -> bool {
    enrollment.completed_modules.iter().any(|id| id == module_id)
}

/// Always false for modules without a takeable quiz, whatever the
/// enrollment says.
pub fn is_quiz_passed(course: &Course, enrollment: &Enrollment, module_id: &str) -> bool {
    let has_quiz = find_module(course, module_id).is_some_and(Module::has_quiz);
    has_quiz
        && enrollment
            .quiz_attempts
            .iter()
            .any(|a| a.module_id == module_id && a.passed)
}

pub fn assignment_submission_for<'a>(
    enrollment: &'a Enrollment,
    milestone_id: &str,
) -> Option<&'a AssignmentSubmission> {
    enrollment
        .assignment_submissions
        .iter()
        .find(|s| s.milestone_id == milestone_id)
}

pub fn total_modules(course: &Course) -> usize {
    course.milestones.iter().map(|m| m.modules.len()).sum()
}

/// Distinct completed modules that still exist in the course. Ids of
/// modules removed since completion are not counted.
pub fn completed_count(course: &Course, enrollment: &Enrollment) -> usize {
    enrollment
        .completed_modules
        .iter()
        .filter(|id| find_module(course, id).is_some())
        .collect::<BTreeSet<_>>()
        .len()
}

fn find_module<'a>(course: &'a Course, module_id: &str) -> Option<&'a Module> {
    course
        .milestones
        .iter()
        .flat_map(|m| m.modules.iter())
        .find(|m| m.id.as_deref() == Some(module_id))
}

/// A milestone's assignment, unless it is only the empty scaffold.
fn live_assignment(milestone: &Milestone) -> Option<&Assignment> {
    milestone.assignment.as_ref().filter(|a| !a.is_blank())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub milestone: usize,
    pub module: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Video,
    Quiz,
    Assignment,
}

/// `milestone` is the milestone on screen; `module` is the last selected
/// module, which stays put while another milestone's assignment is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub milestone: usize,
    /// `None` until a module exists to select.
    pub module: Option<Position>,
    pub view: ViewMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuizPhase<'a> {
    Answering { answered: usize, total: usize },
    Result(&'a QuizResult),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentView<'a> {
    Unavailable,
    Open(&'a Assignment),
    /// Read-only: status and feedback of the existing submission.
    Submitted(&'a Assignment, &'a AssignmentSubmission),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    /// As reported by the backend.
    pub percent: f64,
    pub course_complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleStatus {
    pub completed: bool,
    pub has_quiz: bool,
    pub quiz_passed: bool,
    pub active: bool,
}

pub struct LearnerSession<A> {
    api: A,
    course_id: String,
    course: Course,
    enrollment: Enrollment,
    cursor: Cursor,
    expanded: BTreeSet<usize>,
    answers: BTreeMap<usize, usize>,
    quiz_result: Option<QuizResult>,
    assignment_url: String,
}

impl<A: ProgressApi> LearnerSession<A> {
    /// Start on the first module of the first milestone.
    pub fn new(api: A, course: Course, enrollment: Enrollment) -> Result<Self, ProgressError> {
        let course_id = course.id.clone().ok_or(ProgressError::Unsaved(Node::Course))?;
        Ok(Self::start(api, course_id, course, enrollment))
    }

    /// Fetch the course and enrollment, then start a session.
    pub async fn open<C>(api: A, courses: &C, course_id: &str) -> Result<Self, ProgressError>
    where
        C: CourseApi + ?Sized,
    {
        let course = courses.get_course(course_id).await?;
        let enrollment = api.enrollment_details(course_id).await?;
        Ok(Self::start(api, course_id.to_string(), course, enrollment))
    }

    fn start(api: A, course_id: String, course: Course, enrollment: Enrollment) -> Self {
        let first = course
            .milestones
            .first()
            .and_then(|m| (!m.modules.is_empty()).then_some(Position { milestone: 0, module: 0 }));
        Self {
            api,
            course_id,
            course,
            enrollment,
            cursor: Cursor { milestone: 0, module: first, view: ViewMode::Video },
            expanded: BTreeSet::from([0]),
            answers: BTreeMap::new(),
            quiz_result: None,
            assignment_url: String::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn enrollment(&self) -> &Enrollment {
        &self.enrollment
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn expanded(&self) -> &BTreeSet<usize> {
        &self.expanded
    }

    pub fn toggle_milestone(&mut self, milestone: usize) {
        if !self.expanded.remove(&milestone) {
            self.expanded.insert(milestone);
        }
    }

    pub fn active_milestone(&self) -> Option<&Milestone> {
        self.course.milestones.get(self.cursor.milestone)
    }

    /// The selected module, if it belongs to the milestone on screen.
    pub fn active_module(&self) -> Option<&Module> {
        let pos = self.cursor.module.filter(|p| p.milestone == self.cursor.milestone)?;
        self.active_milestone()?.modules.get(pos.module)
    }

    pub fn summary(&self) -> ProgressSummary {
        let completed = completed_count(&self.course, &self.enrollment);
        let total = total_modules(&self.course);
        ProgressSummary {
            completed,
            total,
            percent: self.enrollment.progress,
            course_complete: total > 0 && completed >= total,
        }
    }

    pub fn module_status(&self, pos: Position) -> Option<ModuleStatus> {
        let module = self.course.milestones.get(pos.milestone)?.modules.get(pos.module)?;
        let id = module.id.as_deref().unwrap_or_default();
        Some(ModuleStatus {
            completed: is_module_completed(&self.enrollment, id),
            has_quiz: module.has_quiz(),
            quiz_passed: is_quiz_passed(&self.course, &self.enrollment, id),
            active: self.cursor.module == Some(pos),
        })
    }

    // --- navigation ---

    pub fn select_module(&mut self, milestone: usize, module: usize) -> Result<(), IndexError> {
        let len = self.course.milestones.len();
        let m = self
            .course
            .milestones
            .get(milestone)
            .ok_or(IndexError::new(Node::Milestone, milestone, len))?;
        if module >= m.modules.len() {
            return Err(IndexError::new(Node::Module, module, m.modules.len()));
        }
        self.cursor = Cursor {
            milestone,
            module: Some(Position { milestone, module }),
            view: ViewMode::Video,
        };
        self.reset_quiz();
        Ok(())
    }

    pub fn open_quiz(&mut self) -> Result<(), ProgressError> {
        let module = self.active_module().ok_or(ProgressError::NoActiveModule)?;
        if !module.has_quiz() {
            return Err(ProgressError::NoQuiz);
        }
        self.cursor.view = ViewMode::Quiz;
        Ok(())
    }

    pub fn open_assignment(&mut self) -> Result<(), ProgressError> {
        self.active_milestone()
            .and_then(live_assignment)
            .ok_or(ProgressError::NoAssignment)?;
        self.cursor.view = ViewMode::Assignment;
        Ok(())
    }

    /// Show a milestone's assignment from the sidebar. Works for milestones
    /// without modules; the module selection is kept.
    pub fn open_assignment_for(&mut self, milestone: usize) -> Result<(), ProgressError> {
        let len = self.course.milestones.len();
        let m = self
            .course
            .milestones
            .get(milestone)
            .ok_or(IndexError::new(Node::Milestone, milestone, len))?;
        live_assignment(m).ok_or(ProgressError::NoAssignment)?;
        self.cursor.milestone = milestone;
        self.cursor.view = ViewMode::Assignment;
        Ok(())
    }

    pub fn back_to_video(&mut self) {
        self.cursor.view = ViewMode::Video;
    }

    // --- mark complete ---

    /// Report the active module as finished, adopt the backend's enrollment
    /// and move on. Returns where the cursor went, or `None` when there is
    /// nothing after the active module.
    pub async fn mark_complete(&mut self) -> Result<Option<Position>, ProgressError> {
        let module = self.active_module().ok_or(ProgressError::NoActiveModule)?;
        let module_id = module.id.clone().ok_or(ProgressError::Unsaved(Node::Module))?;
        let here = self.cursor.module.ok_or(ProgressError::NoActiveModule)?;

        let enrollment = self
            .api
            .report_progress(&self.course_id, &module_id)
            .await
            .map_err(|e| remote_failure("mark complete", e))?;
        self.enrollment = enrollment;
        info!(module_id = %module_id, progress = self.enrollment.progress, "module completed");

        let next = self.next_position(here);
        if let Some(pos) = next {
            self.expanded.insert(pos.milestone);
            self.select_module(pos.milestone, pos.module)?;
        }
        Ok(next)
    }

    fn next_position(&self, here: Position) -> Option<Position> {
        let milestones = &self.course.milestones;
        if here.module + 1 < milestones.get(here.milestone)?.modules.len() {
            return Some(Position { milestone: here.milestone, module: here.module + 1 });
        }
        let next = milestones.get(here.milestone + 1)?;
        (!next.modules.is_empty()).then_some(Position { milestone: here.milestone + 1, module: 0 })
    }

    // --- quiz ---

    pub fn quiz_phase(&self) -> Option<QuizPhase<'_>> {
        let total = self.active_module()?.quiz.as_ref()?.questions.len();
        Some(match &self.quiz_result {
            Some(result) => QuizPhase::Result(result),
            None => QuizPhase::Answering { answered: self.answers.len(), total },
        })
    }

    pub fn answers(&self) -> &BTreeMap<usize, usize> {
        &self.answers
    }

    pub fn set_answer(&mut self, question: usize, option: usize) -> Result<(), ProgressError> {
        if self.quiz_result.is_some() {
            return Err(ProgressError::InvalidTransition("change an answer"));
        }
        let module = self.active_module().ok_or(ProgressError::NoActiveModule)?;
        let questions = module.quiz.as_ref().map(|q| q.questions.as_slice()).unwrap_or_default();
        let q = questions
            .get(question)
            .ok_or(IndexError::new(Node::Question, question, questions.len()))?;
        if option >= q.options.len() {
            return Err(IndexError::new(Node::Option, option, q.options.len()).into());
        }
        self.answers.insert(question, option);
        Ok(())
    }

    /// Send the answers for grading. Pass/fail is decided by the backend,
    /// never from the answer key shipped with the course.
    pub async fn submit_quiz(&mut self) -> Result<&QuizResult, ProgressError> {
        if self.quiz_result.is_some() {
            return Err(ProgressError::InvalidTransition("submit a graded quiz"));
        }
        let module = self.active_module().ok_or(ProgressError::NoActiveModule)?;
        let total = module.quiz.as_ref().map_or(0, |q| q.questions.len());
        if total == 0 {
            return Err(ProgressError::NoQuiz);
        }
        if self.answers.len() != total {
            warn!(answered = self.answers.len(), total, "quiz submitted with unanswered questions");
            return Err(ProgressError::IncompleteAnswers { answered: self.answers.len(), total });
        }
        let module_id = module.id.clone().ok_or(ProgressError::Unsaved(Node::Module))?;
        let answers: Vec<usize> = self.answers.values().copied().collect();

        let result = self
            .api
            .submit_quiz(&self.course_id, &module_id, &answers)
            .await
            .map_err(|e| remote_failure("submit quiz", e))?;
        info!(module_id = %module_id, score = result.score, passed = result.passed, "quiz graded");

        self.enrollment.quiz_attempts.push(QuizAttempt {
            module_id,
            score: result.score,
            passed: result.passed,
            attempted_at: None,
        });
        self.cursor.view = ViewMode::Quiz;
        Ok(self.quiz_result.insert(result))
    }

    /// Only a failed attempt can be retaken. There is no attempt limit.
    pub fn retake(&mut self) -> Result<(), ProgressError> {
        match &self.quiz_result {
            Some(r) if !r.passed => {
                self.reset_quiz();
                Ok(())
            }
            _ => Err(ProgressError::InvalidTransition("retake")),
        }
    }

    fn reset_quiz(&mut self) {
        self.answers.clear();
        self.quiz_result = None;
    }

    // --- assignment ---

    pub fn assignment_view(&self) -> AssignmentView<'_> {
        let Some(milestone) = self.active_milestone() else {
            return AssignmentView::Unavailable;
        };
        let Some(assignment) = live_assignment(milestone) else {
            return AssignmentView::Unavailable;
        };
        let submission = milestone
            .id
            .as_deref()
            .and_then(|id| assignment_submission_for(&self.enrollment, id));
        match submission {
            Some(s) => AssignmentView::Submitted(assignment, s),
            None => AssignmentView::Open(assignment),
        }
    }

    pub fn assignment_url(&self) -> &str {
        &self.assignment_url
    }

    pub fn set_assignment_url(&mut self, url: impl Into<String>) {
        self.assignment_url = url.into();
    }

    pub async fn submit_assignment(&mut self) -> Result<(), ProgressError> {
        let milestone = self.active_milestone().ok_or(ProgressError::NoAssignment)?;
        live_assignment(milestone).ok_or(ProgressError::NoAssignment)?;
        if matches!(self.assignment_view(), AssignmentView::Submitted(..)) {
            return Err(ProgressError::AlreadySubmitted);
        }
        let url = self.assignment_url.trim();
        if url.is_empty() {
            warn!("assignment submitted without a url");
            return Err(ProgressError::EmptyUrl);
        }
        let milestone_id = milestone.id.clone().ok_or(ProgressError::Unsaved(Node::Milestone))?;

        let enrollment = self
            .api
            .submit_assignment(&self.course_id, &milestone_id, url)
            .await
            .map_err(|e| remote_failure("submit assignment", e))?;
        info!(milestone_id = %milestone_id, "assignment submitted");
        self.enrollment = enrollment;
        self.assignment_url.clear();
        Ok(())
    }
}

fn remote_failure(action: &'static str, e: RemoteError) -> ProgressError {
    error!(error = %e, action, "progress action failed");
    e.into()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::models::{Question, Quiz, SubmissionStatus};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Progress(String),
        Quiz(String, Vec<usize>),
        Assignment(String, String),
    }

    #[derive(Default)]
    struct Stub {
        calls: Mutex<Vec<Call>>,
        fail: bool,
        pass: bool,
    }

    impl Stub {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn check(&self) -> Result<(), RemoteError> {
            if self.fail {
                Err(RemoteError::Transport("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ProgressApi for Stub {
        async fn enrollment_details(&self, _course_id: &str) -> Result<Enrollment, RemoteError> {
            Ok(Enrollment::default())
        }

        async fn report_progress(&self, _course_id: &str, module_id: &str) -> Result<Enrollment, RemoteError> {
            self.calls.lock().unwrap().push(Call::Progress(module_id.into()));
            self.check()?;
            Ok(Enrollment {
                progress: 25.0,
                completed_modules: vec![module_id.into()],
                ..Enrollment::default()
            })
        }

        async fn submit_quiz(
            &self,
            _course_id: &str,
            module_id: &str,
            answers: &[usize],
        ) -> Result<QuizResult, RemoteError> {
            self.calls.lock().unwrap().push(Call::Quiz(module_id.into(), answers.to_vec()));
            self.check()?;
            Ok(QuizResult {
                score: if self.pass { 100.0 } else { 0.0 },
                passed: self.pass,
                correct_count: if self.pass { answers.len() as u32 } else { 0 },
                total_questions: answers.len() as u32,
                passing_score: Some(70),
            })
        }

        async fn submit_assignment(
            &self,
            _course_id: &str,
            milestone_id: &str,
            submission_url: &str,
        ) -> Result<Enrollment, RemoteError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Assignment(milestone_id.into(), submission_url.into()));
            self.check()?;
            Ok(Enrollment {
                assignment_submissions: vec![AssignmentSubmission {
                    id: Some("sub1".into()),
                    milestone_id: milestone_id.into(),
                    submission_url: submission_url.into(),
                    status: SubmissionStatus::Pending,
                    score: None,
                    feedback: None,
                    submitted_at: None,
                }],
                ..Enrollment::default()
            })
        }
    }

    fn module(id: &str, questions: usize) -> Module {
        let quiz = (questions > 0).then(|| Quiz {
            questions: (0..questions)
                .map(|_| Question {
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    ..Question::blank()
                })
                .collect(),
            ..Quiz::default()
        });
        Module {
            id: Some(id.into()),
            title: id.to_uppercase(),
            video_url: "https://youtu.be/dQw4w9WgXcQ".into(),
            quiz,
            ..Module::default()
        }
    }

    fn course() -> Course {
        Course {
            id: Some("c1".into()),
            title: "Rust".into(),
            milestones: vec![
                Milestone {
                    id: Some("ms1".into()),
                    title: "Basics".into(),
                    order: 1,
                    modules: vec![module("m1", 2), module("m2", 0), module("m3", 0)],
                    assignment: Some(Assignment {
                        title: "Build a CLI".into(),
                        description: "Ship it".into(),
                        ..Assignment::default()
                    }),
                    ..Milestone::default()
                },
                Milestone {
                    id: Some("ms2".into()),
                    title: "Advanced".into(),
                    order: 2,
                    modules: vec![module("m4", 0)],
                    assignment: Some(Assignment::default()),
                    ..Milestone::default()
                },
                Milestone {
                    id: Some("ms3".into()),
                    title: "Capstone".into(),
                    order: 3,
                    modules: Vec::new(),
                    assignment: Some(Assignment {
                        title: "Build X".into(),
                        description: "Anything you like".into(),
                        ..Assignment::default()
                    }),
                    ..Milestone::default()
                },
            ],
            ..Course::default()
        }
    }

    fn session(stub: Stub) -> LearnerSession<Arc<Stub>> {
        LearnerSession::new(Arc::new(stub), course(), Enrollment::default()).unwrap()
    }

    #[test]
    fn starts_on_first_module_with_first_milestone_expanded() {
        let s = session(Stub::default());
        assert_eq!(
            s.cursor(),
            Cursor { milestone: 0, module: Some(Position { milestone: 0, module: 0 }), view: ViewMode::Video }
        );
        assert!(s.expanded().contains(&0));
        assert_eq!(s.active_module().and_then(|m| m.id.as_deref()), Some("m1"));
    }

    #[test]
    fn unsaved_course_cannot_start_a_session() {
        let mut c = course();
        c.id = None;
        let err = LearnerSession::new(Arc::new(Stub::default()), c, Enrollment::default()).err();
        assert_eq!(err, Some(ProgressError::Unsaved(Node::Course)));
    }

    #[tokio::test]
    async fn mark_complete_advances_within_milestone() {
        let mut s = session(Stub::default());
        s.select_module(0, 1).unwrap();

        let next = s.mark_complete().await.unwrap();

        assert_eq!(next, Some(Position { milestone: 0, module: 2 }));
        assert_eq!(s.active_module().and_then(|m| m.id.as_deref()), Some("m3"));
        assert_eq!(s.enrollment().completed_modules, vec!["m2".to_string()]);
        assert_eq!(s.api().calls(), vec![Call::Progress("m2".into())]);
    }

    #[tokio::test]
    async fn mark_complete_crosses_into_next_milestone() {
        let mut s = session(Stub::default());
        s.select_module(0, 2).unwrap();

        let next = s.mark_complete().await.unwrap();

        assert_eq!(next, Some(Position { milestone: 1, module: 0 }));
        assert!(s.expanded().contains(&1));
    }

    #[tokio::test]
    async fn mark_complete_on_last_module_stays_put() {
        let mut s = session(Stub::default());
        s.select_module(1, 0).unwrap();

        assert_eq!(s.mark_complete().await.unwrap(), None);
        assert_eq!(s.cursor().milestone, 1);
        assert_eq!(s.cursor().module, Some(Position { milestone: 1, module: 0 }));
        assert!(is_module_completed(s.enrollment(), "m4"));
    }

    #[tokio::test]
    async fn failed_mark_complete_changes_nothing() {
        let mut s = session(Stub { fail: true, ..Stub::default() });
        s.select_module(0, 1).unwrap();
        let before = s.enrollment().clone();

        let err = s.mark_complete().await.unwrap_err();

        assert!(!err.is_local());
        assert_eq!(s.enrollment(), &before);
        assert_eq!(s.cursor().module, Some(Position { milestone: 0, module: 1 }));
    }

    #[tokio::test]
    async fn incomplete_answers_never_reach_the_backend() {
        let mut s = session(Stub { pass: true, ..Stub::default() });
        s.open_quiz().unwrap();
        s.set_answer(0, 2).unwrap();

        let err = s.submit_quiz().await.unwrap_err();

        assert_eq!(err, ProgressError::IncompleteAnswers { answered: 1, total: 2 });
        assert!(s.api().calls().is_empty());
        assert_eq!(s.quiz_phase(), Some(QuizPhase::Answering { answered: 1, total: 2 }));
    }

    #[tokio::test]
    async fn passed_quiz_is_recorded_and_locked() {
        let mut s = session(Stub { pass: true, ..Stub::default() });
        s.set_answer(0, 1).unwrap();
        s.set_answer(1, 3).unwrap();

        let result = s.submit_quiz().await.unwrap().clone();

        assert!(result.passed);
        assert_eq!(s.api().calls(), vec![Call::Quiz("m1".into(), vec![1, 3])]);
        assert!(is_quiz_passed(s.course(), s.enrollment(), "m1"));
        assert_eq!(s.cursor().view, ViewMode::Quiz);
        assert_eq!(s.set_answer(0, 0), Err(ProgressError::InvalidTransition("change an answer")));
        assert_eq!(s.retake(), Err(ProgressError::InvalidTransition("retake")));
    }

    #[tokio::test]
    async fn failed_quiz_can_be_retaken() {
        let mut s = session(Stub::default());
        s.set_answer(0, 0).unwrap();
        s.set_answer(1, 0).unwrap();

        assert!(!s.submit_quiz().await.unwrap().passed);
        assert!(!is_quiz_passed(s.course(), s.enrollment(), "m1"));

        s.retake().unwrap();
        assert!(s.answers().is_empty());
        assert_eq!(s.quiz_phase(), Some(QuizPhase::Answering { answered: 0, total: 2 }));
    }

    #[test]
    fn quiz_passed_requires_a_quiz() {
        let c = course();
        let e = Enrollment {
            quiz_attempts: vec![QuizAttempt {
                module_id: "m2".into(),
                score: 100.0,
                passed: true,
                attempted_at: None,
            }],
            ..Enrollment::default()
        };
        assert!(!is_quiz_passed(&c, &e, "m2"));
    }

    #[test]
    fn selecting_a_module_clears_quiz_answers() {
        let mut s = session(Stub::default());
        s.set_answer(0, 1).unwrap();
        s.select_module(0, 0).unwrap();
        assert!(s.answers().is_empty());

        assert_eq!(s.select_module(2, 0), Err(IndexError::new(Node::Module, 0, 0)));
        assert_eq!(s.select_module(3, 0), Err(IndexError::new(Node::Milestone, 3, 3)));
        assert_eq!(s.select_module(0, 3), Err(IndexError::new(Node::Module, 3, 3)));
    }

    #[test]
    fn quiz_view_needs_questions() {
        let mut s = session(Stub::default());
        s.select_module(0, 1).unwrap();
        assert_eq!(s.open_quiz(), Err(ProgressError::NoQuiz));
        assert_eq!(s.quiz_phase(), None);
    }

    #[tokio::test]
    async fn empty_url_is_rejected_locally() {
        let mut s = session(Stub::default());
        s.set_assignment_url("   ");

        assert_eq!(s.submit_assignment().await, Err(ProgressError::EmptyUrl));
        assert!(s.api().calls().is_empty());
    }

    #[tokio::test]
    async fn assignment_is_submitted_once() {
        let mut s = session(Stub::default());
        s.open_assignment().unwrap();
        s.set_assignment_url("https://github.com/u/p");

        s.submit_assignment().await.unwrap();

        assert_eq!(
            s.api().calls(),
            vec![Call::Assignment("ms1".into(), "https://github.com/u/p".into())]
        );
        assert_eq!(s.assignment_url(), "");
        assert!(matches!(
            s.assignment_view(),
            AssignmentView::Submitted(_, sub) if sub.status == SubmissionStatus::Pending
        ));

        s.set_assignment_url("https://github.com/u/p2");
        assert_eq!(s.submit_assignment().await, Err(ProgressError::AlreadySubmitted));
        assert_eq!(s.api().calls().len(), 1);
    }

    #[test]
    fn blank_assignment_scaffold_is_not_offered() {
        let mut s = session(Stub::default());
        s.select_module(1, 0).unwrap();
        assert_eq!(s.assignment_view(), AssignmentView::Unavailable);
        assert_eq!(s.open_assignment(), Err(ProgressError::NoAssignment));
    }

    #[tokio::test]
    async fn assignment_of_a_milestone_without_modules_can_be_submitted() {
        let mut s = session(Stub::default());

        s.open_assignment_for(2).unwrap();

        assert_eq!(s.cursor().milestone, 2);
        assert_eq!(s.cursor().view, ViewMode::Assignment);
        assert_eq!(s.cursor().module, Some(Position { milestone: 0, module: 0 }));
        assert!(s.active_module().is_none());
        assert!(matches!(s.assignment_view(), AssignmentView::Open(a) if a.title == "Build X"));
        assert_eq!(s.mark_complete().await, Err(ProgressError::NoActiveModule));

        s.set_assignment_url("https://github.com/u/x");
        s.submit_assignment().await.unwrap();
        assert_eq!(
            s.api().calls(),
            vec![Call::Assignment("ms3".into(), "https://github.com/u/x".into())]
        );

        s.select_module(0, 0).unwrap();
        assert_eq!(s.active_module().and_then(|m| m.id.as_deref()), Some("m1"));
    }

    #[test]
    fn open_assignment_for_checks_the_milestone() {
        let mut s = session(Stub::default());
        assert_eq!(
            s.open_assignment_for(9),
            Err(ProgressError::Index(IndexError::new(Node::Milestone, 9, 3)))
        );
        assert_eq!(s.open_assignment_for(1), Err(ProgressError::NoAssignment));
        assert_eq!(s.cursor().milestone, 0);
        assert_eq!(s.cursor().view, ViewMode::Video);
    }

    #[test]
    fn removed_modules_do_not_count_toward_completion() {
        let e = Enrollment {
            progress: 100.0,
            completed_modules: ["m1", "m2", "m3", "gone-1", "gone-2"].map(String::from).to_vec(),
            ..Enrollment::default()
        };
        let s = LearnerSession::new(Arc::new(Stub::default()), course(), e).unwrap();
        let summary = s.summary();
        assert_eq!((summary.completed, summary.total), (3, 4));
        assert!(!summary.course_complete);
    }

    #[test]
    fn summary_counts_distinct_modules() {
        let e = Enrollment {
            progress: 50.0,
            completed_modules: vec!["m1".into(), "m1".into(), "m2".into()],
            ..Enrollment::default()
        };
        let s = LearnerSession::new(Arc::new(Stub::default()), course(), e).unwrap();
        let summary = s.summary();
        assert_eq!((summary.completed, summary.total), (2, 4));
        assert_eq!(summary.percent, 50.0);
        assert!(!summary.course_complete);

        let status = s.module_status(Position { milestone: 0, module: 0 }).unwrap();
        assert!(status.completed && status.has_quiz && status.active && !status.quiz_passed);
    }
}
