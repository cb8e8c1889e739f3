//! Structural editing of a course curriculum.
//!
//! Every operation takes the current tree by reference and returns a new
//! one; the previous tree is never touched. [`CourseEditor`] layers focus
//! state, undo history and saving on top of these functions.

use std::collections::VecDeque;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::CourseApi;
use crate::error::{EditError, IndexError, Node, SaveError};
use crate::models::{Assignment, Category, Course, Level, Milestone, Module, Question, Quiz};
use crate::validate::validate;

const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub enum CourseField {
    Title(String),
    Description(String),
    Price(f64),
    Category(Category),
    Level(Level),
    Thumbnail(String),
    Batch(String),
    StartDate(Option<NaiveDate>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MilestoneField {
    Title(String),
    Description(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleField {
    Title(String),
    Description(String),
    VideoUrl(String),
    Duration(u32),
    IsFree(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizField {
    Title(String),
    PassingScore(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionField {
    Text(String),
    CorrectAnswer(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentField {
    Title(String),
    Description(String),
    Instructions(String),
    Deadline(u32),
    MaxScore(u32),
}

/// One edit, as issued by the authoring form.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    UpdateCourse(CourseField),
    AddMilestone,
    UpdateMilestone { milestone: usize, field: MilestoneField },
    RemoveMilestone { milestone: usize },
    AddModule { milestone: usize },
    UpdateModule { milestone: usize, module: usize, field: ModuleField },
    RemoveModule { milestone: usize, module: usize },
    UpdateQuiz { milestone: usize, module: usize, field: QuizField },
    RemoveQuiz { milestone: usize, module: usize },
    AddQuestion { milestone: usize, module: usize },
    UpdateQuestion { milestone: usize, module: usize, question: usize, field: QuestionField },
    UpdateOption { milestone: usize, module: usize, question: usize, option: usize, value: String },
    RemoveQuestion { milestone: usize, module: usize, question: usize },
    UpdateAssignment { milestone: usize, field: AssignmentField },
}

pub fn apply(course: &Course, edit: Edit) -> Result<Course, EditError> {
    match edit {
        Edit::UpdateCourse(field) => update_course_field(course, field),
        Edit::AddMilestone => Ok(add_milestone(course)),
        Edit::UpdateMilestone { milestone, field } => update_milestone_field(course, milestone, field),
        Edit::RemoveMilestone { milestone } => remove_milestone(course, milestone),
        Edit::AddModule { milestone } => add_module(course, milestone),
        Edit::UpdateModule { milestone, module, field } => update_module(course, milestone, module, field),
        Edit::RemoveModule { milestone, module } => remove_module(course, milestone, module),
        Edit::UpdateQuiz { milestone, module, field } => update_quiz(course, milestone, module, field),
        Edit::RemoveQuiz { milestone, module } => remove_quiz(course, milestone, module),
        Edit::AddQuestion { milestone, module } => add_quiz_question(course, milestone, module),
        Edit::UpdateQuestion { milestone, module, question, field } => {
            update_quiz_question(course, milestone, module, question, field)
        }
        Edit::UpdateOption { milestone, module, question, option, value } => {
            update_quiz_option(course, milestone, module, question, option, value)
        }
        Edit::RemoveQuestion { milestone, module, question } => {
            remove_quiz_question(course, milestone, module, question)
        }
        Edit::UpdateAssignment { milestone, field } => update_assignment(course, milestone, field),
    }
}

// --- course ---

pub fn update_course_field(course: &Course, field: CourseField) -> Result<Course, EditError> {
    let mut next = course.clone();
    match field {
        CourseField::Title(v) => next.title = v,
        CourseField::Description(v) => next.description = v,
        CourseField::Price(v) => {
            if !v.is_finite() || v < 0.0 {
                return Err(out_of_range("price", v));
            }
            next.price = v;
        }
        CourseField::Category(v) => next.category = v,
        CourseField::Level(v) => next.level = v,
        CourseField::Thumbnail(v) => next.thumbnail = v,
        CourseField::Batch(v) => next.batch = v,
        CourseField::StartDate(v) => next.start_date = v,
    }
    Ok(next)
}

// --- milestones ---

pub fn add_milestone(course: &Course) -> Course {
    let mut next = course.clone();
    let order = next.milestones.len() as u32 + 1;
    next.milestones.push(Milestone {
        order,
        assignment: Some(Assignment::default()),
        ..Milestone::default()
    });
    next
}

pub fn update_milestone_field(
    course: &Course,
    milestone: usize,
    field: MilestoneField,
) -> Result<Course, EditError> {
    let mut next = course.clone();
    let m = milestone_mut(&mut next, milestone)?;
    match field {
        MilestoneField::Title(v) => m.title = v,
        MilestoneField::Description(v) => m.description = v,
    }
    Ok(next)
}

pub fn remove_milestone(course: &Course, milestone: usize) -> Result<Course, EditError> {
    let mut next = course.clone();
    milestone_mut(&mut next, milestone)?;
    next.milestones.remove(milestone);
    renumber(&mut next);
    Ok(next)
}

/// Re-establish `order == position + 1` for every milestone.
pub fn renumber(course: &mut Course) {
    for (i, m) in course.milestones.iter_mut().enumerate() {
        m.order = i as u32 + 1;
    }
}

// --- modules ---

pub fn add_module(course: &Course, milestone: usize) -> Result<Course, EditError> {
    let mut next = course.clone();
    milestone_mut(&mut next, milestone)?.modules.push(Module {
        quiz: Some(Quiz::default()),
        ..Module::default()
    });
    Ok(next)
}

pub fn update_module(
    course: &Course,
    milestone: usize,
    module: usize,
    field: ModuleField,
) -> Result<Course, EditError> {
    let mut next = course.clone();
    let m = module_mut(&mut next, milestone, module)?;
    match field {
        ModuleField::Title(v) => m.title = v,
        ModuleField::Description(v) => m.description = v,
        ModuleField::VideoUrl(v) => m.video_url = v,
        ModuleField::Duration(v) => m.duration = v,
        ModuleField::IsFree(v) => m.is_free = v,
    }
    Ok(next)
}

pub fn remove_module(course: &Course, milestone: usize, module: usize) -> Result<Course, EditError> {
    let mut next = course.clone();
    module_mut(&mut next, milestone, module)?;
    next.milestones[milestone].modules.remove(module);
    Ok(next)
}

// --- quizzes ---

pub fn update_quiz(
    course: &Course,
    milestone: usize,
    module: usize,
    field: QuizField,
) -> Result<Course, EditError> {
    let mut next = course.clone();
    let quiz = module_mut(&mut next, milestone, module)?.quiz.get_or_insert_with(Quiz::default);
    match field {
        QuizField::Title(v) => quiz.title = v,
        QuizField::PassingScore(v) => {
            if v > 100 {
                return Err(out_of_range("passingScore", v));
            }
            quiz.passing_score = v;
        }
    }
    Ok(next)
}

pub fn remove_quiz(course: &Course, milestone: usize, module: usize) -> Result<Course, EditError> {
    let mut next = course.clone();
    module_mut(&mut next, milestone, module)?.quiz = None;
    Ok(next)
}

pub fn add_quiz_question(course: &Course, milestone: usize, module: usize) -> Result<Course, EditError> {
    let mut next = course.clone();
    module_mut(&mut next, milestone, module)?
        .quiz
        .get_or_insert_with(Quiz::default)
        .questions
        .push(Question::blank());
    Ok(next)
}

pub fn update_quiz_question(
    course: &Course,
    milestone: usize,
    module: usize,
    question: usize,
    field: QuestionField,
) -> Result<Course, EditError> {
    let mut next = course.clone();
    let q = question_mut(&mut next, milestone, module, question)?;
    match field {
        QuestionField::Text(v) => q.text = v,
        QuestionField::CorrectAnswer(v) => {
            if v >= q.options.len() {
                return Err(IndexError::new(Node::Option, v, q.options.len()).into());
            }
            q.correct_answer = v;
        }
    }
    Ok(next)
}

pub fn update_quiz_option(
    course: &Course,
    milestone: usize,
    module: usize,
    question: usize,
    option: usize,
    value: String,
) -> Result<Course, EditError> {
    let mut next = course.clone();
    let q = question_mut(&mut next, milestone, module, question)?;
    let len = q.options.len();
    let slot = q
        .options
        .get_mut(option)
        .ok_or(IndexError::new(Node::Option, option, len))?;
    *slot = value;
    Ok(next)
}

/// Later questions shift down by one; nothing is renumbered.
pub fn remove_quiz_question(
    course: &Course,
    milestone: usize,
    module: usize,
    question: usize,
) -> Result<Course, EditError> {
    let mut next = course.clone();
    question_mut(&mut next, milestone, module, question)?;
    if let Some(quiz) = next.milestones[milestone].modules[module].quiz.as_mut() {
        quiz.questions.remove(question);
    }
    Ok(next)
}

/// Current position of the question created with `key`, if it still exists.
pub fn question_position(course: &Course, milestone: usize, module: usize, key: Uuid) -> Option<usize> {
    course
        .milestones
        .get(milestone)?
        .modules
        .get(module)?
        .quiz
        .as_ref()?
        .questions
        .iter()
        .position(|q| q.key == key)
}

// --- assignments ---

pub fn update_assignment(
    course: &Course,
    milestone: usize,
    field: AssignmentField,
) -> Result<Course, EditError> {
    let mut next = course.clone();
    let a = milestone_mut(&mut next, milestone)?
        .assignment
        .get_or_insert_with(Assignment::default);
    match field {
        AssignmentField::Title(v) => a.title = v,
        AssignmentField::Description(v) => a.description = v,
        AssignmentField::Instructions(v) => a.instructions = v,
        AssignmentField::Deadline(v) => {
            if v == 0 {
                return Err(out_of_range("deadline", v));
            }
            a.deadline = v;
        }
        AssignmentField::MaxScore(v) => a.max_score = v,
    }
    Ok(next)
}

// --- wire ---

/// The payload sent to `POST /courses` or `PATCH /courses/:id`.
pub fn serialize_for_save(course: &Course) -> Result<Value, serde_json::Error> {
    serde_json::to_value(course)
}

/// Normalize a fetched course into an editable tree: absent optional
/// fields take their defaults and milestone order follows position.
pub fn deserialize_from_load(payload: Value) -> Result<Course, serde_json::Error> {
    let mut course: Course = serde_json::from_value(payload)?;
    renumber(&mut course);
    Ok(course)
}

/// Copy local question keys onto a course returned by the backend, matching
/// questions by position. Questions with no counterpart keep fresh keys.
pub fn carry_question_keys(from: &Course, into: &mut Course) {
    for (old_m, new_m) in from.milestones.iter().zip(into.milestones.iter_mut()) {
        for (old, new) in old_m.modules.iter().zip(new_m.modules.iter_mut()) {
            let (Some(old_q), Some(new_q)) = (old.quiz.as_ref(), new.quiz.as_mut()) else {
                continue;
            };
            for (o, n) in old_q.questions.iter().zip(new_q.questions.iter_mut()) {
                n.key = o.key;
            }
        }
    }
}

// --- lookups ---

fn milestone_mut(course: &mut Course, milestone: usize) -> Result<&mut Milestone, IndexError> {
    let len = course.milestones.len();
    course
        .milestones
        .get_mut(milestone)
        .ok_or(IndexError::new(Node::Milestone, milestone, len))
}

fn module_mut(course: &mut Course, milestone: usize, module: usize) -> Result<&mut Module, IndexError> {
    let modules = &mut milestone_mut(course, milestone)?.modules;
    let len = modules.len();
    modules
        .get_mut(module)
        .ok_or(IndexError::new(Node::Module, module, len))
}

// a missing quiz addresses like an empty question list
fn question_mut(
    course: &mut Course,
    milestone: usize,
    module: usize,
    question: usize,
) -> Result<&mut Question, IndexError> {
    let quiz = module_mut(course, milestone, module)?.quiz.as_mut();
    let len = quiz.as_ref().map_or(0, |q| q.questions.len());
    quiz.and_then(|q| q.questions.get_mut(question))
        .ok_or(IndexError::new(Node::Question, question, len))
}

fn out_of_range(field: &'static str, value: impl ToString) -> EditError {
    EditError::OutOfRange { field, value: value.to_string() }
}

/// Authoring session over one course draft.
#[derive(Debug, Clone)]
pub struct CourseEditor {
    draft: Course,
    history: VecDeque<Course>,
    expanded_milestone: Option<usize>,
    expanded_module: Option<(usize, usize)>,
}

impl Default for CourseEditor {
    fn default() -> Self {
        Self::new(Course::default())
    }
}

impl CourseEditor {
    pub fn new(draft: Course) -> Self {
        let expanded_milestone = (!draft.milestones.is_empty()).then_some(0);
        Self {
            draft,
            history: VecDeque::new(),
            expanded_milestone,
            expanded_module: None,
        }
    }

    pub fn load(payload: Value) -> Result<Self, serde_json::Error> {
        Ok(Self::new(deserialize_from_load(payload)?))
    }

    pub fn draft(&self) -> &Course {
        &self.draft
    }

    pub fn expanded_milestone(&self) -> Option<usize> {
        self.expanded_milestone
    }

    pub fn expanded_module(&self) -> Option<(usize, usize)> {
        self.expanded_module
    }

    pub fn toggle_milestone(&mut self, milestone: usize) {
        self.expanded_milestone = match self.expanded_milestone {
            Some(i) if i == milestone => None,
            _ => Some(milestone),
        };
    }

    pub fn toggle_module(&mut self, milestone: usize, module: usize) {
        self.expanded_module = match self.expanded_module {
            Some(p) if p == (milestone, module) => None,
            _ => Some((milestone, module)),
        };
    }

    pub fn apply(&mut self, edit: Edit) -> Result<(), EditError> {
        let focus = Focus::of(&edit);
        let next = apply(&self.draft, edit)?;
        let prev = std::mem::replace(&mut self.draft, next);
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(prev);
        self.refocus(focus);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Restore the tree as it was before the last edit.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(prev) => {
                self.draft = prev;
                self.clamp_focus();
                true
            }
            None => false,
        }
    }

    /// Validate, then create or update the course depending on whether it
    /// already has an id. The draft is replaced by what the backend returns.
    pub async fn save<A: CourseApi + ?Sized>(&mut self, api: &A) -> Result<&Course, SaveError> {
        if let Err(e) = validate(&self.draft) {
            warn!(issues = e.issues.len(), "course rejected before save");
            return Err(e.into());
        }
        let payload = serialize_for_save(&self.draft).map_err(|e| SaveError::Encode(e.to_string()))?;

        let saved = match self.draft.id.as_deref() {
            Some(id) => api.update_course(id, &payload).await,
            None => api.create_course(&payload).await,
        }
        .map_err(|e| {
            tracing::error!(error = %e, "course save failed");
            e
        })?;

        info!(course_id = saved.id.as_deref().unwrap_or_default(), "course saved");
        let mut saved = saved;
        carry_question_keys(&self.draft, &mut saved);
        self.draft = saved;
        renumber(&mut self.draft);
        self.history.clear();
        self.clamp_focus();
        Ok(&self.draft)
    }

    fn refocus(&mut self, focus: Focus) {
        match focus {
            Focus::NewMilestone => {
                self.expanded_milestone = self.draft.milestones.len().checked_sub(1);
            }
            Focus::RemovedMilestone(removed) => {
                self.expanded_milestone = match self.expanded_milestone {
                    Some(i) if i == removed => None,
                    Some(i) if i > removed => Some(i - 1),
                    other => other,
                };
                self.expanded_module = match self.expanded_module {
                    Some((mi, _)) if mi == removed => None,
                    Some((mi, mo)) if mi > removed => Some((mi - 1, mo)),
                    other => other,
                };
            }
            Focus::RemovedModule(milestone, removed) => {
                self.expanded_module = match self.expanded_module {
                    Some((mi, mo)) if mi == milestone && mo == removed => None,
                    Some((mi, mo)) if mi == milestone && mo > removed => Some((mi, mo - 1)),
                    other => other,
                };
            }
            Focus::Unchanged => {}
        }
    }

    fn clamp_focus(&mut self) {
        let milestones = &self.draft.milestones;
        if self.expanded_milestone.is_some_and(|i| i >= milestones.len()) {
            self.expanded_milestone = None;
        }
        if let Some((mi, mo)) = self.expanded_module {
            if milestones.get(mi).map_or(true, |m| mo >= m.modules.len()) {
                self.expanded_module = None;
            }
        }
    }
}

enum Focus {
    NewMilestone,
    RemovedMilestone(usize),
    RemovedModule(usize, usize),
    Unchanged,
}

impl Focus {
    fn of(edit: &Edit) -> Self {
        match *edit {
            Edit::AddMilestone => Focus::NewMilestone,
            Edit::RemoveMilestone { milestone } => Focus::RemovedMilestone(milestone),
            Edit::RemoveModule { milestone, module } => Focus::RemovedModule(milestone, module),
            _ => Focus::Unchanged,
        }
    }
}
