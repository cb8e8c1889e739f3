use std::fmt;

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Course,
    Milestone,
    Module,
    Question,
    Option,
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Node::Course => "course",
            Node::Milestone => "milestone",
            Node::Module => "module",
            Node::Question => "question",
            Node::Option => "option",
        })
    }
}

/// An index that does not address an existing node. Indices come from
/// rendering the current tree, so this is a caller defect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{node} index {index} out of range (len {len})")]
pub struct IndexError {
    pub node: Node,
    pub index: usize,
    pub len: usize,
}

impl IndexError {
    pub fn new(node: Node, index: usize, len: usize) -> Self {
        Self { node, index, len }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error("{field} = {value} is out of range")]
    OutOfRange { field: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    Empty,
    Negative,
    NotFinite,
    NotEmbeddable,
    AnswerOutOfRange,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Problem::Empty => "is required",
            Problem::Negative => "must not be negative",
            Problem::NotFinite => "must be a finite number",
            Problem::NotEmbeddable => "is not a playable video url",
            Problem::AnswerOutOfRange => "does not point at an option",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Wire path of the offending field, e.g. `milestones[0].modules[1].videoUrl`.
    pub path: String,
    pub problem: Problem,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.problem)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("course is not ready to save: {}", join(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn join(issues: &[ValidationIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("session expired or missing")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("backend returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| "Something went wrong".into());
        match status {
            StatusCode::UNAUTHORIZED => RemoteError::Unauthorized,
            StatusCode::FORBIDDEN => RemoteError::Forbidden(message),
            StatusCode::NOT_FOUND => RemoteError::NotFound(message),
            _ => RemoteError::Status { status, message },
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else {
            RemoteError::Transport(e.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("could not encode course: {0}")]
    Encode(String),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgressError {
    #[error("no module is selected")]
    NoActiveModule,
    #[error("the selected module has no quiz")]
    NoQuiz,
    #[error("the selected milestone has no assignment")]
    NoAssignment,
    #[error("answered {answered} of {total} questions")]
    IncompleteAnswers { answered: usize, total: usize },
    #[error("submission url is empty")]
    EmptyUrl,
    #[error("an assignment was already submitted for this milestone")]
    AlreadySubmitted,
    #[error("content has not been saved yet (missing {0} id)")]
    Unsaved(Node),
    #[error("cannot {0} in the current view")]
    InvalidTransition(&'static str),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl ProgressError {
    /// Local rejections never reached the network.
    pub fn is_local(&self) -> bool {
        !matches!(self, ProgressError::Remote(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReviewError {
    #[error("a review must approve, reject or mark the submission reviewed")]
    PendingStatus,
    #[error("score {score} exceeds the maximum of {max}")]
    ScoreAboveMax { score: u32, max: u32 },
    #[error("no submission with id {0}")]
    UnknownSubmission(String),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}
