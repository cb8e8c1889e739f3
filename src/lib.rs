//! Course authoring and learner progress for the CourseMaster marketplace.
//!
//! [`editor`] maintains an editable course tree (milestones, modules,
//! quizzes, assignments) and saves it; [`progress`] joins a published tree
//! with a learner's enrollment to drive the learning player. The backend is
//! reached through the traits in [`api`], implemented over REST in [`client`].

pub mod admin;
pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod editor;
pub mod error;
pub mod models;
pub mod progress;
pub mod review;
pub mod validate;
pub mod video;
pub mod wire;

pub use client::{HttpBackend, Session};
pub use config::Config;
pub use editor::{CourseEditor, Edit};
pub use error::{EditError, IndexError, ProgressError, RemoteError, SaveError, ValidationError};
pub use progress::LearnerSession;
