use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use coursemaster::api::CourseApi;
use coursemaster::catalog::{CoursePage, CourseQuery};
use coursemaster::editor::{question_position, CourseField, MilestoneField, ModuleField, QuestionField};
use coursemaster::models::Course;
use coursemaster::{CourseEditor, Edit, RemoteError, SaveError};

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<(&'static str, Option<String>, Value)>>,
}

impl Recorder {
    fn saved(&self, id: &str, payload: &Value) -> Result<Course, RemoteError> {
        let mut course: Course =
            serde_json::from_value(payload.clone()).map_err(|e| RemoteError::Decode(e.to_string()))?;
        course.id = Some(id.to_string());
        for (i, m) in course.milestones.iter_mut().enumerate() {
            m.id.get_or_insert_with(|| format!("ms{i}"));
        }
        Ok(course)
    }
}

#[async_trait]
impl CourseApi for Recorder {
    async fn list_courses(&self, _query: &CourseQuery) -> Result<CoursePage, RemoteError> {
        Ok(CoursePage::default())
    }

    async fn get_course(&self, course_id: &str) -> Result<Course, RemoteError> {
        Err(RemoteError::NotFound(course_id.to_string()))
    }

    async fn create_course(&self, payload: &Value) -> Result<Course, RemoteError> {
        self.calls.lock().unwrap().push(("create", None, payload.clone()));
        self.saved("c-new", payload)
    }

    async fn update_course(&self, course_id: &str, payload: &Value) -> Result<Course, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(("update", Some(course_id.to_string()), payload.clone()));
        self.saved(course_id, payload)
    }

    async fn delete_course(&self, _course_id: &str) -> Result<(), RemoteError> {
        Ok(())
    }
}

fn filled_editor() -> CourseEditor {
    let mut editor = CourseEditor::new(Course::default());
    let edits = [
        Edit::UpdateCourse(CourseField::Title("Rust for Beginners".into())),
        Edit::UpdateCourse(CourseField::Description("From zero to crates".into())),
        Edit::UpdateCourse(CourseField::Price(19.99)),
        Edit::AddMilestone,
        Edit::UpdateMilestone { milestone: 0, field: MilestoneField::Title("Setup".into()) },
        Edit::AddModule { milestone: 0 },
        Edit::UpdateModule { milestone: 0, module: 0, field: ModuleField::Title("Install".into()) },
        Edit::UpdateModule {
            milestone: 0,
            module: 0,
            field: ModuleField::VideoUrl("https://www.youtube.com/watch?v=dQw4w9WgXcQ".into()),
        },
    ];
    for edit in edits {
        editor.apply(edit).unwrap();
    }
    editor
}

#[tokio::test]
async fn invalid_draft_never_reaches_the_backend() {
    let api = Recorder::default();
    let mut editor = CourseEditor::new(Course::default());
    editor.apply(Edit::AddMilestone).unwrap();

    let err = editor.save(&api).await.unwrap_err();

    match err {
        SaveError::Validation(v) => {
            let paths: Vec<_> = v.issues.iter().map(|i| i.path.as_str()).collect();
            assert!(paths.contains(&"title"));
            assert!(paths.contains(&"milestones[0].title"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(api.calls.lock().unwrap().is_empty());
    assert!(editor.can_undo());
}

#[tokio::test]
async fn new_course_is_created_then_updated() {
    let api = Recorder::default();
    let mut editor = filled_editor();

    let saved = editor.save(&api).await.unwrap();
    assert_eq!(saved.id.as_deref(), Some("c-new"));
    assert!(!editor.can_undo());

    editor
        .apply(Edit::UpdateCourse(CourseField::Title("Rust, Properly".into())))
        .unwrap();
    editor.save(&api).await.unwrap();

    let calls = api.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    let (verb, id, payload) = &calls[0];
    assert_eq!((*verb, id.as_deref()), ("create", None));
    assert!(payload.get("_id").is_none());
    assert_eq!(payload["milestones"][0]["order"], 1);
    assert_eq!(payload["milestones"][0]["modules"][0]["title"], "Install");

    let (verb, id, payload) = &calls[1];
    assert_eq!((*verb, id.as_deref()), ("update", Some("c-new")));
    assert_eq!(payload["title"], "Rust, Properly");
    assert_eq!(payload["milestones"][0]["_id"], "ms0");
}

#[tokio::test]
async fn question_keys_survive_a_save() {
    let api = Recorder::default();
    let mut editor = filled_editor();
    editor.apply(Edit::AddQuestion { milestone: 0, module: 0 }).unwrap();
    editor.apply(Edit::AddQuestion { milestone: 0, module: 0 }).unwrap();
    let keys: Vec<_> = editor.draft().milestones[0].modules[0]
        .quiz
        .as_ref()
        .unwrap()
        .questions
        .iter()
        .map(|q| q.key)
        .collect();
    for q in 0..2 {
        for (o, text) in ["a", "b", "c", "d"].into_iter().enumerate() {
            editor
                .apply(Edit::UpdateOption { milestone: 0, module: 0, question: q, option: o, value: text.into() })
                .unwrap();
        }
        editor
            .apply(Edit::UpdateQuestion {
                milestone: 0,
                module: 0,
                question: q,
                field: QuestionField::Text(format!("Q{q}")),
            })
            .unwrap();
    }

    editor.save(&api).await.unwrap();

    assert_eq!(question_position(editor.draft(), 0, 0, keys[0]), Some(0));
    assert_eq!(question_position(editor.draft(), 0, 0, keys[1]), Some(1));
}
