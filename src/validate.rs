use crate::error::{Problem, ValidationError, ValidationIssue};
use crate::models::Course;
use crate::video;

/// Checks run before a course is sent to the backend. All issues are
/// collected so the form can flag every field at once.
pub fn validate(course: &Course) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    let mut flag = |path: String, problem: Problem| issues.push(ValidationIssue { path, problem });

    if blank(&course.title) {
        flag("title".into(), Problem::Empty);
    }
    if blank(&course.description) {
        flag("description".into(), Problem::Empty);
    }
    if !course.price.is_finite() {
        flag("price".into(), Problem::NotFinite);
    } else if course.price < 0.0 {
        flag("price".into(), Problem::Negative);
    }

    for (mi, milestone) in course.milestones.iter().enumerate() {
        let base = format!("milestones[{mi}]");
        if blank(&milestone.title) {
            flag(format!("{base}.title"), Problem::Empty);
        }

        for (mo, module) in milestone.modules.iter().enumerate() {
            let base = format!("{base}.modules[{mo}]");
            if blank(&module.title) {
                flag(format!("{base}.title"), Problem::Empty);
            }
            if blank(&module.video_url) {
                flag(format!("{base}.videoUrl"), Problem::Empty);
            } else if !video::is_embeddable(&module.video_url) {
                flag(format!("{base}.videoUrl"), Problem::NotEmbeddable);
            }
            let questions = module.quiz.iter().flat_map(|q| q.questions.iter());
            for (qi, question) in questions.enumerate() {
                if question.correct_answer >= question.options.len() {
                    flag(
                        format!("{base}.quiz.questions[{qi}].correctAnswer"),
                        Problem::AnswerOutOfRange,
                    );
                }
            }
        }

        // an untouched scaffold is allowed to stay empty
        if let Some(assignment) = milestone.assignment.as_ref().filter(|a| !a.is_blank()) {
            if blank(&assignment.title) {
                flag(format!("{base}.assignment.title"), Problem::Empty);
            }
            if blank(&assignment.description) {
                flag(format!("{base}.assignment.description"), Problem::Empty);
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}
