use std::{env, fs, process};

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursemaster::api::{CourseApi, ProgressApi};
use coursemaster::catalog::course_stats;
use coursemaster::editor::deserialize_from_load;
use coursemaster::models::{Course, Enrollment};
use coursemaster::progress::{assignment_submission_for, completed_count, is_module_completed, is_quiz_passed, total_modules};
use coursemaster::validate::validate;
use coursemaster::{Config, HttpBackend};

const USAGE: &str = "usage:
  coursemaster check <course.json>
  coursemaster outline <course.json> [enrollment.json]
  coursemaster fetch <course-id>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "coursemaster=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["check", path] => check(path),
        ["outline", course] => outline(course, None),
        ["outline", course, enrollment] => outline(course, Some(*enrollment)),
        ["fetch", course_id] => fetch(course_id).await,
        _ => {
            eprintln!("{USAGE}");
            process::exit(2);
        }
    }
}

fn load_course(path: &str) -> anyhow::Result<Course> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let value: serde_json::Value = serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;
    // accept both a bare course and the backend's `{ "data": ... }` envelope
    let value = match value.get("data") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => value,
    };
    Ok(deserialize_from_load(value)?)
}

fn check(path: &str) -> anyhow::Result<()> {
    let course = load_course(path)?;
    if let Err(e) = validate(&course) {
        for issue in &e.issues {
            eprintln!("  {issue}");
        }
        bail!("{} problem(s) in {path}", e.issues.len());
    }
    let stats = course_stats(&course);
    println!(
        "{}: ok ({} milestones, {} modules, {} min)",
        course.title, stats.milestones, stats.modules, stats.duration_minutes
    );
    Ok(())
}

fn outline(course_path: &str, enrollment_path: Option<&str>) -> anyhow::Result<()> {
    let course = load_course(course_path)?;
    let enrollment = match enrollment_path {
        Some(p) => {
            let raw = fs::read_to_string(p).with_context(|| format!("reading {p}"))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing {p}"))?
        }
        None => Enrollment::default(),
    };
    print_outline(&course, &enrollment);
    Ok(())
}

async fn fetch(course_id: &str) -> anyhow::Result<()> {
    let config = Config::from_env();
    let backend = HttpBackend::from_config(&config)?;
    tracing::info!(api = %config.api_url, course_id, "fetching course");

    let course = backend.get_course(course_id).await?;
    let enrollment = match backend.enrollment_details(course_id).await {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(error = %e, "no enrollment details, showing content only");
            Enrollment::default()
        }
    };
    print_outline(&course, &enrollment);
    Ok(())
}

fn print_outline(course: &Course, enrollment: &Enrollment) {
    println!("{}", course.title);
    println!(
        "{}/{} modules completed, {}% complete",
        completed_count(course, enrollment),
        total_modules(course),
        enrollment.progress
    );
    for m in &course.milestones {
        println!("{}. {}", m.order, m.title);
        for module in &m.modules {
            let id = module.id.as_deref().unwrap_or_default();
            let done = if is_module_completed(enrollment, id) { "x" } else { " " };
            let quiz = match (module.has_quiz(), is_quiz_passed(course, enrollment, id)) {
                (true, true) => " [quiz passed]",
                (true, false) => " [quiz]",
                _ => "",
            };
            let free = if module.is_free { " (free preview)" } else { "" };
            println!("   [{done}] {} ({} min){quiz}{free}", module.title, module.duration);
        }
        if let Some(a) = m.assignment.as_ref().filter(|a| !a.is_blank()) {
            let status = m
                .id
                .as_deref()
                .and_then(|id| assignment_submission_for(enrollment, id))
                .map(|s| s.status.as_str())
                .unwrap_or("not submitted");
            println!("   assignment: {} (max {}, {} days) - {status}", a.title, a.max_score, a.deadline);
        }
    }
}
