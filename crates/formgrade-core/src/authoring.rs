//! TOML form definition parser.
//!
//! Loads form definitions from TOML files and directories, and lints them
//! for key problems. Parsing is intentionally permissive: a definition is
//! a draft until published, so structural typing is the only hard
//! requirement and everything else surfaces as a warning.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{
    count_blank_runs, Category, FollowUp, Form, FormMode, FormSettings, Question, QuestionKind,
};

/// Intermediate TOML structure for parsing form definition files.
///
/// Authoring files use snake_case field names; the camelCase renames on the
/// model types belong to the JSON wire, not to author-edited files.
#[derive(Debug, Deserialize)]
struct TomlFormFile {
    form: TomlFormHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlFormHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_mode_str")]
    mode: String,
    #[serde(default = "default_true")]
    is_active: bool,
    #[serde(default)]
    settings: Option<TomlSettings>,
}

fn default_mode_str() -> String {
    "survey".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct TomlSettings {
    #[serde(default = "default_true")]
    allow_anonymous: bool,
    #[serde(default)]
    show_results: bool,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_points")]
    points: u32,

    // categorize
    #[serde(default)]
    items: Vec<String>,
    #[serde(default)]
    categories: Vec<TomlCategory>,

    // cloze
    #[serde(default)]
    text: String,
    #[serde(default)]
    correct_answer: Vec<String>,

    // comprehension
    #[serde(default)]
    passage: String,
    #[serde(default)]
    follow_up_questions: Vec<TomlFollowUp>,
}

fn default_points() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct TomlCategory {
    name: String,
    #[serde(default)]
    items: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TomlFollowUp {
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_answer: String,
}

/// Parse a single TOML file into a `Form`.
pub fn parse_form(path: &Path) -> Result<Form> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read form definition: {}", path.display()))?;

    parse_form_str(&content, path)
}

/// Parse a TOML string into a `Form` (useful for testing).
pub fn parse_form_str(content: &str, source_path: &Path) -> Result<Form> {
    let parsed: TomlFormFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mode: FormMode = parsed
        .form
        .mode
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let settings = match parsed.form.settings {
        Some(s) => FormSettings {
            allow_anonymous: s.allow_anonymous,
            show_results: s.show_results,
        },
        None => FormSettings::default(),
    };

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind = match q.kind.as_str() {
                "categorize" => QuestionKind::Categorize {
                    items: q.items,
                    categories: q
                        .categories
                        .into_iter()
                        .map(|c| Category {
                            name: c.name,
                            items: c.items,
                        })
                        .collect(),
                },
                "cloze" => QuestionKind::Cloze {
                    text: q.text,
                    correct_answer: q.correct_answer,
                },
                "comprehension" => QuestionKind::Comprehension {
                    passage: q.passage,
                    follow_up_questions: q
                        .follow_up_questions
                        .into_iter()
                        .map(|f| FollowUp {
                            question: f.question,
                            options: f.options,
                            correct_answer: f.correct_answer,
                        })
                        .collect(),
                },
                other => anyhow::bail!("unknown question type '{other}' in question '{}'", q.id),
            };

            Ok(Question {
                id: q.id,
                title: q.title,
                description: q.description,
                points: q.points,
                kind,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Form {
        id: parsed.form.id,
        title: parsed.form.title,
        description: parsed.form.description,
        mode,
        questions,
        settings,
        is_active: parsed.form.is_active,
    })
}

/// Recursively load all `.toml` form definitions from a directory.
pub fn load_form_directory(dir: &Path) -> Result<Vec<Form>> {
    let mut forms = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            forms.extend(load_form_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_form(&path) {
                Ok(form) => forms.push(form),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(forms)
}

/// A warning from form definition linting.
#[derive(Debug, Clone)]
pub struct AuthoringWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Lint a form definition for key problems.
///
/// Lints never reject: a draft may legitimately have empty categories or
/// unfinished keys. They exist so the author sees the problem before a
/// respondent does.
pub fn lint_form(form: &Form) -> Vec<AuthoringWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = std::collections::HashSet::new();
    for question in &form.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(AuthoringWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question ID: {}", question.id),
            });
        }
    }

    for question in &form.questions {
        let warn = |warnings: &mut Vec<AuthoringWarning>, message: String| {
            warnings.push(AuthoringWarning {
                question_id: Some(question.id.clone()),
                message,
            });
        };

        if question.title.trim().is_empty() {
            warn(&mut warnings, "title is empty".into());
        }
        if question.points == 0 {
            warn(&mut warnings, "points is 0; the question cannot earn credit".into());
        }

        match &question.kind {
            QuestionKind::Categorize { items, categories } => {
                if categories.is_empty() {
                    warn(&mut warnings, "categorize question has no categories".into());
                }
                let mut assigned = std::collections::HashSet::new();
                for category in categories {
                    for item in &category.items {
                        if !items.contains(item) {
                            warn(
                                &mut warnings,
                                format!("key item '{item}' is not in the item pool"),
                            );
                        }
                        if !assigned.insert(item.as_str()) {
                            warn(
                                &mut warnings,
                                format!("key item '{item}' is assigned to more than one category"),
                            );
                        }
                    }
                }
            }
            QuestionKind::Cloze {
                text,
                correct_answer,
            } => {
                let blanks = count_blank_runs(text);
                if blanks == 0 {
                    warn(&mut warnings, "cloze text has no blank markers".into());
                }
                if correct_answer.len() != blanks {
                    warn(
                        &mut warnings,
                        format!(
                            "text has {blanks} blanks but the key has {} answers",
                            correct_answer.len()
                        ),
                    );
                }
            }
            QuestionKind::Comprehension {
                follow_up_questions,
                ..
            } => {
                if follow_up_questions.is_empty() {
                    warn(&mut warnings, "comprehension question has no follow-ups".into());
                }
                for follow_up in follow_up_questions {
                    if follow_up.options.is_empty() {
                        warn(
                            &mut warnings,
                            format!("follow-up '{}' has no options", follow_up.question),
                        );
                    } else if !follow_up.options.contains(&follow_up.correct_answer) {
                        warn(
                            &mut warnings,
                            format!(
                                "follow-up '{}' key '{}' is not one of its options",
                                follow_up.question, follow_up.correct_answer
                            ),
                        );
                    }
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[form]
id = "geography-quiz"
title = "Geography Quiz"
description = "Capitals and categories"
mode = "test"

[form.settings]
allow_anonymous = true
show_results = true

[[questions]]
id = "q1"
type = "categorize"
title = "Sort the items"
points = 2
items = ["Apple", "Car"]

[[questions.categories]]
name = "Fruit"
items = ["Apple"]

[[questions.categories]]
name = "Vehicle"
items = ["Car"]

[[questions]]
id = "q2"
type = "cloze"
title = "Capitals"
text = "The capital of ___ is ___."
correct_answer = ["France", "Paris"]

[[questions]]
id = "q3"
type = "comprehension"
title = "Reading"
passage = "A short passage."

[[questions.follow_up_questions]]
question = "What was it about?"
options = ["A", "B"]
correct_answer = "B"
"#;

    #[test]
    fn parse_valid_toml() {
        let form = parse_form_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(form.id, "geography-quiz");
        assert_eq!(form.mode, FormMode::Test);
        assert!(form.settings.show_results);
        assert_eq!(form.questions.len(), 3);
        assert_eq!(form.questions[0].points, 2);
        assert_eq!(form.questions[1].blank_count(), Some(2));
        assert!(matches!(
            form.questions[2].kind,
            QuestionKind::Comprehension { .. }
        ));
        assert!(lint_form(&form).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[form]
id = "minimal"
title = "Minimal"

[[questions]]
id = "q1"
type = "cloze"
title = "Fill"
text = "__"
correct_answer = ["x"]
"#;
        let form = parse_form_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(form.mode, FormMode::Survey);
        assert!(form.is_active);
        assert!(form.settings.allow_anonymous);
        assert!(!form.settings.show_results);
        assert_eq!(form.questions[0].points, 1);
    }

    #[test]
    fn parse_unknown_question_type() {
        let toml = r#"
[form]
id = "bad"
title = "Bad"

[[questions]]
id = "q1"
type = "essay"
title = "Write"
"#;
        let result = parse_form_str(toml, &PathBuf::from("test.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("essay"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_form_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn lint_duplicate_ids() {
        let toml = r#"
[form]
id = "dupes"
title = "Dupes"

[[questions]]
id = "same"
type = "cloze"
title = "First"
text = "__"
correct_answer = ["x"]

[[questions]]
id = "same"
type = "cloze"
title = "Second"
text = "__"
correct_answer = ["y"]
"#;
        let form = parse_form_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = lint_form(&form);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
    }

    #[test]
    fn lint_key_item_outside_pool() {
        let toml = r#"
[form]
id = "stray"
title = "Stray"

[[questions]]
id = "q1"
type = "categorize"
title = "Sort"
items = ["Apple"]

[[questions.categories]]
name = "Fruit"
items = ["Apple", "Banana"]
"#;
        let form = parse_form_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = lint_form(&form);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("'Banana'") && w.message.contains("pool")));
    }

    #[test]
    fn lint_key_item_in_two_categories() {
        let toml = r#"
[form]
id = "double"
title = "Double"

[[questions]]
id = "q1"
type = "categorize"
title = "Sort"
items = ["Apple"]

[[questions.categories]]
name = "A"
items = ["Apple"]

[[questions.categories]]
name = "B"
items = ["Apple"]
"#;
        let form = parse_form_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = lint_form(&form);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("more than one category")));
    }

    #[test]
    fn lint_cloze_key_length_mismatch() {
        let toml = r#"
[form]
id = "cloze"
title = "Cloze"

[[questions]]
id = "q1"
type = "cloze"
title = "Fill"
text = "___ and ___"
correct_answer = ["only-one"]
"#;
        let form = parse_form_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = lint_form(&form);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("2 blanks") && w.message.contains("1 answers")));
    }

    #[test]
    fn lint_follow_up_key_not_an_option() {
        let toml = r#"
[form]
id = "comp"
title = "Comp"

[[questions]]
id = "q1"
type = "comprehension"
title = "Read"
passage = "P"

[[questions.follow_up_questions]]
question = "Q"
options = ["A", "B"]
correct_answer = "C"
"#;
        let form = parse_form_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = lint_form(&form);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("not one of its options")));
    }

    #[test]
    fn lint_is_permissive_about_drafts() {
        // Empty categories and zero-blank text warn; they never error.
        let toml = r#"
[form]
id = "draft"
title = "Draft"

[[questions]]
id = "q1"
type = "categorize"
title = "Unfinished"
items = []
"#;
        let form = parse_form_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = lint_form(&form);
        assert!(!warnings.is_empty());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("quiz.toml");
        std::fs::write(&file_path, VALID_TOML).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let forms = load_form_directory(dir.path()).unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].id, "geography-quiz");
    }

    #[test]
    fn load_directory_skips_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("bad.toml"), "not toml [").unwrap();

        let forms = load_form_directory(dir.path()).unwrap();
        assert_eq!(forms.len(), 1);
    }
}
