//! Prompt assembly for question generation.
//!
//! A `PromptSpec` captures what the client asked for (role-driven or
//! category/topic-driven); `build_question_prompt` turns it into a single
//! instruction string requesting N questions with a strict JSON shape.

use crate::config::Prompts;
use crate::domain::{
  topics_for_role, DEFAULT_CATEGORY, DEFAULT_DIFFICULTY, DEFAULT_ROLE, DEFAULT_TOPIC,
};
use crate::util::fill_template;

#[derive(Clone, Debug)]
pub struct PromptSpec {
  pub category: String,
  pub topic: String,
  /// Comma-separated topic list; when present it wins over `topic`.
  pub topics: Option<String>,
  pub difficulty: String,
}

impl PromptSpec {
  /// Role call site: the role doubles as category, and known roles get a
  /// curated topics line. Missing role defaults to "DevOps".
  pub fn for_role(role: Option<&str>, difficulty: Option<&str>) -> Self {
    let role = or_default(role, DEFAULT_ROLE);
    Self {
      category: role.to_string(),
      topic: role.to_string(),
      topics: topics_for_role(role).map(str::to_string),
      difficulty: or_default(difficulty, DEFAULT_DIFFICULTY).to_string(),
    }
  }

  /// Category/topic call site, mirroring the query parameters.
  pub fn for_category(
    category: Option<&str>,
    topic: Option<&str>,
    topics: Option<&str>,
    difficulty: Option<&str>,
  ) -> Self {
    Self {
      category: or_default(category, DEFAULT_CATEGORY).to_string(),
      topic: or_default(topic, DEFAULT_TOPIC).to_string(),
      topics: topics.filter(|s| !s.trim().is_empty()).map(str::to_string),
      difficulty: or_default(difficulty, DEFAULT_DIFFICULTY).to_string(),
    }
  }
}

/// Empty query parameters count as missing.
fn or_default<'a>(v: Option<&'a str>, default: &'a str) -> &'a str {
  match v {
    Some(s) if !s.trim().is_empty() => s,
    _ => default,
  }
}

pub fn build_question_prompt(prompts: &Prompts, spec: &PromptSpec, count: usize) -> String {
  let noun = if count == 1 { "question" } else { "questions" };
  let count_s = count.to_string();

  let mut prompt = fill_template(&prompts.question_preamble, &[("count", &count_s), ("noun", noun)]);
  prompt.push(' ');
  prompt.push_str(&format!("The {} should be related to the category: {}. ", noun, spec.category));
  if let Some(topics) = &spec.topics {
    prompt.push_str(&format!("Focus on one of these topics: {}. ", topics));
  } else {
    prompt.push_str(&format!("Focus on the topic: {}. ", spec.topic));
  }
  prompt.push_str(&format!("The difficulty level should be {}. ", spec.difficulty));
  prompt.push_str(&fill_template(&prompts.question_rules, &[("noun", noun)]));
  prompt.push(' ');
  let shape = if count == 1 {
    prompts.shape_object.clone()
  } else {
    fill_template(&prompts.shape_array, &[("count", &count_s)])
  };
  prompt.push_str(&shape);
  prompt
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_and_difficulty_default_when_missing() {
    let spec = PromptSpec::for_role(None, None);
    assert_eq!(spec.category, "DevOps");
    assert_eq!(spec.difficulty, "medium");
    assert!(spec.topics.is_some());
  }

  #[test]
  fn empty_params_count_as_missing() {
    let spec = PromptSpec::for_role(Some(""), Some("  "));
    assert_eq!(spec.category, "DevOps");
    assert_eq!(spec.difficulty, "medium");
  }

  #[test]
  fn unknown_role_focuses_on_the_role_name() {
    let spec = PromptSpec::for_role(Some("Staff Wizard"), Some("Hard"));
    let prompt = build_question_prompt(&Prompts::default(), &spec, 1);
    assert!(prompt.contains("Focus on the topic: Staff Wizard."));
    assert!(prompt.contains("difficulty level should be Hard"));
  }

  #[test]
  fn single_question_requests_a_json_object() {
    let spec = PromptSpec::for_category(Some("General"), Some("Database"), None, None);
    let prompt = build_question_prompt(&Prompts::default(), &spec, 1);
    assert!(prompt.contains("Generate 1 multiple-choice question"));
    assert!(prompt.contains("JSON object"));
    assert!(prompt.contains("Focus on the topic: Database."));
  }

  #[test]
  fn batch_requests_a_json_array_of_count() {
    let spec = PromptSpec::for_role(Some("SRE"), Some("Hard"));
    let prompt = build_question_prompt(&Prompts::default(), &spec, 5);
    assert!(prompt.contains("Generate 5 multiple-choice questions"));
    assert!(prompt.contains("JSON array of exactly 5 objects"));
    assert!(prompt.contains("Focus on one of these topics:"));
  }

  #[test]
  fn topics_parameter_wins_over_topic() {
    let spec = PromptSpec::for_category(None, Some("Database"), Some("DNS, Cache"), None);
    let prompt = build_question_prompt(&Prompts::default(), &spec, 1);
    assert!(prompt.contains("Focus on one of these topics: DNS, Cache."));
    assert!(!prompt.contains("Focus on the topic: Database."));
  }
}
