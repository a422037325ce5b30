//! Domain models: questions as served to the game client, score entries,
//! and the fixed impact-level option set.

use serde::{Deserialize, Serialize};

/// The four impact levels every question must offer, in this exact order.
pub const IMPACT_OPTIONS: [&str; 4] = ["Low", "Medium", "High", "Critical"];

pub const DEFAULT_ROLE: &str = "DevOps";
pub const DEFAULT_DIFFICULTY: &str = "medium";
pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_TOPIC: &str = "General";

/// Upper bound (exclusive) for the random question identifiers the cache
/// assigns. Ids are not checked for uniqueness within a batch.
pub const QUESTION_ID_RANGE: u32 = 1_000_000;

/// A question ready to be served. Field names mirror the wire format the
/// game client expects (`correctAnswer` camelCase).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
  pub id: u32,
  pub category: String,
  pub topic: String,
  pub question: String,
  pub options: Vec<String>,
  #[serde(rename = "correctAnswer")]
  pub correct_answer: String,
}

/// A question as emitted by the model, before the cache assigns an id.
/// All fields default so that shape problems surface in `validate`, not as
/// deserialization failures.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionPayload {
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub topic: String,
  #[serde(default)]
  pub question: String,
  #[serde(default)]
  pub options: Vec<String>,
  #[serde(rename = "correctAnswer", default)]
  pub correct_answer: String,
}

impl QuestionPayload {
  /// Schema check applied after JSON parsing: non-empty question text, the
  /// exact impact option set in order, and a correct answer drawn from it.
  pub fn validate(&self) -> Result<(), String> {
    if self.question.trim().is_empty() {
      return Err("question text is empty".into());
    }
    if self.options.len() != IMPACT_OPTIONS.len()
      || self.options.iter().zip(IMPACT_OPTIONS.iter()).any(|(a, b)| a != b)
    {
      return Err(format!("options must be exactly {:?}, got {:?}", IMPACT_OPTIONS, self.options));
    }
    if !self.options.iter().any(|o| o == &self.correct_answer) {
      return Err(format!("correctAnswer '{}' is not one of the options", self.correct_answer));
    }
    Ok(())
  }

  pub fn into_question(self, id: u32) -> Question {
    Question {
      id,
      category: self.category,
      topic: self.topic,
      question: self.question,
      options: self.options,
      correct_answer: self.correct_answer,
    }
  }
}

/// One scoreboard record. `date` is an ISO-8601 timestamp stamped by the
/// server when the score is recorded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoreEntry {
  pub name: String,
  pub score: i64,
  pub date: String,
  #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
  pub user_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub difficulty: Option<String>,
}

/// Focus topics suggested to the model per game role. Unknown roles get no
/// topics line; the prompt then focuses on the role name itself.
pub fn topics_for_role(role: &str) -> Option<&'static str> {
  Some(match role {
    "Platform Engineer" => "Platform Engineering, Kubernetes, CI-CD, Infrastructure, Deployment Strategy",
    "Solutions Architect" => "Solutions Architecture, System Design Impacts, AWS, GCP, Azure, Hybrid Infrastructure",
    "DevOps" => "CI-CD, Kubernetes, Terraform, Ansible, Production Deployment, Git",
    "DevSecOps" => "Security, Zero Trust Network Policy, CI-CD, Firewall, Cybersecurity",
    "Developer Advocate" => "Application API, Git, CI-CD, Production Deployment",
    "SRE" => "SRE, Large Scale System Failures, Cache, Database, Networking, DNS",
    "MLOps" => "MLOps, Infrastructure, Storage, Production Deployment",
    "System Admins" => "Linux, On-prem, Storage, VPN, Proxy, DNS",
    "Incident Responder/Commander" => "Large Scale System Failures, Security, Networking, Production Deployment",
    "Cybersecurity Analyst" => "Cybersecurity, Security, Firewall, VPN, Zero Trust Network Policy",
    _ => return None,
  })
}
