//! Loading prompt configuration from TOML.
//!
//! See `WorksheetConfig` and `Prompts` for expected schema.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{error, info};

use crate::seeds;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct WorksheetConfig {
  #[serde(default)]
  pub prompts: Prompts,
  /// Extra or replacement per-subject hints, keyed by subject name.
  #[serde(default)]
  pub subject_hints: BTreeMap<String, String>,
}

/// Prompts used by the LLM gateway. Templates use `{key}` placeholders.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  // Generation (placeholders: {mcq}, {free})
  pub generation_system_template: String,
  pub style_hints: String,
  pub output_rule: String,
  // Free-response grading (placeholders: {rubric_json}, {answer})
  pub grade_free_template: String,
  /// Filled in from built-in seeds plus `[subject_hints]`.
  #[serde(skip)]
  pub subject_hints: BTreeMap<String, String>,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      generation_system_template: [
        "あなたは高校教員のための問題作成アシスタントです。",
        "次の制約を厳守して、有効なJSONオブジェクト {\"items\": [...]} のみを出力してください。",
        "- 言語: 日本語（高校生向け）。",
        "- 問題タイプ: mcq {mcq}問 / free {free}問。",
        "- 各問は次の全フィールドを必ず含む: type, prompt, choices, answer, explanation(120字以内), difficulty(1-5), objectives, rubric, meta。",
        "- free のとき choices は空配列 [] を入れる。mcq のとき rubric は {\"maxPoints\":0, \"criteria\":[]} を入れる。",
        "- meta は常に空オブジェクト {} を入れる。",
        "- 数学はLaTeX記法（例: `y=ax+b`）。",
      ]
      .join("\n"),
      style_hints: "styleHints: 語調は丁寧。用語は教科書準拠。難易度は1-2:40% / 3:40% / 4-5:20%。".into(),
      output_rule: "出力はJSONのみ。文字列の中に改行を含んでもよいが、JSON外にテキストを出さないこと。".into(),
      grade_free_template: [
        "次の回答をルーブリックに照らして、○/△/×のいずれかと50字以内の短評を提案してください。",
        "rubric: {rubric_json}",
        "answer: {answer}",
        "出力はJSON: { mark: '○'|'△'|'×', comment: string } のみ。",
      ]
      .join("\n"),
      subject_hints: seeds::subject_hints(),
    }
  }
}

impl WorksheetConfig {
  /// Prompts with built-in subject hints merged under the configured ones.
  pub fn into_prompts(self) -> Prompts {
    let mut prompts = self.prompts;
    prompts.subject_hints = seeds::subject_hints();
    prompts.subject_hints.extend(self.subject_hints);
    prompts
  }
}

pub fn parse_config(s: &str) -> Result<WorksheetConfig, toml::de::Error> {
  toml::from_str::<WorksheetConfig>(s)
}

/// Attempt to load `WorksheetConfig` from WORKSHEET_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<WorksheetConfig> {
  let path = std::env::var("WORKSHEET_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "sakumon_backend", %path, "Loaded worksheet config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "sakumon_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "sakumon_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
