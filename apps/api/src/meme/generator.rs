//! Meme Generation — orchestrates the headline → meme script pipeline.
//!
//! Flow: build prompt → LLM call → interpret reply (or fall back) →
//!       normalize lines → variety nudge.
//!
//! Every field of the model reply is untrusted. Malformed content never fails the call;
//! only a failure of the LLM client itself propagates.

use rand::rngs::StdRng;
use rand::Rng;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::llm_client::{ChatModel, LlmError};
use crate::meme::normalizer::normalize_lines;
use crate::meme::prompts::{MEME_PROMPT_TEMPLATE, MEME_SYSTEM};
use crate::meme::templates::{PanelLayout, TemplateRegistry};

/// Chance that a finished script is moved to a different template anyway.
pub const VARIETY_PROBABILITY: f64 = 0.12;

/// First caption of the script used when the model reply cannot be read.
pub const FALLBACK_LEAD: &str = "When JSON fails";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A template choice plus exactly as many captions as the template has panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemeScript {
    pub template: String,
    pub lines: Vec<String>,
}

/// The model reply after the JSON boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// A JSON object. `template` is whatever string the model sent (not yet checked against
    /// the registry); `lines` keeps only the string elements of `lines`.
    Parsed {
        template: Option<String>,
        lines: Vec<String>,
    },
    /// Anything else, with the reason for logging.
    Malformed(String),
}

/// Source of the pipeline's random draws. Injected so tests can script outcomes.
pub trait RandomSource: Send {
    /// Returns `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;

    /// Returns a uniform index in `0..upper`. `upper` is always > 0.
    fn pick(&mut self, upper: usize) -> usize;
}

impl RandomSource for StdRng {
    fn chance(&mut self, probability: f64) -> bool {
        self.gen_bool(probability)
    }

    fn pick(&mut self, upper: usize) -> usize {
        self.gen_range(0..upper)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full generation pipeline for one headline.
///
/// Steps:
/// 1. build_meme_prompt() with the whole registry embedded
/// 2. LLM call (JSON object output forced)
/// 3. interpret_reply() → ModelReply
/// 4. resolve_script() → validated template + normalized lines, or the fallback script
/// 5. apply_variety() → 12% chance of a different template, re-normalized
pub async fn generate_meme(
    llm: &dyn ChatModel,
    registry: &TemplateRegistry,
    headline: &str,
    rng: &mut dyn RandomSource,
) -> Result<MemeScript, AppError> {
    if registry.is_empty() {
        return Err(AppError::Internal(anyhow::anyhow!(
            "Template registry is empty"
        )));
    }

    let prompt = build_meme_prompt(registry, headline);
    debug!("Requesting meme script from model {}", llm.model());

    let reply = match llm.complete_json(MEME_SYSTEM, &prompt).await {
        Ok(text) => interpret_reply(&text),
        Err(LlmError::EmptyContent) => {
            ModelReply::Malformed("model returned no content".to_string())
        }
        Err(e) => {
            return Err(AppError::Llm(format!(
                "Meme generation LLM call failed: {e}"
            )))
        }
    };

    let script = resolve_script(registry, headline, reply, rng);
    let script = apply_variety(registry, script, rng);

    info!(
        "Meme script ready: template={} lines={}",
        script.template,
        script.lines.len()
    );
    Ok(script)
}

/// Parses the raw model text. Anything that is not a bare JSON object, including an object
/// wrapped in a Markdown code fence, is `Malformed`.
pub fn interpret_reply(raw: &str) -> ModelReply {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => return ModelReply::Malformed(format!("invalid JSON: {e}")),
    };

    let Value::Object(mut object) = value else {
        return ModelReply::Malformed("reply is not a JSON object".to_string());
    };

    let template = match object.remove("template") {
        Some(Value::String(id)) => Some(id),
        _ => None,
    };

    let lines = match object.remove("lines") {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(line) => Some(line),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    ModelReply::Parsed { template, lines }
}

/// Validates the template against the registry and normalizes the lines. A malformed reply
/// becomes the fallback script: random template, `[FALLBACK_LEAD, headline]`.
///
/// `registry` must not be empty.
pub fn resolve_script(
    registry: &TemplateRegistry,
    headline: &str,
    reply: ModelReply,
    rng: &mut dyn RandomSource,
) -> MemeScript {
    let (template, lines) = match reply {
        ModelReply::Parsed { template, lines } => {
            let template = match template {
                Some(id) if registry.contains(&id) => id,
                other => {
                    let picked = random_template(registry, rng);
                    debug!("Model template {other:?} not in registry, using {picked}");
                    picked
                }
            };
            (template, lines)
        }
        ModelReply::Malformed(reason) => {
            let template = random_template(registry, rng);
            warn!("Unusable model reply ({reason}); falling back to template {template}");
            (template, vec![FALLBACK_LEAD.to_string(), headline.to_string()])
        }
    };

    let lines = normalize_lines(registry, &template, &lines);
    MemeScript { template, lines }
}

/// With probability [`VARIETY_PROBABILITY`], swaps to a different template and re-normalizes
/// the existing lines for it. A no-op when the registry has a single template.
pub fn apply_variety(
    registry: &TemplateRegistry,
    script: MemeScript,
    rng: &mut dyn RandomSource,
) -> MemeScript {
    if !rng.chance(VARIETY_PROBABILITY) {
        return script;
    }

    let alternatives: Vec<&str> = registry
        .ids()
        .into_iter()
        .filter(|id| *id != script.template)
        .collect();
    if alternatives.is_empty() {
        return script;
    }

    let template = alternatives[rng.pick(alternatives.len()) % alternatives.len()].to_string();
    info!("Variety nudge: {} → {}", script.template, template);

    let lines = normalize_lines(registry, &template, &script.lines);
    MemeScript { template, lines }
}

fn random_template(registry: &TemplateRegistry, rng: &mut dyn RandomSource) -> String {
    let ids = registry.ids();
    ids[rng.pick(ids.len()) % ids.len()].to_string()
}

/// Fills the prompt template with the registry catalog and the headline.
pub fn build_meme_prompt(registry: &TemplateRegistry, headline: &str) -> String {
    let templates_desc = registry
        .iter()
        .map(|t| format!("- {} ({}): {}", t.id, t.panels, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    let panel_rules = registry
        .iter()
        .map(|t| match t.layout {
            PanelLayout::Standard => format!("{}={}", t.id, t.panels),
            PanelLayout::MirroredRealization => {
                format!("{}={} (panels 3 and 4 repeat the realization)", t.id, t.panels)
            }
            PanelLayout::Escalation => {
                format!("{}={} (four distinct beats, escalating)", t.id, t.panels)
            }
        })
        .collect::<Vec<_>>()
        .join("; ");

    // JSON-quote the headline so stray quotes cannot break out of the prompt line.
    let headline = Value::String(headline.to_string()).to_string();

    MEME_PROMPT_TEMPLATE
        .replace("{templates_desc}", &templates_desc)
        .replace("{panel_rules}", &panel_rules)
        .replace("{headline}", &headline)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::meme::sanitizer::PLACEHOLDER;
    use crate::meme::templates::MemeTemplate;
    use crate::meme::testing::{ScriptedDice, StubModel, StubReply};

    const DRAKE_REPLY: &str =
        r#"{"template":"drake","lines":["old boring bill","new boring bill"]}"#;

    async fn run(reply: StubReply, dice: &mut ScriptedDice) -> Result<MemeScript, AppError> {
        let model = StubModel::new(reply);
        generate_meme(&model, &TemplateRegistry::builtin(), "Senate passes bill", dice).await
    }

    fn text(s: &str) -> StubReply {
        StubReply::Text(s.to_string())
    }

    #[tokio::test]
    async fn test_happy_path_keeps_model_choice() {
        let mut dice = ScriptedDice::calm();
        let script = run(text(DRAKE_REPLY), &mut dice).await.unwrap();
        assert_eq!(script.template, "drake");
        assert_eq!(script.lines, vec!["old boring bill", "new boring bill"]);
        assert_eq!(dice.pick_calls, 0, "valid reply must not consume random picks");
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        // index 3 = "ds", three panels
        let mut dice = ScriptedDice::calm().with_picks([3]);
        let script = run(text("lol not json"), &mut dice).await.unwrap();
        assert_eq!(script.template, "ds");
        assert_eq!(
            script.lines,
            vec![FALLBACK_LEAD, "Senate passes bill", PLACEHOLDER]
        );
    }

    #[tokio::test]
    async fn test_fallback_to_single_panel_drops_headline() {
        // index 4 = "cmm", one panel
        let mut dice = ScriptedDice::calm().with_picks([4]);
        let script = run(text("{broken"), &mut dice).await.unwrap();
        assert_eq!(script.template, "cmm");
        assert_eq!(script.lines, vec![FALLBACK_LEAD]);
    }

    #[tokio::test]
    async fn test_non_object_json_falls_back() {
        let mut dice = ScriptedDice::calm().with_picks([0]);
        let script = run(text(r#"["drake", "a", "b"]"#), &mut dice)
            .await
            .unwrap();
        assert_eq!(script.template, "drake");
        assert_eq!(script.lines, vec![FALLBACK_LEAD, "Senate passes bill"]);
    }

    #[tokio::test]
    async fn test_empty_content_falls_back() {
        let mut dice = ScriptedDice::calm().with_picks([1]);
        let script = run(StubReply::Empty, &mut dice).await.unwrap();
        assert_eq!(script.template, "db");
        assert_eq!(
            script.lines,
            vec![FALLBACK_LEAD, "Senate passes bill", PLACEHOLDER]
        );
    }

    #[tokio::test]
    async fn test_fallback_shape_with_real_rng() {
        let registry = TemplateRegistry::builtin();
        let model = StubModel::replying("definitely { not json");
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let script = generate_meme(&model, &registry, "Senate passes bill", &mut rng)
                .await
                .unwrap();
            let template = registry.get(&script.template).expect("template from registry");
            assert_eq!(script.lines.len(), template.panels);
        }
    }

    #[tokio::test]
    async fn test_unknown_template_is_replaced() {
        let mut dice = ScriptedDice::calm().with_picks([7]);
        let reply = r#"{"template":"doge","lines":["such bill","much senate","wow"]}"#;
        let script = run(text(reply), &mut dice).await.unwrap();
        assert_eq!(script.template, "gb");
        assert_eq!(
            script.lines,
            vec!["such bill", "much senate", "wow", PLACEHOLDER]
        );
    }

    #[tokio::test]
    async fn test_non_string_template_is_replaced() {
        let mut dice = ScriptedDice::calm().with_picks([5]);
        let script = run(text(r#"{"template":42,"lines":["a","b"]}"#), &mut dice)
            .await
            .unwrap();
        assert_eq!(script.template, "success");
        assert_eq!(script.lines, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_lines_not_an_array_become_placeholders() {
        let mut dice = ScriptedDice::calm();
        let script = run(text(r#"{"template":"db","lines":"a b c"}"#), &mut dice)
            .await
            .unwrap();
        assert_eq!(script.template, "db");
        assert_eq!(script.lines, vec![PLACEHOLDER; 3]);
    }

    #[tokio::test]
    async fn test_missing_lines_become_placeholders() {
        let mut dice = ScriptedDice::calm();
        let script = run(text(r#"{"template":"mordor"}"#), &mut dice)
            .await
            .unwrap();
        assert_eq!(script.lines, vec![PLACEHOLDER]);
    }

    #[tokio::test]
    async fn test_non_string_lines_are_skipped() {
        let mut dice = ScriptedDice::calm();
        let reply = r#"{"template":"drake","lines":[1, "Top: keep this", null, {"x":1}]}"#;
        let script = run(text(reply), &mut dice).await.unwrap();
        assert_eq!(script.lines, vec!["keep this", PLACEHOLDER]);
    }

    #[tokio::test]
    async fn test_gru_reply_is_mirrored() {
        let mut dice = ScriptedDice::calm();
        let reply = r#"{"template":"gru","lines":["Pass bill","Read bill"]}"#;
        let script = run(text(reply), &mut dice).await.unwrap();
        assert_eq!(
            script.lines,
            vec!["Pass bill", "Read bill", "Read bill", "Read bill"]
        );
    }

    #[tokio::test]
    async fn test_fenced_json_falls_back() {
        // index 3 = "ds"; the fenced drake choice is not honored
        let mut dice = ScriptedDice::calm().with_picks([3]);
        let reply = format!("```json\n{DRAKE_REPLY}\n```");
        let script = run(StubReply::Text(reply), &mut dice).await.unwrap();
        assert_eq!(script.template, "ds");
        assert_eq!(
            script.lines,
            vec![FALLBACK_LEAD, "Senate passes bill", PLACEHOLDER]
        );
    }

    #[tokio::test]
    async fn test_variety_nudge_switches_and_renormalizes() {
        // alternatives to drake start at db (3 panels)
        let mut dice = ScriptedDice::calm().with_chances([true]).with_picks([0]);
        let script = run(text(DRAKE_REPLY), &mut dice).await.unwrap();
        assert_eq!(script.template, "db");
        assert_eq!(
            script.lines,
            vec!["old boring bill", "new boring bill", PLACEHOLDER]
        );
    }

    #[tokio::test]
    async fn test_variety_nudge_never_keeps_same_template() {
        let registry = TemplateRegistry::builtin();
        let model = StubModel::replying(DRAKE_REPLY);
        for pick in 0..registry.len() {
            let mut dice = ScriptedDice::calm().with_chances([true]).with_picks([pick]);
            let script = generate_meme(&model, &registry, "x", &mut dice).await.unwrap();
            assert_ne!(script.template, "drake");
            assert_eq!(
                script.lines.len(),
                registry.get(&script.template).unwrap().panels
            );
        }
    }

    #[tokio::test]
    async fn test_variety_nudge_is_noop_for_single_template() {
        let registry = TemplateRegistry::new(vec![MemeTemplate::new("drake", 2, "only one")]);
        let model = StubModel::replying(DRAKE_REPLY);
        let mut dice = ScriptedDice::calm().with_chances([true]);
        let script = generate_meme(&model, &registry, "x", &mut dice).await.unwrap();
        assert_eq!(script.template, "drake");
        assert_eq!(dice.pick_calls, 0);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let mut dice = ScriptedDice::calm();
        let err = run(StubReply::ApiFailure(503), &mut dice).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_empty_registry_is_an_internal_error() {
        let model = StubModel::replying(DRAKE_REPLY);
        let mut dice = ScriptedDice::calm();
        let err = generate_meme(&model, &TemplateRegistry::new(vec![]), "x", &mut dice)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_prompt_sent_to_model() {
        let model = StubModel::replying(DRAKE_REPLY);
        let mut dice = ScriptedDice::calm();
        generate_meme(&model, &TemplateRegistry::builtin(), "Senate passes \"bill\"", &mut dice)
            .await
            .unwrap();

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (system, prompt) = &calls[0];
        assert_eq!(system, MEME_SYSTEM);
        assert!(prompt.contains(r#"News input: "Senate passes \"bill\"""#));
    }

    #[test]
    fn test_prompt_lists_every_template() {
        let registry = TemplateRegistry::builtin();
        let prompt = build_meme_prompt(&registry, "x");
        for template in registry.iter() {
            assert!(prompt.contains(&format!("- {} ({}): ", template.id, template.panels)));
        }
        assert!(prompt.contains("gru=4 (panels 3 and 4 repeat the realization)"));
        assert!(prompt.contains("cmm=1"));
        assert!(!prompt.contains("{templates_desc}"));
        assert!(!prompt.contains("{panel_rules}"));
    }

    #[test]
    fn test_interpret_reply_variants() {
        assert_eq!(
            interpret_reply(r#"{"template":"gb","lines":["a"]}"#),
            ModelReply::Parsed {
                template: Some("gb".to_string()),
                lines: vec!["a".to_string()],
            }
        );
        assert_eq!(
            interpret_reply("{}"),
            ModelReply::Parsed {
                template: None,
                lines: vec![],
            }
        );
        assert!(matches!(interpret_reply("null"), ModelReply::Malformed(_)));
        assert!(matches!(interpret_reply("\"drake\""), ModelReply::Malformed(_)));
        assert!(matches!(interpret_reply(""), ModelReply::Malformed(_)));
        assert!(matches!(
            interpret_reply("```\n{\"template\":\"gb\"}\n```"),
            ModelReply::Malformed(_)
        ));
    }
}
