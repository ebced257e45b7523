//! Test doubles for the generation pipeline: a canned chat model and a scripted random source.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{ChatModel, LlmError};
use crate::meme::generator::RandomSource;

/// What the stub model answers with.
#[derive(Debug, Clone)]
pub enum StubReply {
    Text(String),
    Empty,
    ApiFailure(u16),
}

/// Chat model that returns a fixed reply and records every prompt it sees.
pub struct StubModel {
    reply: StubReply,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl StubModel {
    pub fn replying(text: &str) -> Self {
        Self::new(StubReply::Text(text.to_string()))
    }

    pub fn new(reply: StubReply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for StubModel {
    async fn complete_json(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        match &self.reply {
            StubReply::Text(text) => Ok(text.clone()),
            StubReply::Empty => Err(LlmError::EmptyContent),
            StubReply::ApiFailure(status) => Err(LlmError::Api {
                status: *status,
                message: "upstream exploded".to_string(),
            }),
        }
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

/// Random source with pre-scripted answers. Once a queue runs dry it answers
/// `false` for chances and `0` for picks.
#[derive(Debug, Default)]
pub struct ScriptedDice {
    chances: VecDeque<bool>,
    picks: VecDeque<usize>,
    pub pick_calls: usize,
}

impl ScriptedDice {
    /// Never perturbs and always picks the first candidate.
    pub fn calm() -> Self {
        Self::default()
    }

    pub fn with_chances(mut self, chances: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(chances);
        self
    }

    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }
}

impl RandomSource for ScriptedDice {
    fn chance(&mut self, _probability: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }

    fn pick(&mut self, upper: usize) -> usize {
        self.pick_calls += 1;
        self.picks.pop_front().unwrap_or(0) % upper.max(1)
    }
}
