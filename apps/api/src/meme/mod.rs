// News headline → meme script → memegen URL.
// All LLM calls go through llm_client; everything the model returns is validated here.

pub mod generator;
pub mod handlers;
pub mod normalizer;
pub mod prompts;
pub mod sanitizer;
pub mod templates;
pub mod url;

#[cfg(test)]
pub(crate) mod testing;
