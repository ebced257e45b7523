//! URL Builder — turns a meme script into a memegen image URL. Pure string work, no I/O.

use crate::meme::generator::MemeScript;

pub const DEFAULT_MEMEGEN_BASE_URL: &str = "https://api.memegen.link";

/// Builds `{base}/images/{template}/{line1}/.../{lineN}.png` URLs.
#[derive(Debug, Clone)]
pub struct MemegenUrlBuilder {
    base_url: String,
}

impl MemegenUrlBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn image_url(&self, template: &str, lines: &[String]) -> String {
        let path = lines
            .iter()
            .map(|line| encode_caption(line))
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/images/{template}/{path}.png", self.base_url)
    }

    pub fn script_url(&self, script: &MemeScript) -> String {
        self.image_url(&script.template, &script.lines)
    }
}

impl Default for MemegenUrlBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MEMEGEN_BASE_URL)
    }
}

/// Spaces and slashes become `_` so a caption always stays one path segment;
/// everything outside the unreserved set is then percent-encoded.
pub fn encode_caption(line: &str) -> String {
    let underscored = line.replace([' ', '/'], "_");
    urlencoding::encode(&underscored).into_owned()
}
