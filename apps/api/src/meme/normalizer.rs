//! Response Normalizer — turns a loose list of candidate captions into exactly
//! as many sanitized lines as the template has panels.

use crate::meme::sanitizer::{sanitize_line, PLACEHOLDER};
use crate::meme::templates::{PanelLayout, TemplateRegistry, DEFAULT_PANELS};

/// Normalizes `lines` for `template_id`. The result length always equals the
/// template's panel count ([`DEFAULT_PANELS`] for an unknown id).
pub fn normalize_lines<S: AsRef<str>>(
    registry: &TemplateRegistry,
    template_id: &str,
    lines: &[S],
) -> Vec<String> {
    let mut lines: Vec<String> = lines
        .iter()
        .filter_map(|line| {
            let line: &str = line.as_ref();
            (!line.trim().is_empty()).then(|| sanitize_line(line))
        })
        .collect();

    let template = registry.get(template_id);
    let required = template.map_or(DEFAULT_PANELS, |t| t.panels);
    let layout = template.map(|t| t.layout).unwrap_or_default();

    match layout {
        PanelLayout::MirroredRealization => {
            pad(&mut lines, 2);
            let realization = lines[1].clone();
            while lines.len() < required {
                lines.push(realization.clone());
            }
        }
        // Escalation beats must stay distinct, so no mirroring here.
        PanelLayout::Escalation | PanelLayout::Standard => pad(&mut lines, required),
    }

    lines.truncate(required);
    lines
}

fn pad(lines: &mut Vec<String>, len: usize) {
    while lines.len() < len {
        lines.push(PLACEHOLDER.to_string());
    }
}
