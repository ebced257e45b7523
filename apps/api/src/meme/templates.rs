//! Template Registry — the closed catalog of memegen templates the bot may pick.
//!
//! Built once at startup and shared as `Arc<TemplateRegistry>`. Nothing mutates it afterwards.

/// Panel count used when a template id is somehow missing from the registry.
pub const DEFAULT_PANELS: usize = 2;

/// How a template's panels relate to each other. Drives the completion policy
/// in the normalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanelLayout {
    /// Independent panels: pad with placeholders, trim the excess.
    #[default]
    Standard,
    /// Panels 3 and 4 repeat the realization from panel 2 (gru).
    MirroredRealization,
    /// Every panel is a distinct, escalating beat (galaxy brain).
    Escalation,
}

/// A single memegen template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemeTemplate {
    /// memegen slug, e.g. "drake".
    pub id: &'static str,
    /// Number of caption lines the template renders. Always >= 1.
    pub panels: usize,
    /// Prompt-only hint describing when the template lands.
    pub description: &'static str,
    pub layout: PanelLayout,
}

impl MemeTemplate {
    pub const fn new(id: &'static str, panels: usize, description: &'static str) -> Self {
        Self {
            id,
            panels,
            description,
            layout: PanelLayout::Standard,
        }
    }

    pub const fn with_layout(mut self, layout: PanelLayout) -> Self {
        self.layout = layout;
        self
    }
}

const BUILTIN_TEMPLATES: [MemeTemplate; 8] = [
    MemeTemplate::new("drake", 2, "Reject vs prefer; clean contrast jokes."),
    MemeTemplate::new(
        "db",
        3,
        "Distracted boyfriend; new obsession vs the neglected old thing.",
    ),
    MemeTemplate::new(
        "gru",
        4,
        "Gru's plan; plans that backfire, the realization repeats in panels 3 and 4.",
    )
    .with_layout(PanelLayout::MirroredRealization),
    MemeTemplate::new(
        "ds",
        3,
        "Two buttons; impossible choices, mutually bad options, indecision.",
    ),
    MemeTemplate::new("cmm", 1, "Change my mind; a spicy declarative take."),
    MemeTemplate::new("success", 2, "Success kid; tiny victories and petty wins."),
    MemeTemplate::new(
        "mordor",
        1,
        "One does not simply; obvious truths and near-impossible tasks.",
    ),
    MemeTemplate::new("gb", 4, "Galaxy brain; escalation from dumb to enlightened.")
        .with_layout(PanelLayout::Escalation),
];

/// Read-only lookup over an ordered set of templates.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<MemeTemplate>,
}

impl TemplateRegistry {
    /// Builds a registry from an explicit template list. Later duplicates of an id are ignored
    /// and zero-panel templates are bumped to one panel.
    pub fn new(templates: Vec<MemeTemplate>) -> Self {
        let mut unique: Vec<MemeTemplate> = Vec::with_capacity(templates.len());
        for mut template in templates {
            if unique.iter().any(|t| t.id == template.id) {
                continue;
            }
            template.panels = template.panels.max(1);
            unique.push(template);
        }
        Self { templates: unique }
    }

    /// The eight templates the service ships with.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_TEMPLATES.to_vec())
    }

    pub fn get(&self, id: &str) -> Option<&MemeTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Template ids in registry order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.templates.iter().map(|t| t.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemeTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
