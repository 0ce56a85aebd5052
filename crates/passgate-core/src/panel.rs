//! Reveal-panel model: field classification and per-widget state.
//!
//! The panel itself is a thin rendering concern; everything that matters is
//! here so it can be tested without a live display. Each field name is
//! classified once into a closed [`FieldKind`] via a first-match-wins walk
//! over an ordered pattern table, and each shown field owns its display
//! state (masking, reveal toggle) explicitly.

use std::sync::OnceLock;

use regex::Regex;

use crate::entry::CredentialRecord;

/// What the panel does with one field. Closed set so rendering stays
/// exhaustive and switch-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Internal bookkeeping fields, no widget at all.
    Suppressed,
    /// Plain text with a copy action and a plumb action.
    PlumbableText,
    /// Masked secret with copy and save-to-file actions.
    SavableSecret,
    /// Masked secret with copy and an in-place reveal toggle.
    MaskedSecret,
    /// Plain text with a copy action only.
    DefaultText,
}

/// User-triggered commands a widget can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAction {
    Copy,
    Plumb,
    Reveal,
    Save,
}

struct Rule {
    pattern: Regex,
    kind: FieldKind,
}

/// Ordered classification table. Patterns are unanchored substring matches
/// unless written otherwise, and earlier rules win: `resource_uri` is
/// suppressed by rule one even though it would also match the `url` rule.
fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            Rule {
                pattern: Regex::new("iconname|resource_uri|id").unwrap(),
                kind: FieldKind::Suppressed,
            },
            Rule {
                pattern: Regex::new("url|username|created|modified").unwrap(),
                kind: FieldKind::PlumbableText,
            },
            Rule {
                pattern: Regex::new("^ssh_key$").unwrap(),
                kind: FieldKind::SavableSecret,
            },
            Rule {
                pattern: Regex::new("password").unwrap(),
                kind: FieldKind::MaskedSecret,
            },
            Rule {
                pattern: Regex::new(".*").unwrap(),
                kind: FieldKind::DefaultText,
            },
        ]
    })
}

/// Classify a field name through the ordered table.
pub fn classify_field(name: &str) -> FieldKind {
    for rule in rules() {
        if rule.pattern.is_match(name) {
            return rule.kind;
        }
    }
    // The table ends in a match-all rule.
    FieldKind::DefaultText
}

/// Derive the base name for a saved-secret file: the `ssh_key` field saves
/// under the record's `ssh_key_name`, anything else under the record title
/// with non-word characters flattened to `_`.
pub fn save_file_name(field: &str, record: &CredentialRecord) -> String {
    if field == "ssh_key"
        && let Some(name) = record.get("ssh_key_name")
    {
        return name.to_string();
    }

    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    let non_word = NON_WORD.get_or_init(|| Regex::new(r"[^\w]").unwrap());
    non_word
        .replace_all(record.get("title").unwrap_or_default(), "_")
        .into_owned()
}

/// One shown field with its own display state.
pub struct FieldWidget {
    name: String,
    value: String,
    kind: FieldKind,
    revealed: bool,
}

impl FieldWidget {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            kind: classify_field(name),
            revealed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw value, for copy/plumb/save actions.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_multiline(&self) -> bool {
        self.value.contains('\n')
    }

    /// What the panel renders right now. Masked secrets show one `*` per
    /// character until revealed; savable secrets stay masked with `_`;
    /// multi-line text is shown with carriage returns stripped.
    pub fn display_value(&self) -> String {
        match self.kind {
            FieldKind::MaskedSecret if !self.revealed => {
                "*".repeat(self.value.chars().count())
            }
            FieldKind::SavableSecret => "_".repeat(self.value.chars().count()),
            _ if self.is_multiline() => self.value.replace('\r', ""),
            _ => self.value.clone(),
        }
    }

    /// Swap a masked secret between masked and plaintext display in place.
    /// No-op for other kinds.
    pub fn toggle_reveal(&mut self) {
        if self.kind == FieldKind::MaskedSecret {
            self.revealed = !self.revealed;
        }
    }

    pub fn actions(&self) -> &'static [FieldAction] {
        match self.kind {
            FieldKind::Suppressed => &[],
            FieldKind::PlumbableText => &[FieldAction::Copy, FieldAction::Plumb],
            FieldKind::SavableSecret => &[FieldAction::Copy, FieldAction::Save],
            FieldKind::MaskedSecret => &[FieldAction::Copy, FieldAction::Reveal],
            FieldKind::DefaultText => &[FieldAction::Copy],
        }
    }

    pub fn supports(&self, action: FieldAction) -> bool {
        self.actions().contains(&action)
    }
}

/// The whole panel: title plus one widget per shown field, in record order.
pub struct PanelModel {
    title: String,
    widgets: Vec<FieldWidget>,
}

impl PanelModel {
    /// Build widgets for every non-empty, non-suppressed field, following
    /// the record's field order.
    pub fn from_record(record: &CredentialRecord) -> Self {
        let title = record.get("title").unwrap_or_default().to_string();
        let mut widgets = Vec::new();
        for (name, value) in record.iter() {
            if value.is_empty() {
                continue;
            }
            let widget = FieldWidget::new(name, value);
            if widget.kind() != FieldKind::Suppressed {
                widgets.push(widget);
            }
        }
        Self { title, widgets }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn widgets(&self) -> &[FieldWidget] {
        &self.widgets
    }

    pub fn widget_mut(&mut self, index: usize) -> Option<&mut FieldWidget> {
        self.widgets.get_mut(index)
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
