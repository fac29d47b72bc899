/// Page section model
///
/// The `sections` collection is an object mapping a section name (e.g.
/// `hero`) to its editable copy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// All sections keyed by name
pub type Sections = BTreeMap<String, Section>;

/// Editable copy of one page section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Call-to-action label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,

    /// Background or illustration path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for updating a section
///
/// Provided fields are merged into the existing section; a section that does
/// not exist yet is created.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSection {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub cta: Option<String>,
    pub image: Option<String>,
}

impl Section {
    /// Merges an update into this section
    pub fn merge(&mut self, update: UpdateSection) {
        if update.title.is_some() {
            self.title = update.title;
        }
        if update.subtitle.is_some() {
            self.subtitle = update.subtitle;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if update.cta.is_some() {
            self.cta = update.cta;
        }
        if update.image.is_some() {
            self.image = update.image;
        }
        self.updated_at = Some(Utc::now());
    }
}

/// Sections seeded into a fresh store
pub fn default_sections() -> Sections {
    let mut sections = Sections::new();
    sections.insert(
        "hero".to_string(),
        Section {
            title: Some("Welcome".to_string()),
            subtitle: Some("Your tagline here".to_string()),
            description: Some("Describe what you offer.".to_string()),
            ..Default::default()
        },
    );
    sections
}
