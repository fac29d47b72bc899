/// Site settings model
///
/// The `settings` collection is a single object rather than a list. A fresh
/// store is seeded with [`Settings::default`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Site-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// WhatsApp contact number
    #[serde(default)]
    pub whatsapp: String,

    /// Public contact email
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub meta_title: String,

    #[serde(default)]
    pub meta_description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            description: "Site description".to_string(),
            whatsapp: String::new(),
            email: "contact@example.com".to_string(),
            meta_title: "SEO Title".to_string(),
            meta_description: "SEO Description".to_string(),
            meta_keywords: None,
            og_title: None,
            og_description: None,
            og_image: None,
            updated_at: None,
        }
    }
}

/// Input for updating general settings
///
/// Provided fields overwrite the stored value, including empty strings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSettings {
    pub title: Option<String>,
    pub description: Option<String>,
    pub whatsapp: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
}

/// Input for updating SEO settings
///
/// Empty strings are ignored so partial forms do not wipe stored values.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSeo {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
}

impl Settings {
    /// Applies a general settings update
    pub fn apply(&mut self, update: UpdateSettings) {
        let UpdateSettings {
            title,
            description,
            whatsapp,
            email,
            meta_title,
            meta_description,
            meta_keywords,
            og_title,
            og_description,
            og_image,
        } = update;

        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = whatsapp {
            self.whatsapp = v;
        }
        if let Some(v) = email {
            self.email = v;
        }
        if let Some(v) = meta_title {
            self.meta_title = v;
        }
        if let Some(v) = meta_description {
            self.meta_description = v;
        }
        if meta_keywords.is_some() {
            self.meta_keywords = meta_keywords;
        }
        if og_title.is_some() {
            self.og_title = og_title;
        }
        if og_description.is_some() {
            self.og_description = og_description;
        }
        if og_image.is_some() {
            self.og_image = og_image;
        }
        self.updated_at = Some(Utc::now());
    }

    /// Applies an SEO update, skipping empty values
    pub fn apply_seo(&mut self, update: UpdateSeo) {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

        if let Some(v) = non_empty(update.meta_title) {
            self.meta_title = v;
        }
        if let Some(v) = non_empty(update.meta_description) {
            self.meta_description = v;
        }
        if let Some(v) = non_empty(update.meta_keywords) {
            self.meta_keywords = Some(v);
        }
        if let Some(v) = non_empty(update.og_title) {
            self.og_title = Some(v);
        }
        if let Some(v) = non_empty(update.og_description) {
            self.og_description = Some(v);
        }
        if let Some(v) = non_empty(update.og_image) {
            self.og_image = Some(v);
        }
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shape() {
        let json = serde_json::to_value(Settings::default()).unwrap();

        assert_eq!(json["metaTitle"], "SEO Title");
        assert!(json.get("ogImage").is_none());
        assert!(json.get("updatedAt").is_none());
    }

    #[test]
    fn test_apply_overwrites_with_empty() {
        let mut s = Settings::default();
        s.apply(UpdateSettings {
            whatsapp: Some("5511999999999".to_string()),
            description: Some(String::new()),
            ..Default::default()
        });

        assert_eq!(s.whatsapp, "5511999999999");
        assert_eq!(s.description, "");
        assert!(s.updated_at.is_some());
    }

    #[test]
    fn test_apply_seo_skips_empty() {
        let mut s = Settings::default();
        s.apply_seo(UpdateSeo {
            meta_title: Some(String::new()),
            og_image: Some("/uploads/images/og.png".to_string()),
            ..Default::default()
        });

        assert_eq!(s.meta_title, "SEO Title");
        assert_eq!(s.og_image.as_deref(), Some("/uploads/images/og.png"));
    }

    #[test]
    fn test_update_rejects_unknown_fields() {
        let json = serde_json::json!({ "theme": "dark" });
        assert!(serde_json::from_value::<UpdateSettings>(json).is_err());
    }
}
