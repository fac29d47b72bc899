/// Record models for the CMS collections
///
/// Every collection persisted by the [`crate::store`] has an explicit typed
/// structure here, together with the request inputs used to create or update it.
///
/// # Models
///
/// - `user`: Accounts, roles and the public projection without password
/// - `block`: Ordered page blocks
/// - `form`: Forms and their submissions
/// - `media`: Uploaded images, videos and the site logo
/// - `settings`: Site-wide settings object
/// - `content`: Named page sections
///
/// Stored records are decoded leniently (missing optional fields default),
/// while request inputs reject unknown fields.

pub mod block;
pub mod content;
pub mod form;
pub mod media;
pub mod settings;
pub mod user;

use chrono::Utc;
use std::collections::HashSet;

/// Generates a record ID from the current millisecond timestamp
///
/// If the timestamp is already taken in `existing`, it is bumped by one until
/// it is unique, so two records created in the same millisecond never share an ID.
///
/// # Example
///
/// ```
/// use cms_shared::models::next_id;
///
/// let first = next_id(std::iter::empty());
/// let second = next_id([first.as_str()]);
/// assert_ne!(first, second);
/// ```
pub fn next_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let taken: HashSet<&str> = existing.into_iter().collect();
    let mut candidate = Utc::now().timestamp_millis();

    while taken.contains(candidate.to_string().as_str()) {
        candidate += 1;
    }

    candidate.to_string()
}

fn default_true() -> bool {
    true
}
