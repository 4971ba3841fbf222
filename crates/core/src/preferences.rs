//! User display preferences carried in a cookie.
//!
//! Preferences are stored client-side as URL-safe base64 over JSON so the
//! value survives cookie transport untouched. A missing or corrupted cookie
//! always resolves to defaults; preferences are never persisted server-side.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Name of the preference cookie.
pub const PREFERENCES_COOKIE: &str = "stampkeeper_preferences";

/// Cookie lifetime: 30 days.
pub const PREFERENCES_COOKIE_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Maximum accepted page size.
pub const MAX_ITEMS_PER_PAGE: i64 = 200;

/// User-specific display preferences.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// "gallery" or "list".
    #[serde(rename = "defaultView", default = "default_view")]
    pub default_view: String,
    /// Sort key name as used by the listing API.
    #[serde(rename = "defaultSort", default = "default_sort")]
    pub default_sort: String,
    /// "ASC" or "DESC".
    #[serde(rename = "sortDirection", default = "default_direction")]
    pub sort_direction: String,
    #[serde(rename = "itemsPerPage", default = "default_items_per_page")]
    pub items_per_page: i64,
}

fn default_view() -> String {
    "gallery".to_string()
}

fn default_sort() -> String {
    "name".to_string()
}

fn default_direction() -> String {
    "ASC".to_string()
}

fn default_items_per_page() -> i64 {
    50
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_view: default_view(),
            default_sort: default_sort(),
            sort_direction: default_direction(),
            items_per_page: default_items_per_page(),
        }
    }
}

impl UserPreferences {
    /// Clamp every field to a valid value, substituting defaults.
    pub fn sanitized(mut self) -> Self {
        if self.default_view != "gallery" && self.default_view != "list" {
            self.default_view = default_view();
        }
        if self.sort_direction != "ASC" && self.sort_direction != "DESC" {
            self.sort_direction = default_direction();
        }
        if self.items_per_page <= 0 || self.items_per_page > MAX_ITEMS_PER_PAGE {
            self.items_per_page = default_items_per_page();
        }
        self
    }

    /// Encode for the preference cookie.
    pub fn to_cookie_value(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a cookie value; `None` when the value is not valid base64/JSON.
    /// Decoded preferences are sanitized before use.
    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
        let prefs: Self = serde_json::from_slice(&bytes).ok()?;
        Some(prefs.sanitized())
    }
}
