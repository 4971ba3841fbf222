//! Database models mapping to the collection schema.

use serde::{Deserialize, Deserializer};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// Storage boxes
// =============================================================================

/// Storage box record.
#[derive(Debug, Clone, FromRow)]
pub struct StorageBoxRow {
    pub id: Uuid,
    pub name: String,
    pub date_created: OffsetDateTime,
}

/// Storage box with the summed quantity of its non-deleted instances.
#[derive(Debug, Clone, FromRow)]
pub struct BoxSummary {
    pub id: Uuid,
    pub name: String,
    pub date_created: OffsetDateTime,
    pub instance_count: i64,
}

// =============================================================================
// Stamps (design-level records)
// =============================================================================

/// Stamp design record. Rows are only materialized for non-deleted stamps;
/// soft-deleted rows never leave the store.
#[derive(Debug, Clone, FromRow)]
pub struct StampRow {
    pub id: Uuid,
    pub name: String,
    pub scott_number: Option<String>,
    pub issue_date: Option<String>,
    pub series: Option<String>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub date_added: OffsetDateTime,
    pub date_modified: OffsetDateTime,
}

/// One entry from the listing query: stamp columns plus derived ownership.
#[derive(Debug, Clone, FromRow)]
pub struct StampListRow {
    pub id: Uuid,
    pub name: String,
    pub scott_number: Option<String>,
    pub issue_date: Option<String>,
    pub series: Option<String>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub date_added: OffsetDateTime,
    pub date_modified: OffsetDateTime,
    pub is_owned: bool,
}

impl StampListRow {
    /// The plain row, without the derived ownership column.
    pub fn into_row(self) -> (StampRow, bool) {
        let is_owned = self.is_owned;
        (
            StampRow {
                id: self.id,
                name: self.name,
                scott_number: self.scott_number,
                issue_date: self.issue_date,
                series: self.series,
                notes: self.notes,
                image_url: self.image_url,
                date_added: self.date_added,
                date_modified: self.date_modified,
            },
            is_owned,
        )
    }
}

/// Fully composed stamp as served by the API: the design row, derived
/// ownership, tag names, instances with resolved box names, and the distinct
/// box names across its instances.
#[derive(Debug, Clone)]
pub struct StampDetails {
    pub stamp: StampRow,
    pub is_owned: bool,
    pub tags: Vec<String>,
    pub instances: Vec<InstanceDetails>,
    pub box_names: Vec<String>,
}

// =============================================================================
// Stamp instances
// =============================================================================

/// A grouped count of physically identical copies: same design, same
/// condition, same box.
#[derive(Debug, Clone, FromRow)]
pub struct InstanceRow {
    pub id: Uuid,
    pub stamp_id: Uuid,
    pub condition: Option<String>,
    pub box_id: Option<Uuid>,
    pub quantity: i64,
    pub date_added: OffsetDateTime,
    pub date_modified: OffsetDateTime,
}

/// Instance with its storage box name resolved for display.
#[derive(Debug, Clone, FromRow)]
pub struct InstanceDetails {
    pub id: Uuid,
    pub stamp_id: Uuid,
    pub condition: Option<String>,
    pub box_id: Option<Uuid>,
    pub box_name: Option<String>,
    pub quantity: i64,
    pub date_added: OffsetDateTime,
    pub date_modified: OffsetDateTime,
}

impl InstanceDetails {
    /// The plain row, without the joined box name.
    pub fn to_row(&self) -> InstanceRow {
        InstanceRow {
            id: self.id,
            stamp_id: self.stamp_id,
            condition: self.condition.clone(),
            box_id: self.box_id,
            quantity: self.quantity,
            date_added: self.date_added,
            date_modified: self.date_modified,
        }
    }
}

// =============================================================================
// Tags
// =============================================================================

/// Tag record.
#[derive(Debug, Clone, FromRow)]
pub struct TagRow {
    pub id: Uuid,
    pub name: String,
}

/// Tag with the number of designs carrying it.
#[derive(Debug, Clone, FromRow)]
pub struct TagSummary {
    pub id: Uuid,
    pub name: String,
    pub stamp_count: i64,
}

// =============================================================================
// Collection statistics
// =============================================================================

/// Aggregate collection counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    /// Sum of all non-deleted instance quantities.
    pub total_owned: i64,
    /// Distinct non-null scott numbers among non-deleted designs.
    pub unique_stamps: i64,
    /// Non-deleted designs with no non-deleted instance.
    pub stamps_needed: i64,
    /// Storage box count.
    pub storage_boxes: i64,
}

// =============================================================================
// Partial updates
// =============================================================================

/// Deserialize a double-`Option` field: the outer layer distinguishes
/// "absent from the patch" from "present"; JSON `null` carries `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Like [`double_option`] for box references, additionally treating the empty
/// string as "clear" (the inline-edit UI submits `""` for "no box").
fn double_option_uuid<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(Some(None)),
        Some(value) if value.is_empty() => Ok(Some(None)),
        Some(value) => Uuid::parse_str(&value)
            .map(|id| Some(Some(id)))
            .map_err(serde::de::Error::custom),
    }
}

/// Empty strings clear nullable text fields, matching the inline-edit UI.
fn empty_to_null(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Partial update for a stamp design. Absent fields leave the existing value
/// unchanged; `null` (or `""`) clears nullable fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StampPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub scott_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub issue_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub series: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    /// Full replacement tag set; absent leaves tags untouched.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl StampPatch {
    /// Apply the patch to an existing row, returning the updated row.
    /// `date_modified` is carried over; callers stamp it at write time.
    pub fn apply(&self, existing: &StampRow) -> StampRow {
        let mut updated = existing.clone();
        if let Some(name) = &self.name {
            updated.name = name.clone();
        }
        if let Some(scott_number) = &self.scott_number {
            updated.scott_number = empty_to_null(scott_number.clone());
        }
        if let Some(issue_date) = &self.issue_date {
            updated.issue_date = empty_to_null(issue_date.clone());
        }
        if let Some(series) = &self.series {
            updated.series = empty_to_null(series.clone());
        }
        if let Some(notes) = &self.notes {
            updated.notes = empty_to_null(notes.clone());
        }
        if let Some(image_url) = &self.image_url {
            updated.image_url = empty_to_null(image_url.clone());
        }
        updated
    }
}

/// Partial update for a stamp instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstancePatch {
    #[serde(default, deserialize_with = "double_option")]
    pub condition: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option_uuid")]
    pub box_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl InstancePatch {
    /// Apply the patch to an existing row, returning the updated row.
    pub fn apply(&self, existing: &InstanceRow) -> InstanceRow {
        let mut updated = existing.clone();
        if let Some(condition) = &self.condition {
            updated.condition = empty_to_null(condition.clone());
        }
        if let Some(box_id) = self.box_id {
            updated.box_id = box_id;
        }
        if let Some(quantity) = self.quantity {
            updated.quantity = quantity;
        }
        updated
    }
}
