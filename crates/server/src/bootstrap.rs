//! Startup bootstrap: sample-data seeding.

use stampkeeper_core::listing::StampFilters;
use stampkeeper_metadata::models::{InstanceRow, StampRow, StorageBoxRow};
use stampkeeper_metadata::{MetadataResult, MetadataStore};
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// Seed a handful of classic stamps when the collection is empty. Returns
/// whether anything was inserted.
pub async fn seed_if_empty(metadata: &Arc<dyn MetadataStore>) -> MetadataResult<bool> {
    let existing = metadata.count_stamps(&StampFilters::default()).await?;
    if existing > 0 {
        return Ok(false);
    }

    let now = OffsetDateTime::now_utc();

    let box1 = StorageBoxRow {
        id: Uuid::new_v4(),
        name: "Box 1".to_string(),
        date_created: now,
    };
    let box2 = StorageBoxRow {
        id: Uuid::new_v4(),
        name: "Box 2".to_string(),
        date_created: now,
    };
    metadata.create_box(&box1).await?;
    metadata.create_box(&box2).await?;

    let samples: [(&str, &str, &str, &str, &[&str]); 4] = [
        (
            "Lincoln 1c Green",
            "219",
            "1890-02-22",
            "1890-93 Regular Issue",
            &["US Classics", "19th Century"],
        ),
        (
            "Washington 2c Carmine",
            "220",
            "1890-02-22",
            "1890-93 Regular Issue",
            &["US Classics", "19th Century"],
        ),
        (
            "Jackson 3c Purple",
            "221",
            "1890-02-22",
            "1890-93 Regular Issue",
            &["US Classics", "19th Century"],
        ),
        ("German Empire 10pf", "55", "1900-01-01", "Germania", &["Europe"]),
    ];

    let mut stamp_ids = Vec::with_capacity(samples.len());
    for (name, scott_number, issue_date, series, tags) in samples {
        let stamp = StampRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            scott_number: Some(scott_number.to_string()),
            issue_date: Some(issue_date.to_string()),
            series: Some(series.to_string()),
            notes: None,
            image_url: None,
            date_added: now,
            date_modified: now,
        };
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        metadata.create_stamp(&stamp, &tags).await?;
        stamp_ids.push(stamp.id);
    }

    // Copies for the first two designs; the rest stay "needed".
    let instances = [
        (stamp_ids[0], Some("Used"), Some(box1.id), 3),
        (stamp_ids[1], Some("Mint"), Some(box1.id), 1),
        (stamp_ids[1], Some("Used"), Some(box2.id), 2),
    ];
    for (stamp_id, condition, box_id, quantity) in instances {
        let instance = InstanceRow {
            id: Uuid::new_v4(),
            stamp_id,
            condition: condition.map(|c| c.to_string()),
            box_id,
            quantity,
            date_added: now,
            date_modified: now,
        };
        metadata.create_instance(&instance).await?;
    }

    Ok(true)
}
