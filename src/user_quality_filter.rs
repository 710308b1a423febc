//! Quality filter pipeline: shape validation, deduplication, business filter.
//!
//! Each stage is total over its input: malformed entries, duplicate ids and
//! records failing a predicate are logged and dropped, never raised. The only
//! errors out of [`run`] are store IO failures.

use crate::store;
use crate::user_record::{FilteredUser, UserRecord, REQUIRED_FIELDS};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Account-creation cutoff: only profiles created strictly after this date
/// pass the filter. Kept configurable; conflicting constants existed
/// historically (2008 vs 2015).
pub const DEFAULT_CUTOFF: &str = "2015-01-01T00:00:00Z";

#[derive(Debug, Clone)]
pub struct QualityFilterConfig {
    pub cutoff: DateTime<Utc>,
}

impl Default for QualityFilterConfig {
    fn default() -> Self {
        Self {
            cutoff: DateTime::parse_from_rfc3339(DEFAULT_CUTOFF)
                .expect("default cutoff is valid RFC 3339")
                .with_timezone(&Utc),
        }
    }
}

/// Counts reported by a pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSummary {
    pub loaded: usize,
    pub duplicates_removed: usize,
    pub kept: usize,
}

/// Keep only entries that are objects carrying all five required field
/// names. Field presence is checked, not types; anything else is dropped
/// with a warning.
pub fn validate_shape(entries: Vec<Value>) -> Vec<UserRecord> {
    let mut records = Vec::with_capacity(entries.len());

    for entry in entries {
        let well_formed = entry
            .as_object()
            .map(|obj| REQUIRED_FIELDS.iter().all(|f| obj.contains_key(*f)))
            .unwrap_or(false);
        if !well_formed {
            warn!("Ignoring malformed record: {entry}");
            continue;
        }

        match serde_json::from_value::<UserRecord>(entry.clone()) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Ignoring undecodable record ({e}): {entry}"),
        }
    }

    records
}

/// Deduplicate by `id`, last write wins. Returns the surviving records and
/// the number removed. Output order across overwritten ids follows map
/// iteration and is not guaranteed to match input order.
pub fn deduplicate(records: Vec<UserRecord>) -> (Vec<UserRecord>, usize) {
    let input_len = records.len();
    let mut by_id: HashMap<u64, UserRecord> = HashMap::with_capacity(input_len);

    for record in records {
        by_id.insert(record.id, record);
    }

    let unique: Vec<UserRecord> = by_id.into_values().collect();
    let removed = input_len - unique.len();
    (unique, removed)
}

/// Business filter: non-empty `bio`, non-blank `avatar_url`, and a
/// `created_at` timestamp strictly after `cutoff`. Unparseable timestamps
/// drop the record.
pub fn apply_filter(records: Vec<UserRecord>, cutoff: DateTime<Utc>) -> Vec<FilteredUser> {
    records
        .into_iter()
        .filter_map(|record| {
            let bio = match record.bio {
                Some(ref bio) if !bio.is_empty() => bio.clone(),
                _ => {
                    debug!("Rejecting {} - no bio", record.login);
                    return None;
                }
            };

            if record.avatar_url.trim().is_empty() {
                debug!("Rejecting {} - no avatar", record.login);
                return None;
            }

            let created_at = match DateTime::parse_from_rfc3339(&record.created_at) {
                Ok(ts) => ts.with_timezone(&Utc),
                Err(_) => {
                    debug!(
                        "Rejecting {} - unparseable created_at {:?}",
                        record.login, record.created_at
                    );
                    return None;
                }
            };
            if created_at <= cutoff {
                debug!("Rejecting {} - account older than cutoff", record.login);
                return None;
            }

            Some(FilteredUser {
                login: record.login,
                id: record.id,
                created_at: record.created_at,
                avatar_url: record.avatar_url,
                bio,
            })
        })
        .collect()
}

/// Run the full pipeline: load the raw store, validate, deduplicate, filter,
/// and replace the filtered store.
pub fn run(input: &Path, output: &Path, config: &QualityFilterConfig) -> Result<PipelineSummary> {
    let entries: Vec<Value> = store::load_json(input)?;
    let records = validate_shape(entries);
    let loaded = records.len();

    let (unique, duplicates_removed) = deduplicate(records);
    let filtered = apply_filter(unique, config.cutoff);
    let kept = filtered.len();

    store::save_json(&filtered, output)?;
    info!(
        "Pipeline complete: {loaded} loaded, {duplicates_removed} duplicates removed, {kept} kept"
    );

    Ok(PipelineSummary {
        loaded,
        duplicates_removed,
        kept,
    })
}
