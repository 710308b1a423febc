//! Cursor-paginated user harvesting from the upstream listing endpoint.
//!
//! Walks `GET /users?since=<id>` pages, fetches the detail record for each
//! listed login, and accumulates up to the caller's target count. Failures on
//! a single login are logged and skipped; a failed or empty page ends the run
//! with whatever was collected so far.

use crate::resilient_client::ResilientClient;
use crate::user_record::UserRecord;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Harvesting parameters. `max_pages` bounds the walk so a source whose
/// detail fetches keep failing cannot spin on non-empty pages forever.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Base URL of the upstream API.
    pub api_base: String,
    /// Initial `since` cursor.
    pub start_cursor: u64,
    /// Upper bound on listing pages per run.
    pub max_pages: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            start_cursor: 0,
            max_pages: 100,
        }
    }
}

/// One entry of a listing page. Only the cursor identity and the login are
/// needed; everything else comes from the detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UserSummary {
    pub login: String,
    pub id: u64,
}

/// Collects user records through a [`ResilientClient`].
pub struct UserHarvester {
    client: ResilientClient,
    config: HarvestConfig,
}

impl UserHarvester {
    pub fn new(client: ResilientClient, config: HarvestConfig) -> Self {
        Self { client, config }
    }

    /// Collect up to `target` user records. Returns fewer only when the
    /// upstream was exhausted, kept failing, or the page budget ran out;
    /// partial results are always returned.
    pub async fn collect(&self, target: usize) -> Vec<UserRecord> {
        let mut collected: Vec<UserRecord> = Vec::with_capacity(target);
        let mut cursor = self.config.start_cursor;
        let mut pages_fetched = 0usize;

        while collected.len() < target && pages_fetched < self.config.max_pages {
            pages_fetched += 1;
            let page_url = format!("{}/users?since={}", self.config.api_base, cursor);
            debug!("Fetching listing page #{pages_fetched} at cursor {cursor}");

            let Some(response) = self.client.fetch(&page_url).await else {
                warn!("Listing page at cursor {cursor} failed, stopping with partial results");
                break;
            };

            let page: Vec<UserSummary> = match response.json().await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Listing page at cursor {cursor} was not parseable: {e}");
                    break;
                }
            };

            if page.is_empty() {
                info!("Upstream exhausted after {} records", collected.len());
                break;
            }

            for summary in &page {
                if let Some(record) = self.fetch_detail(&summary.login).await {
                    collected.push(record);
                    if collected.len() >= target {
                        break;
                    }
                }
            }

            // Advance past everything listed on this page, including logins
            // whose detail fetch was skipped.
            if let Some(last) = page.last() {
                cursor = last.id;
            }
        }

        collected
    }

    async fn fetch_detail(&self, login: &str) -> Option<UserRecord> {
        let url = format!("{}/users/{}", self.config.api_base, login);
        let Some(response) = self.client.fetch(&url).await else {
            warn!("Could not fetch details for {login}, skipping");
            return None;
        };

        match response.json::<UserRecord>().await {
            Ok(record) => {
                debug!("Collected {login} (id {})", record.id);
                Some(record)
            }
            Err(e) => {
                warn!("Detail record for {login} was not parseable: {e}");
                None
            }
        }
    }
}
