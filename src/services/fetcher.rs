// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity listing with pagination.

use std::sync::Arc;

use crate::error::AppError;
use crate::services::strava::{StravaActivity, StravaApi};

/// Fetches the complete activity listing for one athlete.
///
/// Pages of a fixed size are requested until a short page signals the end
/// of the data. The result is all-or-nothing: any page failure (including a
/// timeout) discards the pages already retrieved, so a returned listing is
/// always a complete set for the requested window.
pub struct ActivityFetcher {
    api: Arc<dyn StravaApi>,
    per_page: u32,
}

impl ActivityFetcher {
    pub fn new(api: Arc<dyn StravaApi>, per_page: u32) -> Self {
        Self {
            api,
            // A zero page size would page forever
            per_page: per_page.max(1),
        }
    }

    /// Fetch every activity after the optional `after` epoch-seconds bound.
    pub async fn fetch_activities(
        &self,
        access_token: &str,
        after: Option<i64>,
    ) -> Result<Vec<StravaActivity>, AppError> {
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let batch = self
                .api
                .list_activities(access_token, after, page, self.per_page)
                .await?;

            let count = batch.len() as u32;
            all.extend(batch);

            if count < self.per_page {
                break;
            }
            page += 1;
        }

        tracing::debug!(total = all.len(), pages = page, "Activity listing complete");
        Ok(all)
    }
}
