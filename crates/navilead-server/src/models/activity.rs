//! Activity feed models

use navilead::Activity;
use serde::Deserialize;

/// Mixed dashboard records to aggregate
#[derive(Debug, Deserialize)]
pub struct ActivityFeedRequest {
    #[serde(default)]
    pub records: Vec<Activity>,
    pub limit: Option<usize>,
}
