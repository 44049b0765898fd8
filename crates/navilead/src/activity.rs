//! Dashboard activity aggregation
//!
//! The dashboard receives a flat, mixed list of records. They are grouped by
//! their `type` for the per-type panels and re-merged newest-first for the
//! unified feed.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A new or updated lead
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadActivity {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// An offer sent, viewed, accepted or rejected
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferActivity {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub title: String,
    #[serde(default)]
    pub lead_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total: Option<f64>,
}

/// An email sent to a lead
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmailActivity {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub subject: String,
    pub recipient: String,
}

/// An SMS sent to a lead
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SmsActivity {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub recipient: String,
    pub message: String,
}

/// A question asked by a lead about an offer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionActivity {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub question: String,
    #[serde(default)]
    pub lead_name: Option<String>,
}

/// One record of the dashboard feed, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Activity {
    Lead(LeadActivity),
    Offer(OfferActivity),
    Email(EmailActivity),
    Sms(SmsActivity),
    Question(QuestionActivity),
}

/// Discriminator of an [`Activity`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Lead,
    Offer,
    Email,
    Sms,
    Question,
}

impl Activity {
    pub fn created_at(&self) -> OffsetDateTime {
        match self {
            Activity::Lead(a) => a.created_at,
            Activity::Offer(a) => a.created_at,
            Activity::Email(a) => a.created_at,
            Activity::Sms(a) => a.created_at,
            Activity::Question(a) => a.created_at,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Activity::Lead(a) => &a.id,
            Activity::Offer(a) => &a.id,
            Activity::Email(a) => &a.id,
            Activity::Sms(a) => &a.id,
            Activity::Question(a) => &a.id,
        }
    }

    pub fn activity_type(&self) -> ActivityType {
        match self {
            Activity::Lead(_) => ActivityType::Lead,
            Activity::Offer(_) => ActivityType::Offer,
            Activity::Email(_) => ActivityType::Email,
            Activity::Sms(_) => ActivityType::Sms,
            Activity::Question(_) => ActivityType::Question,
        }
    }
}

/// Records partitioned by type, each bucket newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ActivityBuckets {
    pub leads: Vec<Activity>,
    pub offers: Vec<Activity>,
    pub emails: Vec<Activity>,
    pub sms: Vec<Activity>,
    pub questions: Vec<Activity>,
}

impl ActivityBuckets {
    fn bucket_mut(&mut self, kind: ActivityType) -> &mut Vec<Activity> {
        match kind {
            ActivityType::Lead => &mut self.leads,
            ActivityType::Offer => &mut self.offers,
            ActivityType::Email => &mut self.emails,
            ActivityType::Sms => &mut self.sms,
            ActivityType::Question => &mut self.questions,
        }
    }

    /// Records of one type
    pub fn bucket(&self, kind: ActivityType) -> &[Activity] {
        match kind {
            ActivityType::Lead => &self.leads,
            ActivityType::Offer => &self.offers,
            ActivityType::Email => &self.emails,
            ActivityType::Sms => &self.sms,
            ActivityType::Question => &self.questions,
        }
    }

    pub fn counts(&self) -> ActivityCounts {
        ActivityCounts {
            leads: self.leads.len(),
            offers: self.offers.len(),
            emails: self.emails.len(),
            sms: self.sms.len(),
            questions: self.questions.len(),
        }
    }

    /// All records merged back into one list, newest first
    pub fn merged(&self) -> Vec<Activity> {
        let mut all: Vec<Activity> = [
            &self.leads,
            &self.offers,
            &self.emails,
            &self.sms,
            &self.questions,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect();
        sort_newest_first(&mut all);
        all
    }
}

/// Number of records per type, for the dashboard cards
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ActivityCounts {
    pub leads: usize,
    pub offers: usize,
    pub emails: usize,
    pub sms: usize,
    pub questions: usize,
}

impl ActivityCounts {
    pub fn total(&self) -> usize {
        self.leads + self.offers + self.emails + self.sms + self.questions
    }
}

/// Everything the dashboard activity panel shows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityFeed {
    pub counts: ActivityCounts,
    pub buckets: ActivityBuckets,
    pub feed: Vec<Activity>,
}

// stable: equal timestamps keep their relative order
fn sort_newest_first(records: &mut [Activity]) {
    records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}

/// Partition records by type; each bucket is sorted newest first
pub fn group_by_type(records: impl IntoIterator<Item = Activity>) -> ActivityBuckets {
    let mut buckets = ActivityBuckets::default();
    for record in records {
        buckets.bucket_mut(record.activity_type()).push(record);
    }
    for bucket in [
        &mut buckets.leads,
        &mut buckets.offers,
        &mut buckets.emails,
        &mut buckets.sms,
        &mut buckets.questions,
    ] {
        sort_newest_first(bucket);
    }
    buckets
}

/// All records newest first, optionally truncated to `limit`
pub fn unified_feed(records: impl IntoIterator<Item = Activity>, limit: Option<usize>) -> Vec<Activity> {
    let mut feed: Vec<Activity> = records.into_iter().collect();
    sort_newest_first(&mut feed);
    if let Some(limit) = limit {
        feed.truncate(limit);
    }
    feed
}

/// Build the dashboard panel: counts, buckets and the (optionally limited) feed
pub fn build_feed(records: Vec<Activity>, limit: Option<usize>) -> ActivityFeed {
    let feed = unified_feed(records.iter().cloned(), limit);
    let buckets = group_by_type(records);
    tracing::debug!(total = buckets.counts().total(), shown = feed.len(), "built activity feed");
    ActivityFeed {
        counts: buckets.counts(),
        buckets,
        feed,
    }
}
