use serde::{Deserialize, Serialize};

use crate::provider::Provider;

/// Author information carried on every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Provider-native user identifier, always string-typed.
    pub id: String,
    /// Free-form time zone label from the author's profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// Language identified by the provider's own classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLanguage {
    pub tag: String,
    /// Only Datasift reports a confidence score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// The three language signals a record may carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Language {
    /// Language tag assigned by Twitter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    /// Interface language of the author's account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_detected: Option<DetectedLanguage>,
}

/// A geographic position, always latitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub latitude: f64,
    pub longitude: f64,
}

/// Reply target of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InReplyTo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tweet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// The canonical record shape every provider is normalized into.
///
/// `id`, `date`, `user.id`, `client` and `collected_with` are always set.
/// Every other field mirrors the presence of its source field: it is `None`
/// when the provider did not supply it, and sequences are never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Body of the post.
    #[serde(rename = "tweet", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// `%Y-%m-%dT%H:%M:%S.000Z`.
    pub date: String,
    pub user: UserInfo,
    pub id: String,
    /// Name of the posting application; empty when unknown.
    pub client: String,
    #[serde(rename = "collectedWith")]
    pub collected_with: Provider,
    #[serde(default)]
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<InReplyTo>,
    /// User ids of mentioned accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    /// Media URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<String>>,
}

impl NormalizedRecord {
    /// A record carrying only the mandatory fields.
    pub fn new(
        id: String,
        date: String,
        user_id: String,
        client: String,
        collected_with: Provider,
    ) -> Self {
        Self {
            text: None,
            date,
            user: UserInfo {
                id: user_id,
                timezone: None,
            },
            id,
            client,
            collected_with,
            language: Language::default(),
            geo: None,
            in_reply_to: None,
            mentions: None,
            hashtags: None,
            urls: None,
            media: None,
        }
    }
}

/// Line counters for one input unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitStats {
    /// Every line read from the unit, including skipped ones.
    pub lines_read: u64,
    pub records_written: u64,
    /// Lines that could not be turned into a record.
    pub unparseable: u64,
}

/// Cumulative counters for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub units_processed: u64,
    pub units_failed: u64,
    pub lines_read: u64,
    pub records_written: u64,
    pub unparseable: u64,
    /// Merge stage only: later-period files with no earlier counterpart.
    pub counterparts_missing: u64,
}

impl RunTotals {
    /// Fold a finished unit into the totals.
    pub fn add_unit(&mut self, stats: &UnitStats) {
        self.units_processed += 1;
        self.lines_read += stats.lines_read;
        self.records_written += stats.records_written;
        self.unparseable += stats.unparseable;
    }
}
