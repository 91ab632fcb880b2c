use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{Result, SnapshotError};
use crate::models::NormalizedRecord;
use crate::normalize::{datasift, gnip, tweepy};
use crate::time_utils::date_token;

/// First day of the Gnip collection period. Units dated before it came from
/// Datasift.
pub const GNIP_CUTOVER_DATE: &str = "2016-01-01";

/// Upstream system a record was collected with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Exports of our own Tweepy collector.
    Tweepy,
    /// Datasift firehose exports, up to the end of 2015.
    Datasift,
    /// Gnip activity-streams exports, from 2016 on.
    Gnip,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Provider {
    /// The lowercase tag written to `collectedWith`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Tweepy => "tweepy",
            Provider::Datasift => "datasift",
            Provider::Gnip => "gnip",
        }
    }

    /// Choose the normalizer for the unit called `unit_name`.
    ///
    /// Tweepy exports are asserted by the caller and cannot be told apart from
    /// their content. Otherwise the unit's date token decides: Datasift before
    /// [`GNIP_CUTOVER_DATE`], Gnip on or after it.
    pub fn detect(unit_name: &str, from_tweepy: bool) -> Self {
        if from_tweepy {
            return Provider::Tweepy;
        }
        if date_token(unit_name) < GNIP_CUTOVER_DATE {
            Provider::Datasift
        } else {
            Provider::Gnip
        }
    }

    /// Normalize an already-decoded document.
    pub fn normalize(&self, raw: &Value) -> Result<NormalizedRecord> {
        if !raw.is_object() {
            return Err(SnapshotError::NotADocument);
        }
        match self {
            Provider::Tweepy => tweepy::normalize(raw),
            Provider::Datasift => datasift::normalize(raw),
            Provider::Gnip => gnip::normalize(raw),
        }
    }

    /// Decode one input line and normalize it.
    pub fn normalize_line(&self, line: &str) -> Result<NormalizedRecord> {
        let raw: Value = serde_json::from_str(line)?;
        self.normalize(&raw)
    }
}
