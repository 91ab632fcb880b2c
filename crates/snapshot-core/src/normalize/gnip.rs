//! Gnip activity-streams exports (collection period from 2016-01-01).
//!
//! Extended tweets carry their full body and entities in a `long_object`
//! wrapper; regular tweets carry them at the top level.

use serde_json::Value;

use super::{geo_lat_lon, opt_string, pluck, required_str};
use crate::error::Result;
use crate::models::{DetectedLanguage, InReplyTo, NormalizedRecord};
use crate::provider::Provider;

pub fn normalize(raw: &Value) -> Result<NormalizedRecord> {
    // postedTime is already canonical ISO-8601.
    let date = required_str(raw, "/postedTime")?.to_string();
    let id = last_segment(required_str(raw, "/id")?, ':');
    let user_id = last_segment(required_str(raw, "/actor/id")?, ':');
    let client = opt_string(raw, "/generator/displayName").unwrap_or_default();

    let mut record = NormalizedRecord::new(id, date, user_id, client, Provider::Gnip);
    record.user.timezone = opt_string(raw, "/actor/twitterTimeZone");

    let (body, entities) = if raw.get("long_object").is_some() {
        ("/long_object/body", "/long_object/twitter_entities")
    } else {
        ("/body", "/twitter_entities")
    };
    record.text = opt_string(raw, body);
    record.hashtags = pluck(raw, &format!("{entities}/hashtags"), "text");
    record.urls = pluck(raw, &format!("{entities}/urls"), "expanded_url");
    record.mentions = pluck(raw, &format!("{entities}/user_mentions"), "id_str");
    record.media = pluck(raw, &format!("{entities}/media"), "media_url");

    record.geo = raw.pointer("/geo/coordinates").and_then(geo_lat_lon);

    record.language.user = opt_string(raw, "/actor/languages/0");
    record.language.twitter = opt_string(raw, "/twitter_lang");
    record.language.provider_detected =
        opt_string(raw, "/gnip/language/value").map(|tag| DetectedLanguage {
            tag,
            confidence: None,
        });

    if let Some(link) = raw.pointer("/inReplyTo/link").and_then(Value::as_str) {
        record.in_reply_to = Some(InReplyTo {
            tweet_id: Some(last_segment(link, '/')),
            user_id: None,
        });
    }

    Ok(record)
}

/// Text after the last `sep`: `"tag:search.twitter.com,2005:42"` → `"42"`.
fn last_segment(value: &str, sep: char) -> String {
    value.rsplit(sep).next().unwrap_or(value).to_string()
}
