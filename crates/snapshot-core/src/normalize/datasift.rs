//! Datasift interaction exports (collection period up to 2015-12-31).
//!
//! The tweet itself lives under `twitter`, the posting client under
//! `interaction`, and Datasift's own language classifier under `language`.

use serde_json::Value;

use super::{first_id, opt_string, pluck, required_id, required_str, scalars};
use crate::error::Result;
use crate::models::{DetectedLanguage, Geo, InReplyTo, NormalizedRecord};
use crate::provider::Provider;
use crate::time_utils::parse_datasift_created_at;

pub fn normalize(raw: &Value) -> Result<NormalizedRecord> {
    let date = parse_datasift_created_at(required_str(raw, "/twitter/created_at")?)?;
    let text = required_str(raw, "/twitter/text")?.to_string();
    let id = required_id(raw, "/twitter/id")?;
    let user_id = required_id(raw, "/twitter/user/id")?;
    let client = opt_string(raw, "/interaction/source").unwrap_or_default();

    let mut record = NormalizedRecord::new(id, date, user_id, client, Provider::Datasift);
    record.text = Some(text);
    record.user.timezone = opt_string(raw, "/twitter/user/time_zone");
    record.language.user = opt_string(raw, "/twitter/user/lang");
    record.language.twitter = opt_string(raw, "/twitter/lang");
    record.language.provider_detected =
        opt_string(raw, "/language/tag").map(|tag| DetectedLanguage {
            tag,
            confidence: raw.pointer("/language/confidence").and_then(Value::as_f64),
        });

    record.geo = named_geo(raw.pointer("/twitter/geo"));

    if let Some(tweet_id) = first_id(raw, &["/twitter/in_reply_to_status_id"]) {
        record.in_reply_to = Some(InReplyTo {
            tweet_id: Some(tweet_id),
            user_id: first_id(raw, &["/twitter/in_reply_to_user_id"]),
        });
    }

    record.mentions =
        scalars(raw, "/twitter/mention_ids").or_else(|| scalars(raw, "/twitter/mentions"));
    record.hashtags = scalars(raw, "/twitter/hashtags");
    record.urls = scalars(raw, "/twitter/links");
    record.media = pluck(raw, "/twitter/media", "expanded_url");

    Ok(record)
}

/// Datasift names its coordinates instead of using an ordered pair.
fn named_geo(geo: Option<&Value>) -> Option<Geo> {
    let geo = geo?;
    Some(Geo {
        latitude: geo.get("latitude")?.as_f64()?,
        longitude: geo.get("longitude")?.as_f64()?,
    })
}
