//! Twitter REST API statuses as dumped by the Tweepy collector.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{first_id, geo_lat_lon, geo_lon_lat, opt_string, pluck, required_str};
use crate::error::{Result, SnapshotError};
use crate::models::{InReplyTo, NormalizedRecord};
use crate::provider::Provider;
use crate::time_utils::parse_twitter_created_at;

static SOURCE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<a.+?>(.+?)</a>").expect("regex is valid"));

pub fn normalize(raw: &Value) -> Result<NormalizedRecord> {
    let id = first_id(raw, &["/id_str", "/id"]).ok_or(SnapshotError::MissingField("id_str"))?;
    let user_id = first_id(raw, &["/user/id_str", "/user/id"])
        .ok_or(SnapshotError::MissingField("user.id_str"))?;
    let date = parse_twitter_created_at(required_str(raw, "/created_at")?)?;
    let text = opt_string(raw, "/full_text")
        .or_else(|| opt_string(raw, "/text"))
        .ok_or(SnapshotError::MissingField("full_text"))?;

    let mut record = NormalizedRecord::new(id, date, user_id, client_name(raw), Provider::Tweepy);
    record.text = Some(text);
    record.user.timezone = opt_string(raw, "/user/time_zone");
    record.language.twitter = opt_string(raw, "/lang");
    record.language.user = opt_string(raw, "/user/lang");

    record.geo = raw
        .pointer("/geo/coordinates")
        .and_then(geo_lat_lon)
        .or_else(|| raw.pointer("/coordinates/coordinates").and_then(geo_lon_lat));

    let reply_tweet = first_id(raw, &["/in_reply_to_status_id_str", "/in_reply_to_status_id"]);
    let reply_user = first_id(raw, &["/in_reply_to_user_id_str", "/in_reply_to_user_id"]);
    if reply_tweet.is_some() || reply_user.is_some() {
        record.in_reply_to = Some(InReplyTo {
            tweet_id: reply_tweet,
            user_id: reply_user,
        });
    }

    record.mentions = pluck(raw, "/entities/user_mentions", "id_str");
    record.hashtags = pluck(raw, "/entities/hashtags", "text");
    record.urls = pluck(raw, "/entities/urls", "expanded_url");
    record.media = pluck(raw, "/entities/media", "media_url");

    Ok(record)
}

/// Client name from the HTML `source` field.
///
/// `<a href="..." rel="nofollow">Twitter for iPhone</a>` yields the anchor
/// text. An empty or missing source yields `""`; a source that is not an
/// anchor is kept as is.
fn client_name(raw: &Value) -> String {
    let source = raw.get("source").and_then(Value::as_str).unwrap_or("");
    match SOURCE_ANCHOR.captures(source) {
        Some(caps) => caps[1].to_string(),
        None => source.to_string(),
    }
}
