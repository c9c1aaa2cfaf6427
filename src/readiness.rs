//! Per-type "is it worth rendering yet" heuristics.
//!
//! Evaluated on the formatted payload. This is advisory only: a ready
//! payload may still be rejected by the encoder.

use crate::content::ContentType;

const MIN_URL_LEN: usize = 4;
const MIN_PHONE_LEN: usize = 6;
const WIFI_MARKER: &str = "WIFI:";
const WIFI_TERMINATOR: &str = ";;";

pub fn is_ready(content_type: ContentType, payload: &str) -> bool {
    let len = payload.chars().count();
    match content_type {
        ContentType::Url => len >= MIN_URL_LEN,
        ContentType::Email => payload.contains('@'),
        ContentType::Phone => len >= MIN_PHONE_LEN,
        ContentType::WifiCredential => {
            payload.contains(WIFI_MARKER) && payload.ends_with(WIFI_TERMINATOR)
        }
        ContentType::Text | ContentType::Sms => len > 0,
    }
}
