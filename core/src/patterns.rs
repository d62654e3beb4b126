//! Default URL filter tables: tracking query parameters and binary/media
//! extensions that are never worth fetching.

pub const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "roistat_visit",
    "yclid",
    "ysclid",
    "transaction_id",
    "ybaip",
];

// Keys starting with any of these are stripped as well.
pub const TRACKING_PREFIXES: &[&str] = &["utm_", "roistat_"];

pub const BLOCK_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "svg", "mp4", "mp3", "avi", "mov",
    "mkv", "pdf", "zip", "rar", "7z", "gz", "bz2", "exe", "dmg", "iso",
];
