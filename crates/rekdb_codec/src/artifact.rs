//! Downloadable artifact naming.

use chrono::{DateTime, SecondsFormat, Utc};

/// Returns the file name of a downloadable backup artifact:
/// `<product>_backup_<isoTimestamp>.json`.
///
/// The timestamp uses millisecond precision and a `Z` suffix.
///
/// ```
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
/// assert_eq!(
///     rekdb_codec::artifact_name("rekreativ", ts),
///     "rekreativ_backup_2024-03-01T10:00:00.000Z.json"
/// );
/// ```
#[must_use]
pub fn artifact_name(product: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "{product}_backup_{}.json",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}
