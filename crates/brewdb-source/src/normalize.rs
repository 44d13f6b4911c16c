//! Normalization from raw upstream records to [`brewdb_core::Brewery`].

use chrono::{DateTime, Utc};

use brewdb_core::Brewery;

use crate::types::UpstreamBrewery;

/// Normalizes a raw upstream record into a canonical [`Brewery`].
///
/// Returns `None` for records that fail the identity invariant (empty `id` or
/// `name`) — such records are dropped rather than stored with empty fields.
///
/// Field handling:
/// - `state_province` is preferred over the legacy `state` field.
/// - Coordinates are parsed from strings; blank or non-numeric input is
///   treated as absent, and a half-present pair is demoted to fully absent.
/// - Phone numbers are whitespace-trimmed; blank becomes absent.
/// - Empty-string optionals become absent.
#[must_use]
pub fn normalize_brewery(raw: UpstreamBrewery, fetched_at: DateTime<Utc>) -> Option<Brewery> {
    if raw.id.is_empty() || raw.name.is_empty() {
        tracing::warn!(
            id = %raw.id,
            name = %raw.name,
            "dropping upstream record with empty identity fields"
        );
        return None;
    }

    let latitude = parse_coordinate(raw.latitude.as_deref());
    let longitude = parse_coordinate(raw.longitude.as_deref());
    // Coordinates only make sense as a pair.
    let (latitude, longitude) = match (latitude, longitude) {
        (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
        _ => (None, None),
    };

    Some(Brewery {
        id: raw.id,
        name: raw.name,
        city: raw.city.unwrap_or_default(),
        state: non_empty(raw.state_province.or(raw.state)),
        country: non_empty(raw.country),
        postal_code: non_empty(raw.postal_code),
        phone: clean_phone(raw.phone),
        website_url: non_empty(raw.website_url),
        brewery_type: non_empty(raw.brewery_type),
        latitude,
        longitude,
        last_updated: fetched_at,
    })
}

/// Treats an empty string as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Trims whitespace from a phone number; blank input becomes absent.
fn clean_phone(phone: Option<String>) -> Option<String> {
    phone
        .map(|p| p.trim().to_owned())
        .filter(|p| !p.is_empty())
}

/// Parses a coordinate from upstream text; blank or non-numeric is absent.
fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
}
