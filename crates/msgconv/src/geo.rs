//! `geo:` URI parsing.

use crate::error::GeoUriError;

/// Parse `geo:<lat>,<long>[;params]` into `(latitude, longitude)`.
///
/// Anything from the first `;` on is ignored. Coordinates are not
/// range-checked.
pub fn parse_geo_uri(uri: &str) -> Result<(f64, f64), GeoUriError> {
    let rest = uri.strip_prefix("geo:").ok_or(GeoUriError::MissingPrefix)?;
    let coordinates = rest.split(';').next().unwrap_or_default();

    let mut parts = coordinates.split(',');
    let (Some(lat), Some(long), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(GeoUriError::CoordinateCount);
    };

    let lat = lat.parse::<f64>().map_err(GeoUriError::Latitude)?;
    let long = long.parse::<f64>().map_err(GeoUriError::Longitude)?;
    Ok((lat, long))
}
