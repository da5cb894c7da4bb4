//! Query parameter parsing for the items endpoint.
//!
//! Parsing is deliberately forgiving: unparsable `limit`/`offset` fall back to
//! their defaults and an unusable `bbox` is dropped instead of rejected.

use serde::{Deserialize, Serialize};

use crate::errors::FeaturesError;

/// Page size used when `limit` is absent or not numeric.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 1000;

/// An axis-aligned bounding box `[minx, miny, maxx, maxy]` in WGS84.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bbox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bbox {
    /// Parse a bbox parameter.
    ///
    /// Format: `minx,miny,maxx,maxy`. Exactly four finite numbers are required.
    pub fn parse(bbox: &str) -> Result<Self, FeaturesError> {
        let parts: Vec<&str> = bbox.split(',').collect();
        if parts.len() != 4 {
            return Err(FeaturesError::InvalidParameter(format!(
                "Expected 4 values for bbox, got {}",
                parts.len()
            )));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    FeaturesError::InvalidParameter(format!("Invalid bbox value: {}", part))
                })?;
        }

        Ok(Bbox {
            min_x: values[0],
            min_y: values[1],
            max_x: values[2],
            max_y: values[3],
        })
    }

    /// The four values in `[minx, miny, maxx, maxy]` order.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// Whether a point lies inside the box (edges inclusive).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

/// Raw query string values as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItemsParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub bbox: Option<String>,
    pub datetime: Option<String>,
    pub properties: Option<String>,
}

impl RawItemsParams {
    /// Collect from decoded query pairs; the first occurrence of a key wins.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut raw = Self::default();
        for (key, value) in pairs {
            let slot = match key {
                "limit" => &mut raw.limit,
                "offset" => &mut raw.offset,
                "bbox" => &mut raw.bbox,
                "datetime" => &mut raw.datetime,
                "properties" => &mut raw.properties,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }
        raw
    }
}

/// Validated items query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemsQuery {
    /// Page size, always within `[1, MAX_LIMIT]`.
    pub limit: i64,

    /// Rows to skip. Negative values are passed through unchanged.
    pub offset: i64,

    /// Spatial filter.
    pub bbox: Option<Bbox>,

    /// Temporal filter. Accepted but not applied to the query.
    pub datetime: Option<String>,

    /// Property selection. Accepted but not applied to the query.
    pub properties: Option<String>,
}

impl Default for ItemsQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            bbox: None,
            datetime: None,
            properties: None,
        }
    }
}

impl ItemsQuery {
    /// Normalise raw parameters.
    pub fn from_raw(raw: &RawItemsParams) -> Self {
        let limit = raw
            .limit
            .as_deref()
            .and_then(parse_int_prefix)
            .map(|l| l.clamp(1, MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);

        let offset = raw.offset.as_deref().and_then(parse_int_prefix).unwrap_or(0);

        let bbox = raw.bbox.as_deref().and_then(|b| Bbox::parse(b).ok());

        Self {
            limit,
            offset,
            bbox,
            datetime: raw.datetime.clone(),
            properties: raw.properties.clone(),
        }
    }
}

/// Parse the leading integer of a string (`"25"`, `" -3"`, `"12.9"` -> 12,
/// `"7abc"` -> 7). Returns `None` when no digits lead the value.
pub fn parse_int_prefix(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate instead of failing on absurdly long inputs.
    let magnitude: i64 = digits[..end].parse().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
