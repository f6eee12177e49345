//! Candidate businesses as delivered by the catalog and consumed by the slot engine.

use serde::{Deserialize, Deserializer, Serialize};

/// Subscription tier governing which display slots a candidate may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanTier {
    Hero,
    Left,
    Right,
    #[default]
    Basic,
}

impl PlanTier {
    pub const ALL: [PlanTier; 4] = [
        PlanTier::Hero,
        PlanTier::Left,
        PlanTier::Right,
        PlanTier::Basic,
    ];

    /// Normalize a raw wire tag into a tier.
    ///
    /// Only the exact strings `HERO`, `LEFT` and `RIGHT` select a paid tier.
    /// Anything else, including a missing tag, lands in [`PlanTier::Basic`].
    #[must_use]
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("HERO") => PlanTier::Hero,
            Some("LEFT") => PlanTier::Left,
            Some("RIGHT") => PlanTier::Right,
            _ => PlanTier::Basic,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PlanTier::Hero => "HERO",
            PlanTier::Left => "LEFT",
            PlanTier::Right => "RIGHT",
            PlanTier::Basic => "BASIC",
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PlanTier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Non-string tags (numbers, objects) are malformed, not fatal.
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(PlanTier::from_tag(raw.as_ref().and_then(|v| v.as_str())))
    }
}

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` when both components are finite and inside the valid
    /// latitude/longitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A business eligible for placement in a display slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub plan_type: PlanTier,
    #[serde(default, deserialize_with = "deserialize_rank")]
    pub priority_rank: i64,
    #[serde(default, deserialize_with = "deserialize_visitor_count")]
    pub visitor_count: u64,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Kilometres from the caller's reference point. Derived, never read from input.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl Candidate {
    /// Creates a candidate with empty presentation fields and default ranking signals.
    #[must_use]
    pub fn new(id: impl Into<String>, plan_type: PlanTier) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            image_url: String::new(),
            link: String::new(),
            latitude: None,
            longitude: None,
            plan_type,
            priority_rank: 0,
            visitor_count: 0,
            area: None,
            city: None,
            website: None,
            distance_km: None,
        }
    }

    #[must_use]
    pub fn with_priority_rank(mut self, rank: i64) -> Self {
        self.priority_rank = rank;
        self
    }

    #[must_use]
    pub fn with_visitor_count(mut self, count: u64) -> Self {
        self.visitor_count = count;
        self
    }

    #[must_use]
    pub fn with_position(mut self, lat: f64, lng: f64) -> Self {
        self.latitude = Some(lat);
        self.longitude = Some(lng);
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The candidate's coordinates, when both are present and finite.
    #[must_use]
    pub fn position(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(GeoPoint { lat, lng })
            }
            _ => None,
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "candidate id must be a non-empty string or number, got {other}"
        ))),
    }
}

fn deserialize_rank<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

fn deserialize_visitor_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?.unwrap_or(0);
    Ok(u64::try_from(raw).unwrap_or(0))
}

#[cfg(test)]
#[path = "candidate_test.rs"]
mod tests;
