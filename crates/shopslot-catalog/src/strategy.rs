//! Declared fetch strategies, in the priority order their results are merged.

use shopslot_core::{GeoPoint, PlanTier};

use crate::types::SlotQuery;

/// Tiers queried by the plan-type fallback so paid slots fill even when the
/// location queries come back empty.
const PLAN_FALLBACK_TIERS: [PlanTier; 3] = [PlanTier::Hero, PlanTier::Left, PlanTier::Right];

/// One catalog query.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStrategy {
    Nearby { point: GeoPoint, radius_km: f64 },
    ByCity { city: String },
    ByPlan { tier: PlanTier },
}

impl FetchStrategy {
    /// Path segment under the catalog base URL.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            FetchStrategy::Nearby { .. } => "shops/nearby",
            FetchStrategy::ByCity { .. } => "shops/by-city",
            FetchStrategy::ByPlan { .. } => "shops/by-plan",
        }
    }

    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            FetchStrategy::Nearby { point, radius_km } => vec![
                ("lat", point.lat.to_string()),
                ("lng", point.lng.to_string()),
                ("radiusKm", radius_km.to_string()),
            ],
            FetchStrategy::ByCity { city } => vec![("city", city.clone())],
            FetchStrategy::ByPlan { tier } => vec![("plan", tier.as_str().to_string())],
        }
    }
}

impl std::fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStrategy::Nearby { .. } => write!(f, "nearby"),
            FetchStrategy::ByCity { .. } => write!(f, "by_city"),
            FetchStrategy::ByPlan { tier } => write!(f, "by_plan:{tier}"),
        }
    }
}

/// Build the strategy chain for a query: nearby, then city, then plan-type fallback.
///
/// Nearby needs a reference point and city needs a non-blank name; the plan-type
/// queries are always included.
#[must_use]
pub fn plan_strategies(query: &SlotQuery, radius_km: f64) -> Vec<FetchStrategy> {
    let nearby = query
        .reference
        .map(|point| FetchStrategy::Nearby { point, radius_km });

    let by_city = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|city| FetchStrategy::ByCity {
            city: city.to_string(),
        });

    let by_plan = PLAN_FALLBACK_TIERS
        .into_iter()
        .map(|tier| FetchStrategy::ByPlan { tier });

    nearby.into_iter().chain(by_city).chain(by_plan).collect()
}
