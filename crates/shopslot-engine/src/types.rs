use serde::{Deserialize, Serialize};
use shopslot_core::{Candidate, GeoPoint, PlanTier};

/// The hero section always holds at most one candidate.
pub const HERO_CAPACITY: usize = 1;

/// Named display sections, in layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Hero,
    Left,
    Right,
    Bottom,
}

impl Section {
    /// The section a tier is primarily placed in.
    #[must_use]
    pub fn home_of(tier: PlanTier) -> Self {
        match tier {
            PlanTier::Hero => Section::Hero,
            PlanTier::Left => Section::Left,
            PlanTier::Right => Section::Right,
            PlanTier::Basic => Section::Bottom,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Hero => write!(f, "hero"),
            Section::Left => write!(f, "left"),
            Section::Right => write!(f, "right"),
            Section::Bottom => write!(f, "bottom"),
        }
    }
}

/// Per-run section capacities. Unsigned, so a negative capacity cannot reach the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCapacities {
    pub left: usize,
    pub right: usize,
    pub bottom: usize,
}

impl Default for SlotCapacities {
    fn default() -> Self {
        Self {
            left: 3,
            right: 3,
            bottom: 30,
        }
    }
}

/// Everything a single allocation run needs besides the candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AllocationConfig {
    /// Origin for distance ranking. `None` leaves every distance undefined.
    pub reference: Option<GeoPoint>,
    pub capacities: SlotCapacities,
}

/// One filled slot, referring to a candidate by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAssignment {
    pub section: Section,
    /// Zero-based position within the section.
    pub position: usize,
    pub candidate_id: String,
}

/// The four section arrays handed to presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllocationResult {
    pub hero: Option<Candidate>,
    pub left: Vec<Candidate>,
    pub right: Vec<Candidate>,
    pub bottom: Vec<Candidate>,
}

impl AllocationResult {
    #[must_use]
    pub fn section(&self, section: Section) -> &[Candidate] {
        match section {
            Section::Hero => self.hero.as_slice(),
            Section::Left => &self.left,
            Section::Right => &self.right,
            Section::Bottom => &self.bottom,
        }
    }

    /// Flatten into slot assignments, hero first, then left, right, bottom.
    #[must_use]
    pub fn assignments(&self) -> Vec<SlotAssignment> {
        [Section::Hero, Section::Left, Section::Right, Section::Bottom]
            .into_iter()
            .flat_map(|section| {
                self.section(section)
                    .iter()
                    .enumerate()
                    .map(move |(position, c)| SlotAssignment {
                        section,
                        position,
                        candidate_id: c.id.clone(),
                    })
            })
            .collect()
    }

    /// Number of filled slots across all sections.
    #[must_use]
    pub fn filled(&self) -> usize {
        usize::from(self.hero.is_some()) + self.left.len() + self.right.len() + self.bottom.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filled() == 0
    }
}
