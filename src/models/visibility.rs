//! Visibility tiers.
//!
//! A tier names the audience a shift is exposed to. Tiers have a natural
//! narrow-to-wide order, but the subset a pharmacy may use, and its order,
//! is supplied per pharmacy (see [`crate::scheduling::TierSequence`]).

use serde::{Deserialize, Serialize};

/// An audience level a shift can be exposed to.
///
/// # Example
///
/// ```
/// use shift_engine::models::VisibilityTier;
///
/// assert!(VisibilityTier::FullPartTime < VisibilityTier::Platform);
/// assert_eq!(VisibilityTier::OwnerChain.to_string(), "OWNER_CHAIN");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisibilityTier {
    /// The pharmacy's own full-time and part-time staff.
    FullPartTime,
    /// Favourite locums and casuals of the pharmacy.
    LocumCasual,
    /// Staff across the owner's chain of pharmacies.
    OwnerChain,
    /// Staff across the claiming organization.
    OrgChain,
    /// Every worker on the platform.
    Platform,
}

impl VisibilityTier {
    /// All tiers, narrowest first.
    pub const ALL: [VisibilityTier; 5] = [
        VisibilityTier::FullPartTime,
        VisibilityTier::LocumCasual,
        VisibilityTier::OwnerChain,
        VisibilityTier::OrgChain,
        VisibilityTier::Platform,
    ];

    /// Returns the wire name of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            VisibilityTier::FullPartTime => "FULL_PART_TIME",
            VisibilityTier::LocumCasual => "LOCUM_CASUAL",
            VisibilityTier::OwnerChain => "OWNER_CHAIN",
            VisibilityTier::OrgChain => "ORG_CHAIN",
            VisibilityTier::Platform => "PLATFORM",
        }
    }
}

impl std::fmt::Display for VisibilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_serialization() {
        assert_eq!(
            serde_json::to_string(&VisibilityTier::FullPartTime).unwrap(),
            "\"FULL_PART_TIME\""
        );
        assert_eq!(
            serde_json::from_str::<VisibilityTier>("\"ORG_CHAIN\"").unwrap(),
            VisibilityTier::OrgChain
        );
    }

    #[test]
    fn test_display_matches_wire_name() {
        for tier in VisibilityTier::ALL {
            let wire = serde_json::to_string(&tier).unwrap();
            assert_eq!(wire, format!("\"{}\"", tier));
        }
    }

    #[test]
    fn test_natural_order_is_narrow_to_wide() {
        let mut sorted = VisibilityTier::ALL;
        sorted.sort();
        assert_eq!(sorted, VisibilityTier::ALL);
    }
}
