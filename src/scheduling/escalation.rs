//! Visibility escalation.
//!
//! A shift is exposed to one audience tier at a time and only ever moves to
//! wider tiers. The tiers a pharmacy may use, and their order, come from the
//! pharmacy directory as a [`TierSequence`]; nothing here assumes the five
//! tiers of [`VisibilityTier`] are all present or in their natural order.
//!
//! Every state change to `current_visibility` and `escalation_schedule` goes
//! through a named transition in this module:
//!
//! | Transition | Caller |
//! |---|---|
//! | [`initial_tier`] | shift creation |
//! | [`escalate`] | interactive escalation and the due-schedule sweep |
//! | [`retarget`] | shift edits that change the audience |
//! | [`due_tier`] | the due-schedule sweep (read-only) |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{EscalationSchedule, Pharmacy, Shift, VisibilityTier};

/// The ordered tiers a pharmacy may expose shifts to.
///
/// # Example
///
/// ```
/// use shift_engine::models::VisibilityTier;
/// use shift_engine::scheduling::TierSequence;
///
/// let tiers = TierSequence::new(vec![
///     VisibilityTier::FullPartTime,
///     VisibilityTier::LocumCasual,
///     VisibilityTier::Platform,
/// ])
/// .unwrap();
///
/// assert!(tiers.is_after(VisibilityTier::Platform, VisibilityTier::LocumCasual));
/// assert!(!tiers.contains(VisibilityTier::OwnerChain));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<VisibilityTier>", into = "Vec<VisibilityTier>")]
pub struct TierSequence {
    tiers: Vec<VisibilityTier>,
}

impl TierSequence {
    /// Creates a sequence, rejecting empty lists and repeated tiers.
    pub fn new(tiers: Vec<VisibilityTier>) -> EngineResult<Self> {
        if tiers.is_empty() {
            return Err(EngineError::validation(
                "allowed_escalation_levels",
                "at least one tier is required",
            ));
        }
        for (i, tier) in tiers.iter().enumerate() {
            if tiers[..i].contains(tier) {
                return Err(EngineError::validation(
                    "allowed_escalation_levels",
                    format!("tier {} appears more than once", tier),
                ));
            }
        }
        Ok(Self { tiers })
    }

    /// Derives the sequence for a pharmacy.
    ///
    /// An explicit `allowed_escalation_levels` list wins. Otherwise the
    /// sequence is built from the capability flags: own staff, then locums,
    /// then the owner's chain if `has_chain`, then the organization if
    /// `claimed`, then the whole platform.
    pub fn for_pharmacy(pharmacy: &Pharmacy) -> EngineResult<Self> {
        if let Some(levels) = &pharmacy.allowed_escalation_levels {
            return Self::new(levels.clone());
        }

        let mut tiers = vec![VisibilityTier::FullPartTime, VisibilityTier::LocumCasual];
        if pharmacy.has_chain {
            tiers.push(VisibilityTier::OwnerChain);
        }
        if pharmacy.claimed {
            tiers.push(VisibilityTier::OrgChain);
        }
        tiers.push(VisibilityTier::Platform);
        Self::new(tiers)
    }

    /// Returns the tiers in order.
    pub fn tiers(&self) -> &[VisibilityTier] {
        &self.tiers
    }

    /// Returns the first (narrowest) tier.
    pub fn first(&self) -> VisibilityTier {
        self.tiers[0]
    }

    /// Returns the position of `tier`, if allowed.
    pub fn position(&self, tier: VisibilityTier) -> Option<usize> {
        self.tiers.iter().position(|t| *t == tier)
    }

    /// Returns true if `tier` is allowed.
    pub fn contains(&self, tier: VisibilityTier) -> bool {
        self.position(tier).is_some()
    }

    /// Returns true if both tiers are allowed and `later` comes strictly after `earlier`.
    pub fn is_after(&self, later: VisibilityTier, earlier: VisibilityTier) -> bool {
        match (self.position(later), self.position(earlier)) {
            (Some(l), Some(e)) => l > e,
            _ => false,
        }
    }

    /// Returns the allowed tiers strictly after `tier`.
    pub fn after(&self, tier: VisibilityTier) -> &[VisibilityTier] {
        match self.position(tier) {
            Some(p) => &self.tiers[p + 1..],
            None => &[],
        }
    }

    /// Returns true if a shift at `current` is visible to a worker whose
    /// narrowest audience is `audience`.
    ///
    /// Positions in the sequence decide when both tiers are present. A worker
    /// whose tier the pharmacy does not use falls back to the natural tier
    /// order, so a `PLATFORM` worker still only sees `PLATFORM` shifts.
    pub fn exposes(&self, current: VisibilityTier, audience: VisibilityTier) -> bool {
        match (self.position(current), self.position(audience)) {
            (Some(c), Some(a)) => a <= c,
            _ => audience <= current,
        }
    }

    fn require(&self, tier: VisibilityTier, field: &str) -> EngineResult<usize> {
        self.position(tier).ok_or_else(|| {
            EngineError::validation(
                field,
                format!("tier {} is not allowed for this pharmacy", tier),
            )
        })
    }
}

impl TryFrom<Vec<VisibilityTier>> for TierSequence {
    type Error = EngineError;

    fn try_from(tiers: Vec<VisibilityTier>) -> EngineResult<Self> {
        Self::new(tiers)
    }
}

impl From<TierSequence> for Vec<VisibilityTier> {
    fn from(sequence: TierSequence) -> Self {
        sequence.tiers
    }
}

/// Chooses the tier a new shift starts at.
///
/// Defaults to the first allowed tier. A caller may pin a later starting tier
/// (booking flows start at `LOCUM_CASUAL`), which must be allowed.
pub fn initial_tier(
    tiers: &TierSequence,
    requested: Option<VisibilityTier>,
) -> EngineResult<VisibilityTier> {
    match requested {
        None => Ok(tiers.first()),
        Some(tier) => {
            tiers.require(tier, "visibility")?;
            Ok(tier)
        }
    }
}

/// Checks that every scheduled tier is allowed and strictly after `current`.
pub fn validate_schedule(
    tiers: &TierSequence,
    current: VisibilityTier,
    schedule: &EscalationSchedule,
) -> EngineResult<()> {
    let current_pos = tiers.require(current, "visibility")?;
    for tier in schedule.keys() {
        let pos = tiers.require(*tier, "escalate_to")?;
        if pos <= current_pos {
            return Err(EngineError::validation(
                "escalate_to",
                format!(
                    "scheduled tier {} must come after current tier {}",
                    tier, current
                ),
            ));
        }
    }
    Ok(())
}

/// The result of a successful escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escalation {
    /// The tier before the transition.
    pub from: VisibilityTier,
    /// The tier after the transition.
    pub to: VisibilityTier,
}

/// Moves a shift to a wider tier.
///
/// `target` must be allowed and strictly after the shift's current tier;
/// anything else (including the current tier itself) is a validation error
/// and leaves the shift untouched. Schedule entries that are no longer ahead
/// of the new tier are dropped.
///
/// # Example
///
/// ```
/// # use shift_engine::models::{EmploymentType, Role, Shift, VisibilityTier};
/// # use shift_engine::scheduling::{escalate, TierSequence};
/// # use chrono::Utc;
/// # use uuid::Uuid;
/// # let mut shift = Shift {
/// #     id: Uuid::new_v4(),
/// #     pharmacy_id: "ph-1".to_string(),
/// #     role_needed: Role::Pharmacist,
/// #     employment_type: EmploymentType::Locum,
/// #     slots: vec![],
/// #     current_visibility: VisibilityTier::LocumCasual,
/// #     escalation_schedule: Default::default(),
/// #     single_user_only: false,
/// #     created_at: Utc::now(),
/// #     updated_at: Utc::now(),
/// # };
/// let tiers = TierSequence::new(vec![
///     VisibilityTier::FullPartTime,
///     VisibilityTier::LocumCasual,
///     VisibilityTier::Platform,
/// ])
/// .unwrap();
///
/// assert!(escalate(&mut shift, &tiers, VisibilityTier::FullPartTime).is_err());
/// assert!(escalate(&mut shift, &tiers, VisibilityTier::Platform).is_ok());
/// assert_eq!(shift.current_visibility, VisibilityTier::Platform);
/// ```
pub fn escalate(
    shift: &mut Shift,
    tiers: &TierSequence,
    target: VisibilityTier,
) -> EngineResult<Escalation> {
    let current_pos = tiers.require(shift.current_visibility, "current_visibility")?;
    let target_pos = tiers.require(target, "target_visibility")?;

    if target_pos <= current_pos {
        return Err(EngineError::validation(
            "target_visibility",
            format!(
                "cannot escalate from {} to {}: target must be a later tier",
                shift.current_visibility, target
            ),
        ));
    }

    let from = shift.current_visibility;
    shift.current_visibility = target;
    prune_schedule(&mut shift.escalation_schedule, tiers, target);

    info!(
        shift_id = %shift.id,
        from = %from,
        to = %target,
        "Shift escalated"
    );

    Ok(Escalation { from, to: target })
}

/// Re-targets a shift's audience during an edit.
///
/// The new tier must be allowed and not earlier than the current one. The
/// schedule is replaced: with `schedule` when given, otherwise cleared.
pub fn retarget(
    shift: &mut Shift,
    tiers: &TierSequence,
    tier: VisibilityTier,
    schedule: Option<EscalationSchedule>,
) -> EngineResult<()> {
    let current_pos = tiers.require(shift.current_visibility, "current_visibility")?;
    let new_pos = tiers.require(tier, "visibility")?;

    if new_pos < current_pos {
        return Err(EngineError::validation(
            "visibility",
            format!(
                "cannot narrow visibility from {} to {}",
                shift.current_visibility, tier
            ),
        ));
    }

    let schedule = schedule.unwrap_or_default();
    validate_schedule(tiers, tier, &schedule)?;

    shift.current_visibility = tier;
    shift.escalation_schedule = schedule;
    Ok(())
}

/// Returns the tier a shift's schedule says it should be at by `now`.
///
/// Picks the furthest allowed tier after the current one whose timestamp has
/// passed. Returns `None` when nothing is due, which makes re-running the
/// sweep on an already-escalated shift a no-op.
pub fn due_tier(shift: &Shift, tiers: &TierSequence, now: DateTime<Utc>) -> Option<VisibilityTier> {
    tiers
        .after(shift.current_visibility)
        .iter()
        .rev()
        .copied()
        .find(|tier| {
            matches!(
                shift.escalation_schedule.get(tier),
                Some(Some(at)) if *at <= now
            )
        })
}

fn prune_schedule(schedule: &mut EscalationSchedule, tiers: &TierSequence, current: VisibilityTier) {
    schedule.retain(|tier, _| tiers.is_after(*tier, current));
}
