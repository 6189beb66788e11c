//! Per-animal classification.
//!
//! One pure function from (stage string, foster-roster membership) to
//! exactly one category, shared by every front end. Precedence is strict:
//! the first matching rule wins and the order below is load-bearing.

use crate::stage::StageCode;

/// Operational category of an animal. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Placed through the SAFE behavioral-trial program.
    BehaviorProgram,
    InFoster,
    PendingFosterPickup,
    NeedsFosterNow,
    MightNeedFosterSoon,
    Other,
    /// Stage string outside the recognized vocabulary. Kept distinct from
    /// `Other` so data-quality problems show up on the dashboard instead
    /// of disappearing into the catch-all.
    Unrecognized,
}

impl Category {
    /// Display label used in dashboard tables and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Category::BehaviorProgram => "In Behavior Program",
            Category::InFoster => "In Foster",
            Category::PendingFosterPickup => "Pending Foster Pickup",
            Category::NeedsFosterNow => "Needs Foster Now",
            Category::MightNeedFosterSoon => "Might Need Foster Soon",
            Category::Other => "Other",
            Category::Unrecognized => "Unrecognized Stage",
        }
    }

    /// Categories for which caregiver columns are populated from the
    /// foster join.
    pub fn is_foster(&self) -> bool {
        matches!(
            self,
            Category::BehaviorProgram | Category::InFoster | Category::PendingFosterPickup
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify one animal.
///
/// `in_foster_roster` is membership in the FosterCurrent join. Rule order:
///
/// 1. SAFE-trial stage, with or without a roster row
/// 2. roster membership - an active assignment outranks whatever the
///    stage field says, including a stale `Hold - Foster`
/// 3. explicit in-foster stages
/// 4. pending-pickup stages
/// 5. bare `Hold - Foster` with no assignment yet
/// 6. holds that historically convert to foster needs
/// 7. remaining recognized stages
/// 8. anything else surfaces as `Unrecognized`
pub fn classify(stage: &str, in_foster_roster: bool) -> Category {
    use StageCode::*;

    let code = StageCode::parse(stage);

    if code == SafeFoster {
        return Category::BehaviorProgram;
    }
    if in_foster_roster {
        return Category::InFoster;
    }

    match code {
        SafeFoster => Category::BehaviorProgram,
        InFoster | FosterMedical | FosterBehavior | FosterSpace | FosterNeonate => {
            Category::InFoster
        }
        FosterPendingPickup => Category::PendingFosterPickup,
        HoldFoster => Category::NeedsFosterNow,
        HoldSurgery | HoldBehavior | HoldMedical | HoldStray | HoldLegalNotice
        | HoldBiteQuarantine | Evaluate => Category::MightNeedFosterSoon,
        Available | Adopted | HoldAdopted | HoldRto | HoldTransfer => Category::Other,
        Unrecognized => Category::Unrecognized,
    }
}
