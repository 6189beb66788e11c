//! Stage-string canonicalization and the recognized stage vocabulary.
//!
//! The `Stage` field is free text controlled by the shelter software, and
//! historical exports mix hyphen, en-dash, and em-dash in the same stage
//! name (`"Hold - SAFE Foster"` vs `"Hold – SAFE Foster"`). All matching
//! in this crate happens on the canonical form produced here, so a dash
//! variant can never change an animal's classification.

/// Fold a raw stage string to its canonical matching form: every Unicode
/// dash becomes `-`, whitespace runs collapse to a single space, dashes
/// are padded to exactly one space on each side, and the result is
/// lowercased.
pub fn canonicalize_stage(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for ch in raw.trim().chars() {
        let ch = fold_dash(ch);
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if ch == '-' {
            // "Hold-Foster", "Hold -Foster" and "Hold - Foster" all read
            // "hold - foster".
            if !out.is_empty() {
                out.push(' ');
            }
            out.push('-');
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        for lc in ch.to_lowercase() {
            out.push(lc);
        }
    }

    // A trailing dash leaves no room for padding; strip dangling space.
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

fn fold_dash(ch: char) -> char {
    match ch {
        // hyphen, non-breaking hyphen, figure dash, en dash, em dash,
        // horizontal bar, minus sign
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'
        | '\u{2212}' => '-',
        _ => ch,
    }
}

/// The closed vocabulary of stage codes the shelter software emits.
///
/// Parsing is total: anything outside the vocabulary maps to
/// `Unrecognized`, which classification surfaces as its own category
/// instead of folding into "Other".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageCode {
    /// Behavioral-trial placement through the SAFE program.
    SafeFoster,
    InFoster,
    FosterMedical,
    FosterBehavior,
    FosterSpace,
    FosterNeonate,
    FosterPendingPickup,
    HoldFoster,
    HoldSurgery,
    HoldBehavior,
    HoldMedical,
    HoldStray,
    HoldLegalNotice,
    HoldBiteQuarantine,
    Evaluate,
    Available,
    Adopted,
    HoldAdopted,
    HoldRto,
    HoldTransfer,
    Unrecognized,
}

impl StageCode {
    /// Parse a stage string (raw or canonical) into its code.
    pub fn parse(stage: &str) -> StageCode {
        use StageCode::*;
        match canonicalize_stage(stage).as_str() {
            "hold - safe foster" | "safe foster" => SafeFoster,
            "in foster" => InFoster,
            "foster - medical" => FosterMedical,
            "foster - behavior" => FosterBehavior,
            "foster - space" => FosterSpace,
            "foster - neonate" => FosterNeonate,
            "hold - foster pending pickup" | "pending foster pickup" => FosterPendingPickup,
            "hold - foster" => HoldFoster,
            "hold - surgery" => HoldSurgery,
            "hold - behavior" => HoldBehavior,
            "hold - medical" => HoldMedical,
            "hold - stray" => HoldStray,
            "hold - legal notice" => HoldLegalNotice,
            "hold - bite quarantine" => HoldBiteQuarantine,
            "evaluate" | "hold - evaluate" => Evaluate,
            "available" => Available,
            "adopted" => Adopted,
            "hold - adopted" => HoldAdopted,
            "hold - rto" => HoldRto,
            "hold - transfer" => HoldTransfer,
            _ => Unrecognized,
        }
    }
}
