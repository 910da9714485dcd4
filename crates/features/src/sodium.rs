use cleanlabel_model::{SodiumAnalysis, SodiumLevel};

/// Reference daily value for sodium (FDA), in milligrams.
pub const SODIUM_DAILY_VALUE_MG: u32 = 2300;

/// Upper bound (inclusive) of the low tier, per 100 g.
pub const LOW_SODIUM_MAX_MG: u32 = 140;

/// Upper bound (inclusive) of the moderate tier, per 100 g.
pub const MODERATE_SODIUM_MAX_MG: u32 = 600;

/// Classify a per-100 g sodium amount.
pub fn classify_sodium(milligrams: u32) -> SodiumLevel {
    if milligrams <= LOW_SODIUM_MAX_MG {
        SodiumLevel::Low
    } else if milligrams <= MODERATE_SODIUM_MAX_MG {
        SodiumLevel::Moderate
    } else {
        SodiumLevel::High
    }
}

/// Analyze sodium per 100 g. `None` means the product has no sodium data.
pub fn analyze_sodium(milligrams: Option<u32>) -> Option<SodiumAnalysis> {
    let milligrams = milligrams?;

    Some(SodiumAnalysis {
        milligrams,
        percent_dv: percent_of_daily_value(milligrams),
        level: classify_sodium(milligrams),
    })
}

/// Integer round-half-up of `mg / DV * 100`.
fn percent_of_daily_value(milligrams: u32) -> u32 {
    let dv = u64::from(SODIUM_DAILY_VALUE_MG);
    let percent = (u64::from(milligrams) * 100 + dv / 2) / dv;
    // at most u32::MAX / 23, always fits
    percent as u32
}
