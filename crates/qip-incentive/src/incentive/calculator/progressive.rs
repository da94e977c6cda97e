use super::PriorResult;

/// Continuous qualifying months including this one; any failing month resets to zero.
pub(crate) fn continuous_months(eligible: bool, prior: Option<&PriorResult>) -> u32 {
    if !eligible {
        return 0;
    }
    prior.map_or(0, |prior| prior.continuous_months) + 1
}

/// Tier index and amount for `months` qualifying months; the last tier holds.
pub(crate) fn tier(table: &[u64], months: u32) -> Option<(usize, u64)> {
    if months == 0 || table.is_empty() {
        return None;
    }
    let index = (months as usize).min(table.len()) - 1;
    table.get(index).map(|amount| (index, *amount))
}
