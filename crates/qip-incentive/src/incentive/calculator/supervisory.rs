/// Mean of the amounts actually paid (> 0); `None` when nobody was paid.
pub(crate) fn average_paid(amounts: &[u64]) -> Option<f64> {
    let paid: Vec<u64> = amounts.iter().copied().filter(|amount| *amount > 0).collect();
    if paid.is_empty() {
        return None;
    }
    let total: u64 = paid.iter().sum();
    Some(total as f64 / paid.len() as f64)
}

/// `average × multiplier`, rounded half away from zero to whole units.
pub(crate) fn scaled(average: f64, multiplier: f64) -> u64 {
    (average * multiplier).round().max(0.0) as u64
}
