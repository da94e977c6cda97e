use qip_incentive::incentive::{OrgType, ReportingMonth};

pub(crate) fn parse_month(raw: &str) -> Result<ReportingMonth, String> {
    ReportingMonth::parse(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM ({err})"))
}

pub(crate) fn parse_org_type(raw: &str) -> Result<OrgType, String> {
    OrgType::parse(raw)
        .ok_or_else(|| format!("unknown TYPE '{raw}' (expected TYPE-1, TYPE-2 or TYPE-3)"))
}

/// Whole currency units with thousands separators.
pub(crate) fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
