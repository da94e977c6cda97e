use std::collections::HashMap;
use std::sync::OnceLock;

static HEADER_ALIASES: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

/// Lowercase snake form of a header cell, with export artefacts removed.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}', '\u{a0}'], " ");
    let mut normalized = String::with_capacity(cleaned.len());
    for ch in cleaned.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            normalized.push(ch.to_ascii_lowercase());
        } else if !normalized.ends_with('_') {
            normalized.push('_');
        }
    }
    normalized.trim_matches('_').to_string()
}

/// Canonical column name for a raw header; unknown headers pass through normalized.
pub(crate) fn canonical_header(value: &str) -> String {
    let normalized = normalize_header(value);
    header_aliases()
        .get(normalized.as_str())
        .map(|canonical| canonical.to_string())
        .unwrap_or(normalized)
}

fn header_aliases() -> &'static HashMap<&'static str, &'static str> {
    HEADER_ALIASES.get_or_init(|| {
        const ALIASES: &[(&str, &str)] = &[
            // Identity
            ("employee_number", "employee_no"),
            ("employee_id", "employee_no"),
            ("emp_no", "employee_no"),
            ("id_no", "employee_no"),
            ("name", "full_name"),
            ("employee_name", "full_name"),
            ("role_type_std", "type"),
            ("org_type", "type"),
            // Position levels
            ("position", "position_1st"),
            ("qip_position_1st_name", "position_1st"),
            ("qip_position_2nd_name", "position_2nd"),
            ("qip_position_3rd_name", "position_3rd"),
            ("building", "area"),
            ("manager", "manager_no"),
            ("manager_id", "manager_no"),
            ("boss_id", "manager_no"),
            // Attendance
            ("date", "work_date"),
            ("work_day", "work_date"),
            ("reason", "reason_code"),
            ("reason_description", "reason_code"),
            // Inspections
            ("inspector_no", "employee_no"),
            ("inspection_day", "inspection_date"),
            ("inspected_on", "inspection_date"),
            ("pass_quantity", "pass_qty"),
            ("validation_qty", "total_qty"),
            ("total_quantity", "total_qty"),
        ];
        ALIASES.iter().copied().collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_normalize_to_snake_case() {
        assert_eq!(normalize_header("\u{feff}Employee No"), "employee_no");
        assert_eq!(normalize_header(" Position - 1st "), "position_1st");
        assert_eq!(normalize_header("TOTAL__QTY"), "total_qty");
    }

    #[test]
    fn aliases_map_to_canonical_columns() {
        assert_eq!(canonical_header("Employee Number"), "employee_no");
        assert_eq!(canonical_header("QIP POSITION 2ND  NAME"), "position_2nd");
        assert_eq!(canonical_header("Validation Qty"), "total_qty");
        assert_eq!(canonical_header("Shift"), "shift");
    }
}
