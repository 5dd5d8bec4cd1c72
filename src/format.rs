use chrono::NaiveDate;

pub const MISSING: &str = "-";

/// Formats an optional reading with a fixed number of decimals.
pub fn number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => MISSING.to_string(),
    }
}

pub fn day_label(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn code(value: Option<u8>) -> String {
    value.map_or_else(|| MISSING.to_string(), |c| c.to_string())
}

#[test]
fn test_number() {
    assert_eq!(number(Some(4.56), 1), "4.6");
    assert_eq!(number(Some(0.0), 2), "0.00");
    assert_eq!(number(Some(12.4), 0), "12");
    assert_eq!(number(None, 1), "-");
    assert_eq!(number(Some(f64::NAN), 1), "-");
}

#[test]
fn test_day_label() {
    let date = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
    assert_eq!(day_label(date), "03/01/2026");
}

#[test]
fn test_code() {
    assert_eq!(code(Some(61)), "61");
    assert_eq!(code(None), "-");
}
