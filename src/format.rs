use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

const MONTHS_TR: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül", "Ekim",
    "Kasım", "Aralık",
];

/// Turkish lira in tr-TR style: `₺1.234,56`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}₺{},{:02}", sign, grouped, fraction)
}

/// `18 Ekim 2026 14:05`
pub fn format_date(dt: &NaiveDateTime) -> String {
    format!(
        "{} {} {} {:02}:{:02}",
        dt.day(),
        MONTHS_TR[dt.month0() as usize],
        dt.year(),
        dt.hour(),
        dt.minute()
    )
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` or a bare date. Offsets are
/// dropped, the wall-clock time is kept.
pub fn format_date_str(s: &str) -> Option<String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(format_date(&dt.naive_local()));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(format_date(&dt));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| format_date(&dt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "₺0,00");
        assert_eq!(format_currency(5.5), "₺5,50");
        assert_eq!(format_currency(999.999), "₺1.000,00");
        assert_eq!(format_currency(1234.56), "₺1.234,56");
        assert_eq!(format_currency(30000.0), "₺30.000,00");
        assert_eq!(format_currency(1234567.8), "₺1.234.567,80");
        assert_eq!(format_currency(-5.0), "-₺5,00");
        assert_eq!(format_currency(-0.001), "₺0,00");
    }

    #[test]
    fn test_format_date() {
        let dt = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(format_date(&dt), "18 Ekim 2026 14:05");

        let dt = NaiveDate::from_ymd_opt(2025, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(format_date(&dt), "1 Şubat 2025 09:00");
    }

    #[test]
    fn test_format_date_str() {
        assert_eq!(
            format_date_str("2026-10-18T14:05:33").as_deref(),
            Some("18 Ekim 2026 14:05")
        );
        assert_eq!(
            format_date_str("2026-10-18T14:05:33+03:00").as_deref(),
            Some("18 Ekim 2026 14:05")
        );
        assert_eq!(
            format_date_str("2026-12-31").as_deref(),
            Some("31 Aralık 2026 00:00")
        );
        assert_eq!(format_date_str("yesterday"), None);
    }
}
