use serde_json::Value;

/// Thousand-unit amounts are shown on the 만 tier after dividing by this.
pub const THOUSAND_TO_MAN: f64 = 10.0;

/// Number of 만 units in one 억.
const MAN_PER_EOK: f64 = 10_000.0;

/// Convert a thousand-unit amount to whole won.
pub fn to_krw_from_thousand(value: Option<f64>) -> i64 {
    match value {
        Some(v) if v.is_finite() => (v.trunc() as i64).saturating_mul(1000),
        _ => 0,
    }
}

/// Format a thousand-unit amount as a Korean 억/만 display string.
///
/// `1700` becomes `"170만"`, `135000` becomes `"1억 3,500만"`. Missing,
/// zero or non-finite input yields `"0"`.
pub fn format_kor_money_from_thousand(value: Option<f64>) -> String {
    let thousands = match value {
        Some(v) if v.is_finite() && v != 0.0 => v.trunc(),
        _ => return "0".to_string(),
    };

    let man = thousands / THOUSAND_TO_MAN;

    if man >= MAN_PER_EOK {
        let eok = (man / MAN_PER_EOK).floor() as i64;
        let rest = (man % MAN_PER_EOK) as i64;
        if rest > 0 {
            format!("{}억 {}만", eok, group_thousands(rest))
        } else {
            format!("{}억", eok)
        }
    } else {
        format!("{}만", group_thousands(man as i64))
    }
}

/// Read a raw amount out of a JSON value. Integer literals stored as strings
/// are accepted; anything else is treated as missing.
pub fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<i64>().ok().map(|n| n as f64),
        _ => None,
    }
}

/// Insert comma separators every three digits.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}
