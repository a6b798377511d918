/// Currency prefix for play-money amounts.
pub const MONEY_MONIKER: &str = "M$";

/// `M$1,235` style: rounded to whole units with thousands separators.
/// Non-finite amounts display as zero.
pub fn format_money(amount: f64, moniker: &str) -> String {
    let rounded = if amount.is_finite() { amount.round() } else { 0.0 };
    // Avoid "-0" for small negative amounts
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{}{}", moniker, group_thousands(rounded as i64))
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Probability as a whole percentage, e.g. `0.55` -> `55%`.
pub fn format_pct(prob: f64) -> String {
    // Half rounds away from zero, not to even
    format!("{}%", (prob * 100.0).round())
}

/// Plain number: integers without a fractional part, anything else in
/// shortest round-trip form.
pub fn format_raw(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0, MONEY_MONIKER), "M$0");
        assert_eq!(format_money(1234.6, MONEY_MONIKER), "M$1,235");
        assert_eq!(format_money(1_000_000.0, MONEY_MONIKER), "M$1,000,000");
        assert_eq!(format_money(-2500.0, MONEY_MONIKER), "M$-2,500");
        assert_eq!(format_money(-0.2, MONEY_MONIKER), "M$0");
        assert_eq!(format_money(f64::NAN, MONEY_MONIKER), "M$0");
        assert_eq!(format_money(999.0, "$"), "$999");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(0.55), "55%");
        assert_eq!(format_pct(0.05), "5%");
        assert_eq!(format_pct(1.0), "100%");
        assert_eq!(format_pct(0.125), "13%");
    }

    #[test]
    fn test_format_raw() {
        assert_eq!(format_raw(42.0), "42");
        assert_eq!(format_raw(-3.0), "-3");
        assert_eq!(format_raw(2.5), "2.5");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
