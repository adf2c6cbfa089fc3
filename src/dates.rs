use chrono::{DateTime, NaiveDate, NaiveDateTime};

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const MONTHS_LONG: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Portal dates arrive in three shapes: `d/m/yyyy` (also with `-`),
/// plain `yyyy-mm-dd`, or a full ISO timestamp. Anything else is treated
/// as "no date", never as an error.
pub fn parse_maybe_iso(s: &str) -> Option<NaiveDateTime> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }

    let parts: Vec<&str> = if t.contains('/') {
        t.split('/').collect()
    } else {
        t.split('-').collect()
    };
    if parts.len() == 3 && !t.contains('T') && !t.contains(':') {
        let [a, b, c] = [parts[0], parts[1], parts[2]];
        if all_digits(a) && all_digits(b) && all_digits(c) {
            // d/m/yyyy (1-2 digit day and month, 4 digit year)
            if a.len() <= 2 && b.len() <= 2 && c.len() == 4 {
                let (d, m, y) = (a.parse().ok()?, b.parse().ok()?, c.parse().ok()?);
                return NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(0, 0, 0));
            }
            // yyyy-mm-dd
            if a.len() == 4 && b.len() == 2 && c.len() == 2 {
                let (y, m, d) = (a.parse().ok()?, b.parse().ok()?, c.parse().ok()?);
                return NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(0, 0, 0));
            }
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    None
}

/// `yyyy-mm-dd`, suitable for a date input field. Empty when unparsable.
pub fn format_date_for_input(s: &str) -> String {
    match parse_maybe_iso(s) {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}

/// Render a date using the branding format tokens
/// (`yyyy`, `MMMM`, `MMM`, `MM`, `M`, `dd`, `d`). Longer tokens are
/// consumed first so `MMM` never splits into `MM` + `M`.
/// Unparsable input is echoed back untouched, like the portal did.
pub fn format_date_display(s: &str, format_hint: Option<&str>) -> String {
    let Some(d) = parse_maybe_iso(s) else {
        return s.trim().to_string();
    };
    let fmt = format_hint.unwrap_or("yyyy-MM-dd");

    use chrono::Datelike;
    let year = d.year().to_string();
    let month = d.month() as usize; // 1..=12
    let day = d.day();

    let mut out = String::with_capacity(fmt.len() + 8);
    let chars: Vec<char> = fmt.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let rest: String = chars[i..].iter().collect();
        if rest.starts_with("yyyy") {
            out.push_str(&year);
            i += 4;
        } else if rest.starts_with("MMMM") {
            out.push_str(MONTHS_LONG[month - 1]);
            i += 4;
        } else if rest.starts_with("MMM") {
            out.push_str(MONTHS_SHORT[month - 1]);
            i += 3;
        } else if rest.starts_with("MM") {
            out.push_str(&format!("{:02}", month));
            i += 2;
        } else if rest.starts_with('M') {
            out.push_str(&month.to_string());
            i += 1;
        } else if rest.starts_with("dd") {
            out.push_str(&format!("{:02}", day));
            i += 2;
        } else if rest.starts_with('d') {
            out.push_str(&day.to_string());
            i += 1;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}
