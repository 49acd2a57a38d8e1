/// Parse a compact duration such as `45s`, `10m`, `1h30m` or `2d`.
///
/// A bare number is read as seconds. Each segment must be non-zero and a bare
/// number may not follow a unit segment.
pub fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let compact = raw
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>();
    if compact.is_empty() {
        return None;
    }

    let mut total = 0_u64;
    let mut digits = String::new();
    let mut saw_unit = false;

    for ch in compact.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        let unit = unit_seconds(ch)?;
        total = total.checked_add(segment(&digits)?.checked_mul(unit)?)?;
        digits.clear();
        saw_unit = true;
    }

    if !digits.is_empty() {
        if saw_unit {
            return None;
        }
        total = segment(&digits)?;
    }

    (total > 0).then_some(total)
}

fn segment(digits: &str) -> Option<u64> {
    digits.parse::<u64>().ok().filter(|value| *value > 0)
}

fn unit_seconds(unit: char) -> Option<u64> {
    match unit.to_ascii_lowercase() {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(60 * 60),
        'd' => Some(60 * 60 * 24),
        _ => None,
    }
}

/// Render seconds as at most two of the largest non-zero units, e.g. `1d 2h`.
pub fn format_compact_duration(total_seconds: u64) -> String {
    const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

    let parts = UNITS
        .iter()
        .scan(total_seconds, |remaining, (size, label)| {
            let amount = *remaining / size;
            *remaining %= size;
            Some((amount, *label))
        })
        .filter(|(amount, _)| *amount > 0)
        .take(2)
        .map(|(amount, label)| format!("{amount}{label}"))
        .collect::<Vec<_>>();

    if parts.is_empty() {
        "0s".to_owned()
    } else {
        parts.join(" ")
    }
}
