//! Duration text such as `"1h30m"`, `"250ms"` or `"1.5s"`.

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parse a duration string.
///
/// The grammar is an optional sign followed by one or more `<number><unit>`
/// terms, where the number may carry a decimal fraction and the unit is one
/// of `ns`, `us` (`µs`, `μs`), `ms`, `s`, `m`, `h`. The bare string `"0"` is
/// zero. Negative non-zero durations are rejected since [`Duration`] is
/// unsigned.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let (negative, mut rest) = if let Some(stripped) = text.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = text.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, text)
    };

    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, after) = split_digits(rest);
        let (fraction, after) = match after.strip_prefix('.') {
            Some(stripped) => split_digits(stripped),
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        let scale = unit_nanos(unit)?;

        let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut nanos = whole.checked_mul(scale)?;
        if !fraction.is_empty() {
            // Digits past the 20th cannot change the result at nanosecond
            // resolution.
            let digits = &fraction[..fraction.len().min(20)];
            let numerator: u128 = digits.parse().ok()?;
            let denominator = 10u128.pow(u32::try_from(digits.len()).ok()?);
            nanos = nanos.checked_add(numerator * scale / denominator)?;
        }
        total = total.checked_add(nanos)?;
        rest = after;
    }

    if negative && total != 0 {
        return None;
    }
    let secs = u64::try_from(total / NANOS_PER_SEC).ok()?;
    let subsec = u32::try_from(total % NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, subsec))
}

fn split_digits(text: &str) -> (&str, &str) {
    let len = text.bytes().take_while(u8::is_ascii_digit).count();
    text.split_at(len)
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "\u{00b5}s" | "\u{03bc}s" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3_600 * NANOS_PER_SEC,
        _ => return None,
    };
    Some(nanos)
}
