//! Conversion between decimal-hour shift times and "HH:MM" clock strings.
//!
//! The schedule model carries times as decimal hours (8.5 means 08:30).
//! The portal's form inputs want zero-padded clock strings. Values above
//! 24 encode next-day finish times and fold back into 24h display.

/// Render a decimal-hour value as a zero-padded "HH:MM" string.
///
/// Zero, negative, and NaN inputs render as the empty string. This
/// conflates "midnight" with "absent": the schedule source never emits a
/// genuine 00:00 shift boundary, and an empty string leaves the portal's
/// own default in place, so the ambiguity is kept rather than fixed.
///
/// Hours of 24 or more wrap (25.25 -> "01:15") so overnight end times
/// stay displayable in a 24h field.
pub fn to_clock_string(time: f64) -> String {
    if !(time > 0.0) {
        return String::new();
    }

    let mut whole = time.floor() as u32;
    let mut minutes = ((time - time.floor()) * 60.0).round() as u32;
    if minutes == 60 {
        minutes = 0;
        whole += 1;
    }

    format!("{:02}:{:02}", whole % 24, minutes)
}

/// Parse an "H:MM" or "HH:MM" clock string back to decimal hours.
///
/// Hours are accepted in 0..=28 (values above 24 encode an overnight
/// finish on the next day), minutes in 0..=59. Anything else, including
/// malformed input, yields `None` rather than an error.
pub fn from_clock_string(s: &str) -> Option<f64> {
    let s = s.trim();
    let (hh, mm) = s.split_once(':')?;

    if hh.is_empty() || hh.len() > 2 || mm.len() != 2 {
        return None;
    }
    if !hh.chars().all(|c| c.is_ascii_digit()) || !mm.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: u32 = hh.parse().ok()?;
    let minutes: u32 = mm.parse().ok()?;
    if hours > 28 || minutes > 59 {
        return None;
    }

    Some(hours as f64 + minutes as f64 / 60.0)
}
