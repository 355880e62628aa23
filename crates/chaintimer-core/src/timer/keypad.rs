//! Duration entry.
//!
//! Raw keypad digits are read as `MMSS`, right-aligned: `5` is five seconds,
//! `130` is one minute thirty, `2500` is twenty-five minutes. The seconds pair
//! is added as-is, so `0099` is 99 seconds. Text entry also accepts `M:SS`.

use crate::error::ValidationError;

/// Default keypad width.
pub const DEFAULT_MAX_DIGITS: usize = 4;

/// Widest keypad whose largest entry (`9999999:99`) still fits in `u32`
/// seconds.
pub const MAX_KEYPAD_DIGITS: usize = 9;

/// Digit buffer behind a numeric keypad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keypad {
    digits: String,
    max_digits: usize,
}

impl Default for Keypad {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIGITS)
    }
}

impl Keypad {
    /// Width is clamped to `1..=MAX_KEYPAD_DIGITS`.
    pub fn new(max_digits: usize) -> Self {
        Self {
            digits: String::new(),
            max_digits: max_digits.clamp(1, MAX_KEYPAD_DIGITS),
        }
    }

    pub fn max_digits(&self) -> usize {
        self.max_digits
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Append a digit. Non-digits and presses past the width are ignored.
    pub fn press(&mut self, key: char) -> bool {
        if !key.is_ascii_digit() || self.digits.len() >= self.max_digits {
            return false;
        }
        self.digits.push(key);
        true
    }

    pub fn backspace(&mut self) {
        self.digits.pop();
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    /// Current buffer as seconds.
    pub fn seconds(&self) -> u32 {
        mmss_to_secs(&self.digits)
    }

    /// Current buffer as `MM:SS`, the way a keypad display echoes it.
    pub fn preview(&self) -> String {
        let padded = format!("{:0>4}", self.digits);
        let (mm, ss) = padded.split_at(padded.len() - 2);
        format!("{mm}:{ss}")
    }

    /// Consume the buffer. Returns `None` when it holds zero seconds.
    pub fn take(&mut self) -> Option<u32> {
        let secs = self.seconds();
        self.clear();
        (secs > 0).then_some(secs)
    }
}

fn mmss_to_secs(digits: &str) -> u32 {
    let split = digits.len().saturating_sub(2);
    let (mm, ss) = digits.split_at(split);
    let minutes: u32 = mm.parse().unwrap_or(0);
    let seconds: u32 = ss.parse().unwrap_or(0);
    minutes.saturating_mul(60).saturating_add(seconds)
}

/// Parse a typed duration into positive seconds.
///
/// Accepts keypad digits (`MMSS`, at most `max_digits`) or `M:SS`.
pub fn parse_duration(raw: &str, max_digits: usize) -> Result<u32, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::EmptyDuration);
    }

    let secs = if let Some((min, sec)) = raw.split_once(':') {
        let minutes = parse_field(min, raw)?;
        let seconds = parse_field(sec, raw)?;
        minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .ok_or_else(|| ValidationError::MalformedDuration(raw.to_string()))?
    } else {
        if !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::MalformedDuration(raw.to_string()));
        }
        let mut keypad = Keypad::new(max_digits);
        if raw.len() > keypad.max_digits() {
            return Err(ValidationError::TooManyDigits {
                raw: raw.to_string(),
                max_digits: keypad.max_digits(),
            });
        }
        raw.chars().for_each(|c| {
            keypad.press(c);
        });
        keypad.seconds()
    };

    if secs == 0 {
        return Err(ValidationError::ZeroDuration);
    }
    Ok(secs)
}

fn parse_field(field: &str, raw: &str) -> Result<u32, ValidationError> {
    if field.is_empty() {
        return Ok(0);
    }
    if !field.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::MalformedDuration(raw.to_string()));
    }
    field
        .parse()
        .map_err(|_| ValidationError::MalformedDuration(raw.to_string()))
}

/// Render seconds as `MM:SS`. Negative values show as `00:00`.
pub fn format_clock(total_secs: i64) -> String {
    let total = total_secs.max(0);
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_read_as_mmss() {
        assert_eq!(parse_duration("5", 4), Ok(5));
        assert_eq!(parse_duration("130", 4), Ok(90));
        assert_eq!(parse_duration("2500", 4), Ok(1500));
        assert_eq!(parse_duration("0099", 4), Ok(99));
    }

    #[test]
    fn colon_form_sums_minutes_and_seconds() {
        assert_eq!(parse_duration("1:30", 4), Ok(90));
        assert_eq!(parse_duration("90:00", 4), Ok(5400));
        assert_eq!(parse_duration(":45", 4), Ok(45));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse_duration("  ", 4),
            Err(ValidationError::EmptyDuration)
        );
        assert_eq!(parse_duration("0000", 4), Err(ValidationError::ZeroDuration));
        assert!(matches!(
            parse_duration("12345", 4),
            Err(ValidationError::TooManyDigits { max_digits: 4, .. })
        ));
        assert!(matches!(
            parse_duration("1m", 4),
            Err(ValidationError::MalformedDuration(_))
        ));
        assert!(matches!(
            parse_duration("-5", 4),
            Err(ValidationError::MalformedDuration(_))
        ));
    }

    #[test]
    fn wide_keypad_is_clamped_to_u32_range() {
        assert!(matches!(
            parse_duration("10000000000099", 14),
            Err(ValidationError::TooManyDigits { max_digits: MAX_KEYPAD_DIGITS, .. })
        ));
        assert_eq!(parse_duration("999999999", 14), Ok(9_999_999 * 60 + 99));

        let mut pad = Keypad::new(usize::MAX);
        for key in "9".repeat(20).chars() {
            pad.press(key);
        }
        assert_eq!(pad.digits().len(), MAX_KEYPAD_DIGITS);
        assert_eq!(pad.seconds(), 9_999_999 * 60 + 99);
    }

    #[test]
    fn keypad_caps_width_and_takes_value() {
        let mut pad = Keypad::new(4);
        for key in "123456".chars() {
            pad.press(key);
        }
        assert_eq!(pad.digits(), "1234");
        assert_eq!(pad.preview(), "12:34");
        assert!(!pad.press('x'));

        pad.backspace();
        assert_eq!(pad.preview(), "01:23");
        assert_eq!(pad.take(), Some(83));
        assert_eq!(pad.digits(), "");
        assert_eq!(pad.take(), None);
    }

    #[test]
    fn format_clock_clamps_negative() {
        assert_eq!(format_clock(-1), "00:00");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(6000), "100:00");
    }
}
