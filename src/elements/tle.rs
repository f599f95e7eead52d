//! Two-line element parsing.
//!
//! Column positions follow the classic NORAD layout; every line is exactly
//! 69 characters with a modulo-10 checksum in the last column.

use std::ops::Range;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use super::error::ElementSetError;
use super::types::{Classification, OrbitalElementSet};

pub const LINE_LENGTH: usize = 69;

/// Parse and validate one element set from its two data lines.
pub fn parse(
    name: Option<&str>,
    line1: &str,
    line2: &str,
) -> Result<OrbitalElementSet, ElementSetError> {
    let l1 = Line::new(1, line1)?;
    let l2 = Line::new(2, line2)?;

    let norad_id: u32 = l1.parse(2..7, "catalog number")?;
    let line2_id: u32 = l2.parse(2..7, "catalog number")?;
    if norad_id != line2_id {
        return Err(ElementSetError::malformed(
            2,
            format!("catalog number {line2_id} does not match line 1 ({norad_id})"),
        ));
    }

    let classification = match l1.byte(7) {
        b'U' | b' ' => Classification::Unclassified,
        b'C' => Classification::Classified,
        b'S' => Classification::Secret,
        other => {
            return Err(ElementSetError::malformed(
                1,
                format!("unknown classification '{}'", other as char),
            ))
        }
    };

    let epoch_year: i32 = l1.parse(18..20, "epoch year")?;
    let epoch_day = l1.parse_finite(20..32, "epoch day")?;
    let epoch = epoch_from_year_day(epoch_year, epoch_day)
        .ok_or_else(|| ElementSetError::malformed(1, format!("invalid epoch day {epoch_day}")))?;

    let eccentricity = l2.implied_decimal(26..33, "eccentricity")?;
    let mean_motion = l2.parse_finite(52..63, "mean motion")?;
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(ElementSetError::malformed(
            2,
            format!("eccentricity {eccentricity} outside [0, 1)"),
        ));
    }
    if mean_motion <= 0.0 {
        return Err(ElementSetError::malformed(
            2,
            format!("mean motion {mean_motion} must be positive"),
        ));
    }

    Ok(OrbitalElementSet {
        name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        norad_id,
        classification,
        international_designator: l1.field(9..17).trim().to_string(),
        epoch,
        mean_motion_dot: l1.parse_finite(33..43, "first derivative of mean motion")?,
        mean_motion_ddot: l1.exponent_field(44..52, "second derivative of mean motion")?,
        drag_term: l1.exponent_field(53..61, "drag term")?,
        ephemeris_type: l1.parse_or_zero(62..63, "ephemeris type")?,
        element_set_number: l1.parse_or_zero(64..68, "element set number")?,
        inclination_deg: l2.parse_finite(8..16, "inclination")?,
        right_ascension_deg: l2.parse_finite(17..25, "right ascension")?,
        eccentricity,
        argument_of_perigee_deg: l2.parse_finite(34..42, "argument of perigee")?,
        mean_anomaly_deg: l2.parse_finite(43..51, "mean anomaly")?,
        mean_motion,
        revolution_number: l2.parse_or_zero(63..68, "revolution number")?,
    })
}

/// Sum of all digits in the first 68 columns, minus signs counting as one,
/// modulo 10.
pub fn checksum(line: &str) -> u8 {
    let sum: u32 = line
        .bytes()
        .take(LINE_LENGTH - 1)
        .map(|b| match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'-' => 1,
            _ => 0,
        })
        .sum();
    (sum % 10) as u8
}

/// Convert a two-digit year and fractional day-of-year (1.0 = Jan 1 00:00)
/// into a UTC instant, rounded to the microsecond.
pub fn epoch_from_year_day(two_digit_year: i32, day: f64) -> Option<DateTime<Utc>> {
    let year = if two_digit_year < 57 {
        2000 + two_digit_year
    } else {
        1900 + two_digit_year
    };
    let days_in_year = if NaiveDate::from_ymd_opt(year, 12, 31)?.ordinal0() == 365 {
        366.0
    } else {
        365.0
    };
    if !(1.0..days_in_year + 1.0).contains(&day) {
        return None;
    }
    let start = NaiveDate::from_yo_opt(year, 1)?.and_hms_opt(0, 0, 0)?.and_utc();
    let micros = ((day - 1.0) * 86_400_000_000.0).round() as i64;
    Some(start + Duration::microseconds(micros))
}

struct Line<'a> {
    number: u8,
    text: &'a str,
}

impl<'a> Line<'a> {
    fn new(number: u8, raw: &'a str) -> Result<Self, ElementSetError> {
        let text = raw.trim_end();
        if !text.is_ascii() {
            return Err(ElementSetError::malformed(number, "non-ASCII characters"));
        }
        if text.len() != LINE_LENGTH {
            return Err(ElementSetError::malformed(
                number,
                format!("expected {LINE_LENGTH} columns, got {}", text.len()),
            ));
        }
        if text.as_bytes()[0] != b'0' + number {
            return Err(ElementSetError::malformed(
                number,
                format!("line number '{}' does not match", text.as_bytes()[0] as char),
            ));
        }
        let expected = match text.as_bytes()[LINE_LENGTH - 1] {
            d @ b'0'..=b'9' => d - b'0',
            other => {
                return Err(ElementSetError::malformed(
                    number,
                    format!("missing checksum digit, found '{}'", other as char),
                ))
            }
        };
        let actual = checksum(text);
        if actual != expected {
            return Err(ElementSetError::malformed(
                number,
                format!("checksum mismatch: computed {actual}, line says {expected}"),
            ));
        }
        Ok(Self { number, text })
    }

    fn byte(&self, index: usize) -> u8 {
        self.text.as_bytes()[index]
    }

    fn field(&self, columns: Range<usize>) -> &'a str {
        &self.text[columns]
    }

    fn parse<T: FromStr>(&self, columns: Range<usize>, what: &str) -> Result<T, ElementSetError> {
        let raw = self.field(columns).trim();
        raw.parse().map_err(|_| {
            ElementSetError::malformed(self.number, format!("{what}: '{raw}' is not numeric"))
        })
    }

    /// `f64::from_str` accepts `nan` and `inf`; element fields may not.
    fn parse_finite(&self, columns: Range<usize>, what: &str) -> Result<f64, ElementSetError> {
        let value: f64 = self.parse(columns.clone(), what)?;
        if value.is_finite() {
            Ok(value)
        } else {
            let raw = self.field(columns).trim();
            Err(ElementSetError::malformed(
                self.number,
                format!("{what}: '{raw}' is not finite"),
            ))
        }
    }

    fn parse_or_zero<T: FromStr + Default>(
        &self,
        columns: Range<usize>,
        what: &str,
    ) -> Result<T, ElementSetError> {
        if self.field(columns.clone()).trim().is_empty() {
            Ok(T::default())
        } else {
            self.parse(columns, what)
        }
    }

    /// Digits with an assumed leading decimal point, e.g. `0018719`.
    fn implied_decimal(&self, columns: Range<usize>, what: &str) -> Result<f64, ElementSetError> {
        let raw = self.field(columns).trim();
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ElementSetError::malformed(
                self.number,
                format!("{what}: '{raw}' is not an implied-decimal number"),
            ));
        }
        format!("0.{raw}")
            .parse()
            .map_err(|_| ElementSetError::malformed(self.number, format!("{what}: '{raw}'")))
    }

    /// Implied decimal point plus a signed power-of-ten exponent,
    /// e.g. ` 40313-4` = 0.40313e-4. A blank field reads as zero.
    fn exponent_field(&self, columns: Range<usize>, what: &str) -> Result<f64, ElementSetError> {
        let raw = self.field(columns).trim();
        if raw.is_empty() {
            return Ok(0.0);
        }
        let bad = || {
            ElementSetError::malformed(
                self.number,
                format!("{what}: '{raw}' is not an exponent field"),
            )
        };
        let (sign, body) = match raw.as_bytes()[0] {
            b'-' => (-1.0, &raw[1..]),
            b'+' => (1.0, &raw[1..]),
            _ => (1.0, raw),
        };
        let split = body.rfind(['-', '+']).ok_or_else(bad)?;
        let (mantissa, exponent) = body.split_at(split);
        if mantissa.is_empty() || !mantissa.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let mantissa: f64 = format!("0.{mantissa}").parse().map_err(|_| bad())?;
        let exponent: i32 = exponent.parse().map_err(|_| bad())?;
        Ok(sign * mantissa * 10f64.powi(exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    use crate::test_support::{LINE1, LINE2};

    const ISS_LINE1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    #[test]
    fn parses_reference_element_set() {
        let set = parse(Some("D091"), LINE1, LINE2).unwrap();
        assert_eq!(set.name.as_deref(), Some("D091"));
        assert_eq!(set.norad_id, 44078);
        assert_eq!(set.classification, Classification::Unclassified);
        assert_eq!(set.international_designator, "19072A");
        assert_relative_eq!(set.inclination_deg, 98.2808);
        assert_relative_eq!(set.right_ascension_deg, 291.9629);
        assert_relative_eq!(set.eccentricity, 0.0018719);
        assert_relative_eq!(set.argument_of_perigee_deg, 34.1424);
        assert_relative_eq!(set.mean_anomaly_deg, 38.1671);
        assert_relative_eq!(set.mean_motion, 14.4376852);
        assert_relative_eq!(set.mean_motion_dot, 1.4e-7);
        assert_eq!(set.mean_motion_ddot, 0.0);
        assert_relative_eq!(set.drag_term, 0.40313e-4);
        assert_eq!(set.element_set_number, 123);
        assert_eq!(set.revolution_number, 33733);
    }

    #[test]
    fn epoch_is_day_237_of_2025() {
        let set = parse(None, LINE1, LINE2).unwrap();
        let expected = Utc.with_ymd_and_hms(2025, 8, 25, 0, 1, 50).unwrap();
        let offset = (set.epoch - expected).num_milliseconds().abs();
        assert!(offset < 1, "epoch {} too far from {}", set.epoch, expected);
    }

    #[test]
    fn negative_exponent_fields() {
        let set = parse(None, ISS_LINE1, ISS_LINE2).unwrap();
        assert_relative_eq!(set.mean_motion_dot, -0.00002182);
        assert_relative_eq!(set.drag_term, -0.11606e-4);
        assert_eq!(set.epoch.format("%Y-%m-%d").to_string(), "2008-09-20");
    }

    #[test]
    fn checksum_counts_minus_signs() {
        assert_eq!(checksum(LINE1), 9);
        assert_eq!(checksum(LINE2), 7);
        assert_eq!(checksum(ISS_LINE1), 7);
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let corrupted = format!("{}8", &LINE1[..68]);
        let err = parse(None, &corrupted, LINE2).unwrap_err();
        assert!(matches!(err, ElementSetError::Malformed { line: 1, .. }), "{err}");
    }

    #[test]
    fn truncated_line_is_rejected() {
        let err = parse(None, &LINE1[..60], LINE2).unwrap_err();
        assert!(matches!(err, ElementSetError::Malformed { line: 1, .. }));
    }

    #[test]
    fn swapped_lines_are_rejected() {
        let err = parse(None, LINE2, LINE1).unwrap_err();
        assert!(matches!(err, ElementSetError::Malformed { line: 1, .. }));
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        // Replace a digit of the inclination with a letter and keep the
        // checksum consistent so only the field check can fail.
        let mut bytes = LINE2.as_bytes().to_vec();
        bytes[10] = b'X';
        let mut line: String = String::from_utf8(bytes).unwrap();
        let sum = checksum(&line);
        line.replace_range(68..69, &sum.to_string());
        let err = parse(None, LINE1, &line).unwrap_err();
        assert!(err.to_string().contains("inclination"), "{err}");
    }

    fn with_field(line: &str, columns: Range<usize>, value: &str) -> String {
        let mut line = line.to_string();
        line.replace_range(columns, value);
        let sum = checksum(&line);
        line.replace_range(68..69, &sum.to_string());
        line
    }

    #[test]
    fn non_finite_fields_are_rejected() {
        let nan_inclination = with_field(LINE2, 8..16, "     nan");
        let err = parse(None, LINE1, &nan_inclination).unwrap_err();
        assert!(matches!(err, ElementSetError::Malformed { line: 2, .. }));
        assert!(err.to_string().contains("inclination"), "{err}");

        let inf_mean_motion = with_field(LINE2, 52..63, "        inf");
        let err = parse(None, LINE1, &inf_mean_motion).unwrap_err();
        assert!(err.to_string().contains("mean motion"), "{err}");

        let inf_epoch = with_field(LINE1, 20..32, "         inf");
        let err = parse(None, &inf_epoch, LINE2).unwrap_err();
        assert!(matches!(err, ElementSetError::Malformed { line: 1, .. }), "{err}");
    }

    #[test]
    fn mismatched_catalog_numbers_are_rejected() {
        let line = format!("2 44079{}", &LINE2[7..68]);
        let line = format!("{line}{}", checksum(&format!("{line}0")));
        let err = parse(None, LINE1, &line).unwrap_err();
        assert!(err.to_string().contains("does not match"), "{err}");
    }

    #[test]
    fn trailing_whitespace_is_tolerated() {
        assert!(parse(None, &format!("{LINE1}  \r"), LINE2).is_ok());
    }

    #[test]
    fn epoch_year_pivot() {
        let old = epoch_from_year_day(98, 1.5).unwrap();
        assert_eq!(old.format("%Y-%m-%d %H").to_string(), "1998-01-01 12");
        assert!(epoch_from_year_day(25, 0.5).is_none());
        assert!(epoch_from_year_day(25, 366.5).is_none());
        assert!(epoch_from_year_day(24, 366.5).is_some());
    }

    #[test]
    fn cross_checks_against_sgp4_parser() {
        let reference =
            sgp4::Elements::from_tle(None, LINE1.as_bytes(), LINE2.as_bytes()).unwrap();
        let set = parse(None, LINE1, LINE2).unwrap();
        assert_eq!(set.norad_id as u64, reference.norad_id);
        assert_relative_eq!(set.inclination_deg, reference.inclination, epsilon = 1e-12);
        assert_relative_eq!(set.eccentricity, reference.eccentricity, epsilon = 1e-12);
        assert_relative_eq!(set.mean_motion, reference.mean_motion, epsilon = 1e-12);
        let drift = (set.epoch.naive_utc() - reference.datetime)
            .num_microseconds()
            .unwrap()
            .abs();
        assert!(drift <= 1, "epoch differs by {drift} us");
    }
}
