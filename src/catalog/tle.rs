//! TLE line validation and fixed-column field access.
//!
//! A TLE line is 69 characters; the last character is a mod-10 checksum over
//! the first 68 (digits count as their value, minus signs count as 1, anything
//! else counts as 0). Records failing the checksum never enter the catalog.

pub const TLE_LINE_LEN: usize = 69;

/// A raw three-line catalog block before entity construction.
#[derive(Debug, Clone)]
pub struct RawTle {
    pub name: String,
    pub line1: String,
    pub line2: String,
}

pub fn line_checksum_valid(line: &str) -> bool {
    let bytes = line.as_bytes();
    if bytes.len() < TLE_LINE_LEN {
        return false;
    }

    let mut sum: u32 = 0;
    for &b in &bytes[..68] {
        if b.is_ascii_digit() {
            sum += (b - b'0') as u32;
        } else if b == b'-' {
            sum += 1;
        }
    }

    match bytes[68] {
        b @ b'0'..=b'9' => sum % 10 == (b - b'0') as u32,
        _ => false,
    }
}

/// Split a newline-delimited TLE body into three-line blocks, dropping any
/// trailing partial block and any block whose lines fail the checksum.
pub fn parse_tle_text(body: &str) -> Vec<RawTle> {
    let lines: Vec<&str> = body
        .lines()
        .map(|l| l.trim_end())
        .filter(|l| !l.is_empty())
        .collect();

    let mut records = Vec::new();
    for block in lines.chunks(3) {
        let [name, line1, line2] = block else {
            // Fewer than 3 lines left over; discard.
            break;
        };

        if !line1.starts_with("1 ") || !line2.starts_with("2 ") {
            log::debug!("skipping malformed TLE block for {:?}", name);
            continue;
        }
        if !line_checksum_valid(line1) || !line_checksum_valid(line2) {
            log::debug!("dropping TLE with bad checksum: {:?}", name);
            continue;
        }

        records.push(RawTle {
            name: name.trim().to_string(),
            line1: line1.to_string(),
            line2: line2.to_string(),
        });
    }

    records
}

/// Catalog number, line 2 columns 3-7.
pub fn norad_id(line2: &str) -> Option<String> {
    field(line2, 2, 7)
}

/// International designator, line 1 columns 10-17, compact YYNNNPPP form.
pub fn intl_designator(line1: &str) -> Option<String> {
    field(line1, 9, 17)
}

/// Mean motion in revolutions per day, line 2 columns 53-63.
pub fn mean_motion_rev_day(line2: &str) -> Option<f64> {
    field(line2, 52, 63)?.parse().ok()
}

/// Eccentricity, line 2 columns 27-33, stored with an implied leading "0.".
pub fn eccentricity(line2: &str) -> Option<f64> {
    let digits = field(line2, 26, 33)?;
    format!("0.{digits}").parse().ok()
}

fn field(line: &str, start: usize, end: usize) -> Option<String> {
    let s = line.get(start..end)?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISS_NAME: &str = "ISS (ZARYA)";
    const ISS_L1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_L2: &str =
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    #[test]
    fn checksum_accepts_reference_lines() {
        assert!(line_checksum_valid(ISS_L1));
        assert!(line_checksum_valid(ISS_L2));
    }

    #[test]
    fn checksum_rejects_short_line() {
        assert!(!line_checksum_valid("1 25544U"));
        assert!(!line_checksum_valid(""));
    }

    #[test]
    fn checksum_rejects_single_digit_corruption() {
        // Flip one digit in a checked position, keep the checksum digit.
        let mut corrupted = ISS_L2.to_string();
        corrupted.replace_range(2..3, "3");
        assert!(!line_checksum_valid(&corrupted));
    }

    #[test]
    fn checksum_counts_minus_signs_as_one() {
        // Reference line 1 contains minus signs; recompute by hand.
        let mut sum = 0u32;
        for b in ISS_L1.bytes().take(68) {
            if b.is_ascii_digit() {
                sum += (b - b'0') as u32;
            } else if b == b'-' {
                sum += 1;
            }
        }
        assert_eq!(sum % 10, 7);
    }

    #[test]
    fn parse_extracts_blocks_and_discards_partial_tail() {
        let body = format!("{ISS_NAME}\n{ISS_L1}\n{ISS_L2}\nDANGLING NAME\n{ISS_L1}\n");
        let records = parse_tle_text(&body);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "ISS (ZARYA)");
    }

    #[test]
    fn parse_drops_checksum_failures_silently() {
        let mut bad = ISS_L2.to_string();
        bad.replace_range(10..11, "9");
        let body = format!("BROKEN\n{ISS_L1}\n{bad}\n{ISS_NAME}\n{ISS_L1}\n{ISS_L2}\n");
        let records = parse_tle_text(&body);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "ISS (ZARYA)");
    }

    #[test]
    fn field_readers_use_fixed_columns() {
        assert_eq!(norad_id(ISS_L2).as_deref(), Some("25544"));
        assert_eq!(intl_designator(ISS_L1).as_deref(), Some("98067A"));
        let n = mean_motion_rev_day(ISS_L2).unwrap();
        assert!((n - 15.72125391).abs() < 1e-8);
        let e = eccentricity(ISS_L2).unwrap();
        assert!((e - 0.0006703).abs() < 1e-10);
    }
}
