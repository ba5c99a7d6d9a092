//! Release dates encoded in concrete model names.
//!
//! Providers stamp versions onto model names in a few shapes:
//! `gpt-4o-12-17-24` (`MM-DD-YY`), `o3-mini-2025-01-31` (`YYYY-MM-DD`) and
//! `claude-3-opus-20240229` (`YYYYMMDD`). Only the trailing segments are
//! inspected, so the alias does not need to be a prefix of the name.

/// A calendar date, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReleaseDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl ReleaseDate {
    fn new(year: u16, month: u8, day: u8) -> Option<Self> {
        ((1..=12).contains(&month) && (1..=31).contains(&day)).then_some(Self { year, month, day })
    }
}

/// Extracts the release date suffix from a model name, if it has one.
pub fn parse_release_date(model_name: &str) -> Option<ReleaseDate> {
    let segments: Vec<&str> = model_name.split('-').collect();

    if let [.., a, b, c] = segments.as_slice()
        && let Some(date) = parse_dashed(a, b, c)
    {
        return Some(date);
    }

    segments.last().and_then(|last| parse_compact(last))
}

/// Picks the newest model name. Undated names sort before dated ones and
/// ties resolve to the later entry in `model_names`.
pub fn most_recent<'a>(model_names: &'a [String]) -> Option<&'a str> {
    model_names
        .iter()
        .max_by_key(|name| parse_release_date(name))
        .map(String::as_str)
}

fn parse_dashed(a: &str, b: &str, c: &str) -> Option<ReleaseDate> {
    if !(all_digits(a) && all_digits(b) && all_digits(c)) {
        return None;
    }
    match (a.len(), b.len(), c.len()) {
        // YYYY-MM-DD
        (4, 2, 2) => ReleaseDate::new(a.parse().ok()?, b.parse().ok()?, c.parse().ok()?),
        // MM-DD-YY
        (2, 2, 2) => {
            let year: u16 = c.parse().ok()?;
            ReleaseDate::new(2000 + year, a.parse().ok()?, b.parse().ok()?)
        }
        _ => None,
    }
}

fn parse_compact(segment: &str) -> Option<ReleaseDate> {
    if segment.len() != 8 || !all_digits(segment) {
        return None;
    }
    ReleaseDate::new(
        segment[..4].parse().ok()?,
        segment[4..6].parse().ok()?,
        segment[6..].parse().ok()?,
    )
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: u16, month: u8, day: u8) -> Option<ReleaseDate> {
        Some(ReleaseDate { year, month, day })
    }

    #[test]
    fn parses_month_day_year_suffix() {
        assert_eq!(parse_release_date("gpt-4o-12-17-24"), date(2024, 12, 17));
        assert_eq!(parse_release_date("o1-mini-01-10-24"), date(2024, 1, 10));
    }

    #[test]
    fn parses_iso_suffix() {
        assert_eq!(parse_release_date("o3-mini-2025-01-31"), date(2025, 1, 31));
    }

    #[test]
    fn parses_compact_suffix() {
        assert_eq!(
            parse_release_date("claude-3-opus-20240229"),
            date(2024, 2, 29)
        );
        assert_eq!(
            parse_release_date("claude-3-5-haiku-20241022"),
            date(2024, 10, 22)
        );
    }

    #[test]
    fn undated_names_have_no_release_date() {
        assert_eq!(parse_release_date("gpt-4o"), None);
        assert_eq!(parse_release_date("o1"), None);
        assert_eq!(parse_release_date("model-13-40-24"), None);
        assert_eq!(parse_release_date(""), None);
    }

    #[test]
    fn most_recent_picks_newest_date() {
        let names = vec![
            "gpt-4o-01-15-24".to_string(),
            "gpt-4o-12-17-24".to_string(),
            "gpt-4o-01-10-24".to_string(),
        ];
        assert_eq!(most_recent(&names), Some("gpt-4o-12-17-24"));
    }

    #[test]
    fn most_recent_prefers_dated_over_undated() {
        let names = vec!["o1-12-17-24".to_string(), "o1-preview".to_string()];
        assert_eq!(most_recent(&names), Some("o1-12-17-24"));
    }

    #[test]
    fn most_recent_ties_keep_later_entry() {
        let names = vec!["alpha".to_string(), "beta".to_string()];
        assert_eq!(most_recent(&names), Some("beta"));
        assert_eq!(most_recent(&[]), None);
    }
}
