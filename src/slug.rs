//! Derives a post's canonical URL path and publication date from its source
//! file name. Post files are named `YYYY-MM-DD-<slug-text>.<ext>`; the date
//! prefix becomes both the publication date and the first path segment of the
//! slug, e.g. `2021-03-15-hello-world.md` becomes `/2021-03-15/hello-world`.

use chrono::NaiveDate;
use std::path::Path;
use thiserror::Error;

/// The length of the `YYYY-MM-DD` date prefix.
const DATE_LEN: usize = 10;

/// The character offset at which the slug text begins (the date prefix plus
/// its trailing separator).
const SLUG_TEXT_START: usize = DATE_LEN + 1;

/// The result of deriving a slug from a post file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlugResult {
    /// Always of the form `/YYYY-MM-DD/<slug-text>`.
    pub slug: String,

    /// The calendar date parsed from the file name prefix.
    pub date: NaiveDate,
}

impl SlugResult {
    /// Returns the output page path for the slug under `prefix` (e.g. with
    /// prefix `/blog`, the slug `/2021-03-15/hello-world` is published at
    /// `/blog/2021-03-15/hello-world`).
    pub fn page_path(&self, prefix: &str) -> String {
        format!("{}{}", prefix.trim_end_matches('/'), self.slug)
    }

    /// Returns the slug text (everything after the date segment), or an empty
    /// string if `slug` is shorter than the date segment.
    pub fn slug_text(&self) -> &str {
        self.slug.get(SLUG_TEXT_START + 1..).unwrap_or("")
    }
}

/// Derives a [`SlugResult`] from a post file name. Any leading directories
/// and the file extension are ignored. Fails with
/// [`Error::InvalidFilenameFormat`] unless the first ten characters are a real
/// calendar date written as `YYYY-MM-DD` followed by at least one more
/// character.
///
/// The slug text is passed through verbatim; no sanitization happens here.
pub fn derive_slug(filename: &str) -> Result<SlugResult> {
    let invalid = || Error::InvalidFilenameFormat(filename.to_owned());

    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(invalid)?;

    let date_str = stem.get(..DATE_LEN).ok_or_else(invalid)?;
    let date = parse_date(date_str).ok_or_else(invalid)?;
    let slug_text = stem.get(SLUG_TEXT_START..).ok_or_else(invalid)?;

    Ok(SlugResult {
        slug: format!("/{}/{}", date_str, slug_text),
        date,
    })
}

/// Parses a strict, fixed-width `YYYY-MM-DD` date. The shape is checked byte
/// by byte (no signs, no single-digit fields) and `chrono` decides whether the
/// date exists on the calendar.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != DATE_LEN || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }

    let year = digits(&bytes[0..4])?;
    let month = digits(&bytes[5..7])?;
    let day = digits(&bytes[8..10])?;
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn digits(bytes: &[u8]) -> Option<u32> {
    bytes.iter().try_fold(0u32, |acc, b| match b {
        b'0'..=b'9' => Some(acc * 10 + u32::from(b - b'0')),
        _ => None,
    })
}

/// The result of a slug derivation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to derive a slug from a post file name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Returned when the file name does not begin with a valid `YYYY-MM-DD-`
    /// date prefix. Carries the offending file name.
    #[error("post `{0}` did not match filename format 'yyyy-MM-dd-post-name'")]
    InvalidFilenameFormat(String),
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_derive_slug() -> Result<()> {
        let result = derive_slug("2021-03-15-hello-world.md")?;
        assert_eq!("/2021-03-15/hello-world", result.slug);
        assert_eq!(date(2021, 3, 15), result.date);
        Ok(())
    }

    #[test]
    fn test_derive_slug_keeps_dashes_and_dots_in_slug_text() -> Result<()> {
        let result = derive_slug("2020-01-02-rust-1.40-notes.markdown")?;
        assert_eq!("/2020-01-02/rust-1.40-notes", result.slug);
        assert_eq!("rust-1.40-notes", result.slug_text());
        Ok(())
    }

    #[test]
    fn test_derive_slug_ignores_directories() -> Result<()> {
        let result = derive_slug("drafts/2019-12-31-new-years-eve.md")?;
        assert_eq!("/2019-12-31/new-years-eve", result.slug);
        Ok(())
    }

    #[test]
    fn test_derive_slug_without_extension() -> Result<()> {
        assert_eq!("/2021-03-15/plain", derive_slug("2021-03-15-plain")?.slug);
        Ok(())
    }

    #[test]
    fn test_derive_slug_passes_slug_text_verbatim() -> Result<()> {
        let result = derive_slug("2021-03-15-Hello World.md")?;
        assert_eq!("/2021-03-15/Hello World", result.slug);
        Ok(())
    }

    #[test]
    fn test_derive_slug_invalid_month() {
        assert_eq!(
            Err(Error::InvalidFilenameFormat("2021-13-01-bad.md".to_owned())),
            derive_slug("2021-13-01-bad.md"),
        );
    }

    #[test]
    fn test_derive_slug_rejects_impossible_dates() {
        for name in &[
            "2021-02-30-leap.md",
            "2021-02-29-leap.md",
            "2021-04-31-april.md",
            "2021-00-10-zero-month.md",
            "2021-01-00-zero-day.md",
        ] {
            assert!(
                matches!(derive_slug(name), Err(Error::InvalidFilenameFormat(_))),
                "wanted `{}` to be rejected",
                name
            );
        }
    }

    #[test]
    fn test_derive_slug_accepts_leap_day() -> Result<()> {
        assert_eq!(date(2020, 2, 29), derive_slug("2020-02-29-leap.md")?.date);
        Ok(())
    }

    #[test]
    fn test_derive_slug_rejects_loose_date_shapes() {
        for name in &[
            "2021-3-15-hello.md",
            "+2021-03-1-hello.md",
            "20210315-hello.md",
            "2021/03/15-hello.md",
            "hello-world.md",
            "2021-03-1a-hello.md",
        ] {
            assert!(
                matches!(derive_slug(name), Err(Error::InvalidFilenameFormat(_))),
                "wanted `{}` to be rejected",
                name
            );
        }
    }

    #[test]
    fn test_derive_slug_rejects_short_names() {
        for name in &["", "2021-03-15", "2021-03-15.md", "2021-03.md"] {
            assert!(
                matches!(derive_slug(name), Err(Error::InvalidFilenameFormat(_))),
                "wanted `{}` to be rejected",
                name
            );
        }
    }

    #[test]
    fn test_derive_slug_rejects_multibyte_prefix() {
        assert!(derive_slug("2021-03-1é-hello.md").is_err());
        assert!(derive_slug("2021-03-15é.md").is_err());
    }

    #[test]
    fn test_derived_date_reparses_to_itself() -> Result<()> {
        let result = derive_slug("1999-11-30-party.md")?;
        let iso = result.date.format("%Y-%m-%d").to_string();
        assert_eq!(Some(result.date), parse_date(&iso));
        Ok(())
    }

    #[test]
    fn test_slug_text_of_short_slug() {
        let result = SlugResult {
            slug: "/x".to_owned(),
            date: date(2021, 3, 15),
        };
        assert_eq!("", result.slug_text());
    }

    #[test]
    fn test_page_path() -> Result<()> {
        let result = derive_slug("2021-03-15-hello-world.md")?;
        assert_eq!("/blog/2021-03-15/hello-world", result.page_path("/blog"));
        assert_eq!("/blog/2021-03-15/hello-world", result.page_path("/blog/"));
        assert_eq!("/2021-03-15/hello-world", result.page_path(""));
        Ok(())
    }
}
