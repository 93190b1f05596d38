use crate::client::{
    entry::{Directory, Entry, EntryInfo, File},
    error::{FtpError, Result},
};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LINE: Regex = Regex::new(
        r"(?x)
        ^(\S)(\S{9})\S?\s+     # type, mode, optional ACL marker
        (\d+)\s+               # links
        (\S+)\s+               # user
        (\S+)\s+               # group
        (\d+)\s+               # size
        ([A-Za-z]{3})\s+        # month
        (\d{1,2})\s+           # day
        (\S+)\s+               # year or HH:MM
        (.+)$                  # name, may contain spaces"
    )
    .unwrap();
}

// A compact date further ahead of the reference than this lies in the previous year.
const HALF_YEAR_SECS: i64 = 15_724_800;

const MONTHS: [&str; 12] = ["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];

/// Converts a nine character mode string such as `rwxr-xr-x` into octal digits (`755`).
pub fn permissions_from_mode(mode: &str) -> Option<u32> {
    let bits: Vec<u32> = mode
        .chars()
        .map(|c| match c {
            'r' => Some(4),
            'w' => Some(2),
            'x' | 's' => Some(1),
            '-' | 't' | 'T' | 'S' => Some(0),
            _ => None,
        })
        .collect::<Option<Vec<u32>>>()?;
    match bits.as_slice() {
        [ur, uw, ux, gr, gw, gx, or, ow, ox] => Some((ur | uw | ux) * 100 + (gr | gw | gx) * 10 + (or | ow | ox)),
        _ => None,
    }
}

fn month(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    MONTHS.iter().position(|m| *m == lower).map(|i| i as u32 + 1)
}

fn modified(raw: &str, month: u32, day: u32, year_or_time: &str, reference: Option<NaiveDateTime>) -> Result<NaiveDateTime> {
    let invalid = || FtpError::format(raw, format!("invalid date \"{year_or_time}\""));
    if let Some((hour, minute)) = year_or_time.split_once(':') {
        let reference = reference.unwrap_or_else(|| Local::now().naive_local());
        let hour = hour.parse().map_err(|_| invalid())?;
        let minute = minute.parse().map_err(|_| invalid())?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)?;
        let on = |year: i32| NaiveDate::from_ymd_opt(year, month, day).map(|d| d.and_time(time));

        // Feb 29 only exists in leap years, so it lands in the nearest one.
        let date = [0, -1, 1, -2, 2, -3, 3, -4, 4]
            .into_iter()
            .find_map(|offset| on(reference.year() + offset))
            .ok_or_else(invalid)?;
        if date.signed_duration_since(reference).num_seconds() > HALF_YEAR_SECS {
            (1..=8).find_map(|back| on(date.year() - back)).ok_or_else(invalid)
        } else {
            Ok(date)
        }
    } else {
        let year: i32 = year_or_time.parse().map_err(|_| invalid())?;
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(invalid)
    }
}

pub(super) fn parse(raw: &str, base: &str, reference: Option<NaiveDateTime>) -> Result<Entry> {
    let caps = LINE.captures(raw).ok_or_else(|| FtpError::format(raw, "not a Unix listing line"))?;
    let field = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();

    let permissions = permissions_from_mode(field(2)).ok_or_else(|| FtpError::format(raw, format!("invalid mode \"{}\"", field(2))))?;
    let numlinks = field(3).parse().map_err(|_| FtpError::format(raw, "invalid link count"))?;
    let size = field(6).parse().map_err(|_| FtpError::format(raw, "invalid size"))?;
    let month = month(field(7)).ok_or_else(|| FtpError::format(raw, format!("invalid month \"{}\"", field(7))))?;
    let day = field(8).parse().map_err(|_| FtpError::format(raw, "invalid day"))?;
    let modified = modified(raw, month, day, field(9), reference)?;

    let filename = field(10);
    let name = if filename.starts_with('/') {
        filename.to_string()
    } else {
        format!("{base}{filename}")
    };

    let info = EntryInfo {
        name,
        permissions,
        numlinks,
        user: Some(field(4).to_string()),
        group: Some(field(5).to_string()),
        size,
        modified: Some(modified),
    };
    Ok(match field(1) {
        "d" => Directory::with_info(info).into(),
        _ => File::with_info(info).into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ErrorKind, RemoteEntry};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(h, min, 0)).unwrap()
    }

    #[test]
    fn dot_directory() {
        let entry = parse("drwx---r-t 37 p159995 ftpusers 4096 Apr 4 2009 .", "/", None).unwrap();
        assert!(entry.is_dir());
        assert_eq!(entry.name(), "/./");
        assert_eq!(entry.permissions(), 704);
        assert_eq!(entry.numlinks(), 37);
        assert_eq!(entry.user(), Some("p159995"));
        assert_eq!(entry.group(), Some("ftpusers"));
        assert_eq!(entry.size(), 4096);
        assert_eq!(entry.modified(), Some(at(2009, 4, 4, 0, 0)));
    }

    #[test]
    fn regular_file() {
        let entry = parse("-rw----r--  1 p159995  ftpusers       415 May 23  2000 write.html", "/", None).unwrap();
        assert!(entry.is_file());
        assert_eq!(entry.name(), "/write.html");
        assert_eq!(entry.permissions(), 604);
        assert_eq!(entry.size(), 415);
        assert_eq!(entry.modified(), Some(at(2000, 5, 23, 0, 0)));
    }

    #[test]
    fn filename_with_whitespace() {
        let entry = parse("-rw-r--r--   1 1000     1000         8 Mar  9  2007 answers to questions.txt", "/docs/", None).unwrap();
        assert_eq!(entry.name(), "/docs/answers to questions.txt");
    }

    #[test]
    fn absolute_filename_is_kept() {
        let entry = parse("-rw-r--r-- 1 ftp ftp 8 Mar 9 2007 /etc/motd", "/docs/", None).unwrap();
        assert_eq!(entry.name(), "/etc/motd");
    }

    #[test]
    fn directory_name_gets_trailing_slash() {
        let entry = parse("drwxr-xr-x 2 ftp ftp 4096 Mar 9 2007 htdocs", "/", None).unwrap();
        assert_eq!(entry.name(), "/htdocs/");
        assert_eq!(entry.permissions(), 755);
    }

    #[rstest]
    #[case("Jul 23 20:16", at(2009, 7, 23, 20, 16))]
    #[case("Apr  4 20:16", at(2009, 4, 4, 20, 16))]
    #[case("Jan 22 20:16", at(2009, 1, 22, 20, 16))]
    #[case("Dec  1 20:16", at(2008, 12, 1, 20, 16))]
    #[case("Jul 24 20:16", at(2008, 7, 24, 20, 16))]
    fn compact_dates(#[case] date: &str, #[case] expected: NaiveDateTime) {
        let line = format!("-rw-r--r-- 1 ftp ftp 8 {date} file.txt");
        let entry = parse(&line, "/", Some(at(2009, 1, 22, 20, 16))).unwrap();
        assert_eq!(entry.modified(), Some(expected));
    }

    #[rstest]
    #[case(at(2023, 11, 1, 12, 0), at(2024, 2, 29, 12, 0))]
    #[case(at(2025, 1, 10, 12, 0), at(2024, 2, 29, 12, 0))]
    #[case(at(2024, 3, 1, 12, 0), at(2024, 2, 29, 12, 0))]
    #[case(at(2023, 6, 1, 12, 0), at(2020, 2, 29, 12, 0))]
    fn leap_day_outside_a_leap_year(#[case] reference: NaiveDateTime, #[case] expected: NaiveDateTime) {
        let entry = parse("-rw-r--r-- 1 ftp ftp 8 Feb 29 12:00 leap.txt", "/", Some(reference)).unwrap();
        assert_eq!(entry.modified(), Some(expected));
    }

    #[test]
    fn impossible_compact_date() {
        let err = parse("-rw-r--r-- 1 ftp ftp 8 Feb 30 12:00 odd.txt", "/", Some(at(2024, 1, 1, 0, 0))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[rstest]
    #[case("rwxr-xr-x", Some(755))]
    #[case("rw-r--r--", Some(644))]
    #[case("rwx------", Some(700))]
    #[case("rwsr-xr-t", Some(754))]
    #[case("rwxr-xr-", None)]
    #[case("rwxr-?r-x", None)]
    fn mode_strings(#[case] mode: &str, #[case] expected: Option<u32>) {
        assert_eq!(permissions_from_mode(mode), expected);
    }

    #[rstest]
    #[case("total 48")]
    #[case("drwxr-xr-x 2 ftp ftp 4096 Foo 9 2007 htdocs")]
    #[case("drwxr-xr-x 2 ftp ftp 4096 Mar 9 20:99 htdocs")]
    #[case("")]
    fn unparseable_lines(#[case] line: &str) {
        assert_eq!(parse(line, "/", None).unwrap_err().kind(), ErrorKind::Format);
    }
}
