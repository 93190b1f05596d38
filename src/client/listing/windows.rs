use crate::client::{
    entry::{Directory, Entry, EntryInfo, File},
    error::{FtpError, Result},
};
use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LINE: Regex = Regex::new(
        r"(?x)
        ^([0-9]{2})-([0-9]{2})-([0-9]{2})\s+   # MM-DD-YY
        ([0-9]{2}):([0-9]{2})(AM|PM)\s+       # hh:mm AM|PM
        (<DIR>)?([0-9]+)?\s+                  # directory marker or size
        (.+)$                                 # name"
    )
    .unwrap();
}

// Two digit years below this are in the 2000s, the rest in the 1900s.
const CENTURY_PIVOT: i32 = 70;

fn modified(raw: &str, month: u32, day: u32, year: i32, hour: u32, minute: u32, pm: bool) -> Result<NaiveDateTime> {
    let year = if year < CENTURY_PIVOT { 2000 + year } else { 1900 + year };
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| FtpError::format(raw, "invalid date"))
}

pub(super) fn parse(raw: &str, base: &str) -> Result<Entry> {
    let caps = LINE.captures(raw).ok_or_else(|| FtpError::format(raw, "not a Windows listing line"))?;
    let number = |i: usize| -> Result<u32> {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(|| FtpError::format(raw, "invalid number"))
    };

    let modified = modified(
        raw,
        number(1)?,
        number(2)?,
        number(3)? as i32,
        number(4)?,
        number(5)?,
        caps.get(6).is_some_and(|m| m.as_str() == "PM"),
    )?;
    let name = format!("{}{}", base, caps.get(9).map(|m| m.as_str()).unwrap_or_default());

    if caps.get(7).is_some() {
        return Ok(Directory::with_info(EntryInfo {
            name,
            modified: Some(modified),
            ..EntryInfo::default()
        })
        .into());
    }
    let size = match caps.get(8) {
        Some(m) => m.as_str().parse().map_err(|_| FtpError::format(raw, "invalid size"))?,
        None => return Err(FtpError::format(raw, "neither <DIR> nor a size")),
    };
    Ok(File::with_info(EntryInfo {
        name,
        size,
        modified: Some(modified),
        ..EntryInfo::default()
    })
    .into())
}
