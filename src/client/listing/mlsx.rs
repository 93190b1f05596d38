use crate::client::{
    entry::{Directory, Entry, EntryInfo, File},
    error::{FtpError, Result},
};
use chrono::NaiveDateTime;

fn octal_digits(raw: &str, mode: &str) -> Result<u32> {
    if mode.is_empty() || !mode.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return Err(FtpError::format(raw, format!("invalid UNIX.mode \"{mode}\"")));
    }
    mode.parse().map_err(|_| FtpError::format(raw, format!("invalid UNIX.mode \"{mode}\"")))
}

pub(super) fn parse(raw: &str, base: &str) -> Result<Entry> {
    let (facts, pathname) = raw.split_once("; ").ok_or_else(|| FtpError::format(raw, "no \"; \" before the pathname"))?;

    let mut directory = false;
    let mut info = EntryInfo {
        name: format!("{base}{pathname}"),
        ..EntryInfo::default()
    };
    for fact in facts.split(';').filter(|f| !f.is_empty()) {
        let (key, value) = fact.split_once('=').ok_or_else(|| FtpError::format(raw, format!("fact \"{fact}\" has no value")))?;
        match key.to_ascii_lowercase().as_str() {
            "type" => directory = matches!(value.to_ascii_lowercase().as_str(), "dir" | "cdir" | "pdir"),
            "size" => info.size = value.parse().map_err(|_| FtpError::format(raw, format!("invalid size \"{value}\"")))?,
            "modify" => {
                let stamp = value.get(..14).unwrap_or(value);
                let date = NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S")
                    .map_err(|_| FtpError::format(raw, format!("invalid modify \"{value}\"")))?;
                info.modified = Some(date);
            }
            "unix.owner" => info.user = Some(value.to_string()),
            "unix.group" => info.group = Some(value.to_string()),
            "unix.mode" => info.permissions = octal_digits(raw, value)?,
            _ => {}
        }
    }

    if directory {
        info.numlinks = 1;
        Ok(Directory::with_info(info).into())
    } else {
        Ok(File::with_info(info).into())
    }
}
