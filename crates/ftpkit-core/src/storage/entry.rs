use chrono::{Duration, NaiveDateTime};
use std::fmt::{self, Formatter, Write};

/// Whether a storage entry holds data or other entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// A plain file
    Element,
    /// A directory
    Collection,
}

/// Unix style permission bits of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions(pub u32);

const PERM_READ: u32 = 0b100100100;
const PERM_WRITE: u32 = 0b010010010;
const PERM_EXEC: u32 = 0b001001001;
const PERM_USER: u32 = 0b111000000;
const PERM_GROUP: u32 = 0b000111000;
const PERM_OTHERS: u32 = 0b000000111;

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for class in [PERM_USER, PERM_GROUP, PERM_OTHERS] {
            f.write_char(if self.0 & class & PERM_READ > 0 { 'r' } else { '-' })?;
            f.write_char(if self.0 & class & PERM_WRITE > 0 { 'w' } else { '-' })?;
            f.write_char(if self.0 & class & PERM_EXEC > 0 { 'x' } else { '-' })?;
        }
        Ok(())
    }
}

/// An entry as seen by the FTP server: a file (element) or directory (collection) at an absolute
/// virtual path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    /// Absolute virtual path, e.g. `/htdocs/index.html`
    pub name: String,
    /// Element or collection
    pub entry_type: EntryType,
    /// Size in bytes
    pub size: u64,
    /// Last modification, in local time
    pub modified: NaiveDateTime,
    /// Mode bits
    pub permissions: Permissions,
    /// Owner shown in listings
    pub owner: String,
    /// Group shown in listings
    pub group: String,
    /// Hard link count
    pub links: u64,
}

// Listings show the time of day for entries younger than six months and the year otherwise.
const RECENT: i64 = 182;

impl StorageEntry {
    /// The last path segment, `/` for the root
    pub fn basename(&self) -> &str {
        let trimmed = self.name.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(pos) => &trimmed[pos + 1..],
            None if trimmed.is_empty() => "/",
            None => trimmed,
        }
    }

    /// Returns true for directories
    pub fn is_collection(&self) -> bool {
        self.entry_type == EntryType::Collection
    }

    /// Renders the entry as a line of `ls -l` output, shown under the given name.
    pub fn long_repr(&self, name: &str, now: NaiveDateTime) -> String {
        let age = now.signed_duration_since(self.modified);
        let modified = if age < Duration::days(RECENT) && age > Duration::days(-RECENT) {
            self.modified.format("%b %e %H:%M")
        } else {
            self.modified.format("%b %e  %Y")
        };
        format!(
            "{filetype}{permissions} {links:>4} {owner:<8} {group:<8} {size:>12} {modified} {name}",
            filetype = if self.is_collection() { "d" } else { "-" },
            permissions = self.permissions,
            links = self.links,
            owner = self.owner,
            group = self.group,
            size = self.size,
        )
    }

    /// Renders the entry as an RFC 3659 fact line, shown under the given name.
    pub fn facts(&self, name: &str) -> String {
        let kind = if self.is_collection() { "dir" } else { "file" };
        self.facts_as(kind, name)
    }

    /// Like [`facts`](Self::facts) but with an explicit `type` fact such as `cdir` or `pdir`.
    pub fn facts_as(&self, kind: &str, name: &str) -> String {
        let perm = if self.is_collection() { "flcdmpe" } else { "adfrw" };
        format!(
            "type={kind};size={size};modify={modify};perm={perm};UNIX.mode={mode:04o};UNIX.owner={owner};UNIX.group={group}; {name}",
            size = self.size,
            modify = self.modified.format("%Y%m%d%H%M%S"),
            mode = self.permissions.0 & 0o7777,
            owner = self.owner,
            group = self.group,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(h, min, 0)).unwrap()
    }

    fn htdocs() -> StorageEntry {
        StorageEntry {
            name: "/htdocs/".to_string(),
            entry_type: EntryType::Collection,
            size: 4096,
            modified: at(2009, 4, 4, 12, 0),
            permissions: Permissions(0o755),
            owner: "ftp".to_string(),
            group: "users".to_string(),
            links: 2,
        }
    }

    #[test]
    fn permissions_display() {
        assert_eq!(Permissions(0o754).to_string(), "rwxr-xr--");
        assert_eq!(Permissions(0o600).to_string(), "rw-------");
    }

    #[test]
    fn basename() {
        assert_eq!(htdocs().basename(), "htdocs");
        let root = StorageEntry { name: "/".to_string(), ..htdocs() };
        assert_eq!(root.basename(), "/");
    }

    #[test]
    fn long_repr_old_entry_shows_year() {
        let line = htdocs().long_repr("htdocs", at(2010, 1, 1, 0, 0));
        assert_eq!(line, "drwxr-xr-x    2 ftp      users            4096 Apr  4  2009 htdocs");
    }

    #[test]
    fn long_repr_recent_entry_shows_time() {
        let line = htdocs().long_repr(".", at(2009, 5, 1, 0, 0));
        assert_eq!(line, "drwxr-xr-x    2 ftp      users            4096 Apr  4 12:00 .");
    }

    #[test]
    fn facts() {
        assert_eq!(
            htdocs().facts("htdocs"),
            "type=dir;size=4096;modify=20090404120000;perm=flcdmpe;UNIX.mode=0755;UNIX.owner=ftp;UNIX.group=users; htdocs"
        );
        assert!(htdocs().facts_as("cdir", ".").starts_with("type=cdir;"));
    }
}
