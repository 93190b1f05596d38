//! The entry model: [`Directory`], [`File`] and the [`Entry`] sum of both.
//!
//! Entries are plain values describing what a listing said about a remote path. Operations
//! that talk to the server take the [`Connection`] explicitly.

use super::{
    connection::Connection,
    error::{FtpError, Result},
    reply,
};
use chrono::NaiveDateTime;
use std::fmt;

/// Metadata shared by files and directories.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryInfo {
    /// Absolute path; directories end with `/`
    pub name: String,
    /// Permissions as octal digits, e.g. `755`
    pub permissions: u32,
    /// Hard link count
    pub numlinks: u32,
    /// Owner, when the dialect reports one
    pub user: Option<String>,
    /// Group, when the dialect reports one
    pub group: Option<String>,
    /// Size in bytes
    pub size: u64,
    /// Modification date as reported by the server
    pub modified: Option<NaiveDateTime>,
}

/// Operations common to every remote entry.
pub trait RemoteEntry {
    /// The metadata of this entry
    fn info(&self) -> &EntryInfo;

    /// Mutable access to the metadata of this entry
    fn info_mut(&mut self) -> &mut EntryInfo;

    /// Absolute path of the entry
    fn name(&self) -> &str {
        &self.info().name
    }

    /// Permissions as octal digits, e.g. `644`
    fn permissions(&self) -> u32 {
        self.info().permissions
    }

    /// Hard link count
    fn numlinks(&self) -> u32 {
        self.info().numlinks
    }

    /// Owner of the entry
    fn user(&self) -> Option<&str> {
        self.info().user.as_deref()
    }

    /// Group of the entry
    fn group(&self) -> Option<&str> {
        self.info().group.as_deref()
    }

    /// Size in bytes from the last listing
    fn size(&self) -> u64 {
        self.info().size
    }

    /// Modification date from the last listing
    fn modified(&self) -> Option<NaiveDateTime> {
        self.info().modified
    }

    /// Last path segment without any trailing slash
    fn basename(&self) -> &str {
        basename(self.name())
    }

    /// Checks with `SIZE` whether the entry still exists.
    fn exists(&self, conn: &mut Connection) -> Result<bool> {
        let response = conn.send_command(&format!("SIZE {}", self.name()))?;
        match response.code()? {
            213 => Ok(true),
            550 => Ok(false),
            _ => response.expect(&[213, 550]).map(|_| false),
        }
    }

    /// Asks the server for the modification date with `MDTM`. `None` when the server does not
    /// know the entry.
    fn last_modified(&self, conn: &mut Connection) -> Result<Option<NaiveDateTime>> {
        let response = conn.send_command(&format!("MDTM {}", self.name()))?;
        if response.code()? == 550 {
            return Ok(None);
        }
        let message = response.expect(&[213])?;
        let stamp = message.trim();
        NaiveDateTime::parse_from_str(stamp.get(..14).unwrap_or(stamp), "%Y%m%d%H%M%S")
            .map(Some)
            .map_err(|e| FtpError::Protocol(format!("Malformed MDTM reply \"{stamp}\": {e}")))
    }

    /// Renames the entry. A target starting with `/` is taken as-is, anything else is relative
    /// to the directory the entry lives in.
    fn rename(&mut self, conn: &mut Connection, to: &str) -> Result<()> {
        let target = if to.starts_with('/') {
            to.to_string()
        } else {
            format!("{}/{}", dirname(self.name()), to)
        };
        rename_to(self, conn, target)
    }

    /// Moves the entry into `dir`, optionally under a new name.
    fn move_to(&mut self, conn: &mut Connection, dir: &Directory, name: Option<&str>) -> Result<()> {
        let target = format!("{}{}", dir.name(), name.unwrap_or_else(|| self.basename()));
        rename_to(self, conn, target)
    }

    /// Changes the permissions with `SITE CHMOD`, e.g. `change_permissions(conn, 644)`.
    fn change_permissions(&mut self, conn: &mut Connection, permissions: u32) -> Result<()> {
        let response = conn.send_command(&format!("SITE CHMOD {} {}", permissions, self.name()))?;
        response.expect(&[200])?;
        self.info_mut().permissions = permissions;
        Ok(())
    }
}

fn rename_to<E: RemoteEntry + ?Sized>(entry: &mut E, conn: &mut Connection, target: String) -> Result<()> {
    let source = entry.name().to_string();
    let exchange = |conn: &mut Connection| -> Result<()> {
        conn.send_command(&format!("RNFR {source}"))?.expect(&[350])?;
        conn.send_command(&format!("RNTO {target}"))?.expect(&[250])?;
        Ok(())
    };
    exchange(conn).map_err(|e| FtpError::io(format!("Could not rename {source} to {target}"), e))?;
    entry.info_mut().name = if source.ends_with('/') { normalize_dir(&target) } else { target };
    Ok(())
}

/// Everything after the last `/`, ignoring a trailing slash.
pub(crate) fn basename(name: &str) -> &str {
    let trimmed = name.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    }
}

/// Everything before the last `/`, ignoring a trailing slash.
pub(crate) fn dirname(name: &str) -> &str {
    let trimmed = name.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(pos) => &trimmed[..pos],
        None => "",
    }
}

fn normalize_dir(name: &str) -> String {
    let trimmed = name.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// A remote directory. Its name always ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    info: EntryInfo,
}

impl Directory {
    /// Creates a directory with the given name, normalized to `/name/`.
    pub fn new(name: &str) -> Self {
        Directory::with_info(EntryInfo {
            name: name.to_string(),
            ..EntryInfo::default()
        })
    }

    /// Creates a directory from listing metadata, normalizing its name.
    pub fn with_info(mut info: EntryInfo) -> Self {
        info.name = normalize_dir(&info.name);
        Directory { info }
    }
}

impl RemoteEntry for Directory {
    fn info(&self) -> &EntryInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut EntryInfo {
        &mut self.info
    }
}

/// A remote file. Its name never ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    info: EntryInfo,
}

impl File {
    /// Creates a file placeholder without metadata.
    pub fn new(name: &str) -> Self {
        File::with_info(EntryInfo {
            name: name.to_string(),
            ..EntryInfo::default()
        })
    }

    /// Creates a file from listing metadata.
    pub fn with_info(mut info: EntryInfo) -> Self {
        let trimmed = info.name.trim_end_matches('/').len();
        info.name.truncate(trimmed);
        File { info }
    }

    pub(crate) fn replace_info(&mut self, info: EntryInfo) {
        self.info = info;
    }
}

impl RemoteEntry for File {
    fn info(&self) -> &EntryInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut EntryInfo {
        &mut self.info
    }
}

/// Either a file or a directory, as returned by listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A directory
    Directory(Directory),
    /// A file
    File(File),
}

impl Entry {
    /// Returns true for directories
    pub fn is_dir(&self) -> bool {
        matches!(self, Entry::Directory(_))
    }

    /// Returns true for files
    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File(_))
    }

    /// Borrows the directory, if this is one
    pub fn as_dir(&self) -> Option<&Directory> {
        match self {
            Entry::Directory(d) => Some(d),
            Entry::File(_) => None,
        }
    }

    /// Borrows the file, if this is one
    pub fn as_file(&self) -> Option<&File> {
        match self {
            Entry::File(f) => Some(f),
            Entry::Directory(_) => None,
        }
    }

    /// Converts into a directory, failing with an illegal-state error for files
    pub fn into_dir(self) -> Result<Directory> {
        match self {
            Entry::Directory(d) => Ok(d),
            Entry::File(f) => Err(FtpError::IllegalState(format!("{} is not a directory", f.name()))),
        }
    }

    /// Converts into a file, failing with an illegal-state error for directories
    pub fn into_file(self) -> Result<File> {
        match self {
            Entry::File(f) => Ok(f),
            Entry::Directory(d) => Err(FtpError::IllegalState(format!("{} is not a file", d.name()))),
        }
    }
}

impl RemoteEntry for Entry {
    fn info(&self) -> &EntryInfo {
        match self {
            Entry::Directory(d) => d.info(),
            Entry::File(f) => f.info(),
        }
    }

    fn info_mut(&mut self) -> &mut EntryInfo {
        match self {
            Entry::Directory(d) => d.info_mut(),
            Entry::File(f) => f.info_mut(),
        }
    }
}

impl From<Directory> for Entry {
    fn from(dir: Directory) -> Self {
        Entry::Directory(dir)
    }
}

impl From<File> for Entry {
    fn from(file: File) -> Self {
        Entry::File(file)
    }
}

impl fmt::Display for EntryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (perms={:03}, links={}, owner={}:{}, size={}, modified={})",
            self.name,
            self.permissions,
            self.numlinks,
            self.user.as_deref().unwrap_or("-"),
            self.group.as_deref().unwrap_or("-"),
            self.size,
            self.modified.map(|d| d.to_string()).unwrap_or_else(|| "unknown".to_string()),
        )
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Directory {}", self.info)
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File {}", self.info)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Directory(d) => d.fmt(f),
            Entry::File(file) => file.fmt(f),
        }
    }
}

// Used by PWD handling to turn `"C:\dir"` style answers into a root path.
pub(crate) fn root_from_pwd(message: &str) -> Result<Directory> {
    let path = reply::quoted(message).ok_or_else(|| FtpError::Protocol(format!("Cannot determine root directory from \"{message}\"")))?;
    Ok(Directory::new(&path.replace('\\', "/")))
}
