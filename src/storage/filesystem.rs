use super::{ByteStream, EntryType, Error, ErrorKind, Permissions, Result, Storage, StorageEntry, resolve};

use async_trait::async_trait;
use cap_std::fs::{Dir, Metadata, OpenOptions};
use chrono::{DateTime, Local, NaiveDateTime};
use dashmap::DashMap;
use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::task::spawn_blocking;

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        use cap_std::fs::{MetadataExt, PermissionsExt};
    }
}

/// A [`Storage`] back-end that serves a local directory, like a traditional FTP server.
///
/// Clients see the directory as `/` and cannot climb above it with `..`. Every client keeps its
/// own working directory.
///
/// ```no_run
/// use libftpkit::storage::Filesystem;
///
/// let storage = Filesystem::new(std::env::temp_dir())?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct Filesystem {
    root_fd: Arc<Dir>,
    bases: DashMap<String, String>,
}

// Maps a normalized virtual path onto a path relative to the root directory.
fn strip_prefixes(path: &str) -> PathBuf {
    match path.trim_start_matches('/') {
        "" => PathBuf::from("."),
        relative => PathBuf::from(relative),
    }
}

// cap-std is blocking, so calls are moved onto tokio's blocking pool.
async fn asyncify<F, T>(f: F) -> io::Result<T>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match spawn_blocking(f).await {
        Ok(res) => res,
        Err(_) => Err(io::Error::other("background task failed")),
    }
}

impl Filesystem {
    /// Create a new Filesystem back-end, with the given root. No operations can take place
    /// outside of the root. For example, when the root is set to `/srv/ftp`, and a client asks
    /// for `hello.txt`, the server will send it `/srv/ftp/hello.txt`.
    ///
    /// The root is opened as a capability: paths, `..` components and symbolic links that would
    /// lead outside of it are refused. Fails when the root cannot be opened as a directory.
    pub fn new<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        let root_fd = Dir::open_ambient_dir(root, cap_std::ambient_authority())?;
        Ok(Filesystem {
            root_fd: Arc::new(root_fd),
            bases: DashMap::new(),
        })
    }

    fn resolve_path(&self, client: &str, uri: &str) -> (String, PathBuf) {
        let virtual_path = self.realname(client, uri);
        let relative = strip_prefixes(&virtual_path);
        (virtual_path, relative)
    }

    async fn metadata(&self, path: PathBuf) -> io::Result<Metadata> {
        let root = Arc::clone(&self.root_fd);
        asyncify(move || root.metadata(path)).await
    }

    async fn symlink_metadata(&self, path: PathBuf) -> io::Result<Metadata> {
        let root = Arc::clone(&self.root_fd);
        asyncify(move || root.symlink_metadata(path)).await
    }

    async fn open_with(&self, path: PathBuf, options: OpenOptions) -> io::Result<tokio::fs::File> {
        let root = Arc::clone(&self.root_fd);
        let file = asyncify(move || root.open_with(path, &options)).await?;
        Ok(tokio::fs::File::from_std(file.into_std()))
    }
}

fn entry_from(virtual_path: &str, meta: &Metadata) -> StorageEntry {
    let entry_type = if meta.is_dir() { EntryType::Collection } else { EntryType::Element };
    let name = match entry_type {
        EntryType::Collection if virtual_path != "/" => format!("{virtual_path}/"),
        _ => virtual_path.to_string(),
    };
    let modified: NaiveDateTime = meta
        .modified()
        .map(cap_std::time::SystemTime::into_std)
        .map(|time| DateTime::<Local>::from(time).naive_local())
        .unwrap_or_default();
    StorageEntry {
        name,
        entry_type,
        size: if meta.is_dir() { 0 } else { meta.len() },
        modified,
        permissions: permissions(meta),
        owner: owner(meta),
        group: group(meta),
        links: links(meta),
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        fn permissions(meta: &Metadata) -> Permissions {
            Permissions(meta.permissions().mode())
        }

        fn owner(meta: &Metadata) -> String {
            meta.uid().to_string()
        }

        fn group(meta: &Metadata) -> String {
            meta.gid().to_string()
        }

        fn links(meta: &Metadata) -> u64 {
            meta.nlink()
        }

        fn set_mode(root: &Dir, path: &Path, mode: u32) -> io::Result<()> {
            let mut perms = root.metadata(path)?.permissions();
            perms.set_mode(mode);
            root.set_permissions(path, perms)
        }
    } else {
        fn permissions(meta: &Metadata) -> Permissions {
            if meta.permissions().readonly() { Permissions(0o555) } else { Permissions(0o755) }
        }

        fn owner(_meta: &Metadata) -> String {
            "ftp".to_string()
        }

        fn group(_meta: &Metadata) -> String {
            "ftp".to_string()
        }

        fn links(_meta: &Metadata) -> u64 {
            1
        }

        fn set_mode(_root: &Dir, _path: &Path, _mode: u32) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::Unsupported))
        }
    }
}

#[async_trait]
impl Storage for Filesystem {
    #[tracing_attributes::instrument(skip(self))]
    async fn set_base(&self, client: &str, uri: &str) -> Result<String> {
        let (virtual_path, path) = self.resolve_path(client, uri);
        let meta = self
            .metadata(path)
            .await
            .map_err(|err| Error::new(ErrorKind::PermanentDirectoryNotAvailable, err))?;
        if !meta.is_dir() {
            return Err(ErrorKind::PermanentDirectoryNotAvailable.into());
        }
        self.bases.insert(client.to_string(), virtual_path.clone());
        Ok(virtual_path)
    }

    fn base(&self, client: &str) -> String {
        self.bases.get(client).map(|base| base.value().clone()).unwrap_or_else(|| "/".to_string())
    }

    #[tracing_attributes::instrument(skip(self))]
    async fn lookup(&self, client: &str, uri: &str) -> Result<Option<StorageEntry>> {
        let (virtual_path, path) = self.resolve_path(client, uri);
        match self.metadata(path).await {
            Ok(meta) => Ok(Some(entry_from(&virtual_path, &meta))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    #[tracing_attributes::instrument(skip(self))]
    async fn create(&self, client: &str, uri: &str, entry_type: EntryType) -> Result<StorageEntry> {
        let (virtual_path, path) = self.resolve_path(client, uri);
        match entry_type {
            EntryType::Collection => {
                let root = Arc::clone(&self.root_fd);
                let dir = path.clone();
                asyncify(move || root.create_dir(dir)).await?;
            }
            EntryType::Element => {
                let mut options = OpenOptions::new();
                options.write(true).create_new(true);
                self.open_with(path.clone(), options).await?;
            }
        }
        let meta = self.metadata(path).await?;
        Ok(entry_from(&virtual_path, &meta))
    }

    #[tracing_attributes::instrument(skip(self))]
    async fn elements(&self, client: &str, uri: &str) -> Result<Vec<StorageEntry>> {
        let (virtual_path, path) = self.resolve_path(client, uri);
        let root = Arc::clone(&self.root_fd);
        let found = asyncify(move || {
            let mut found = Vec::new();
            for dirent in root.read_dir(&path)? {
                let dirent = dirent?;
                let name = dirent.file_name().to_string_lossy().into_owned();
                // Links leading outside of the root are listed as themselves.
                let meta = match root.metadata(path.join(&name)) {
                    Ok(meta) => meta,
                    Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                    Err(_) => match dirent.metadata() {
                        Ok(meta) => meta,
                        Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                        Err(err) => return Err(err),
                    },
                };
                found.push((name, meta));
            }
            Ok(found)
        })
        .await
        .map_err(|err| Error::new(ErrorKind::PermanentDirectoryNotAvailable, err))?;

        Ok(found
            .iter()
            .map(|(name, meta)| entry_from(&resolve(&virtual_path, name), meta))
            .collect())
    }

    #[tracing_attributes::instrument(skip(self))]
    async fn get(&self, client: &str, uri: &str) -> Result<ByteStream> {
        let (_, path) = self.resolve_path(client, uri);
        let mut options = OpenOptions::new();
        options.read(true);
        let file = self.open_with(path, options).await?;
        Ok(Box::new(tokio::io::BufReader::with_capacity(4096, file)) as ByteStream)
    }

    #[tracing_attributes::instrument(skip(self, input))]
    async fn put(&self, client: &str, uri: &str, input: ByteStream) -> Result<u64> {
        let (_, path) = self.resolve_path(client, uri);
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        let file = self.open_with(path, options).await?;

        let mut reader = tokio::io::BufReader::with_capacity(4096, input);
        let mut writer = tokio::io::BufWriter::with_capacity(4096, file);

        let bytes_copied = tokio::io::copy(&mut reader, &mut writer).await?;
        tokio::io::AsyncWriteExt::flush(&mut writer).await?;
        Ok(bytes_copied)
    }

    #[tracing_attributes::instrument(skip(self))]
    async fn delete(&self, client: &str, uri: &str) -> Result<()> {
        let (_, path) = self.resolve_path(client, uri);
        let meta = self.symlink_metadata(path.clone()).await?;
        let root = Arc::clone(&self.root_fd);
        if meta.is_dir() {
            asyncify(move || root.remove_dir(path)).await?;
        } else {
            asyncify(move || root.remove_file(path)).await?;
        }
        Ok(())
    }

    #[tracing_attributes::instrument(skip(self))]
    async fn rename(&self, client: &str, from: &str, to: &str) -> Result<()> {
        let (_, from) = self.resolve_path(client, from);
        let (_, to) = self.resolve_path(client, to);
        match self.symlink_metadata(from.clone()).await {
            Ok(metadata) if metadata.is_file() || metadata.is_dir() => {
                let root = Arc::clone(&self.root_fd);
                asyncify(move || root.rename(from, &root, to))
                    .await
                    .map_err(|e| Error::new(ErrorKind::PermanentFileNotAvailable, e))
            }
            Ok(_) => Err(Error::from(ErrorKind::PermanentFileNotAvailable)),
            Err(e) => Err(Error::new(ErrorKind::PermanentFileNotAvailable, e)),
        }
    }

    #[tracing_attributes::instrument(skip(self))]
    async fn set_permissions(&self, client: &str, uri: &str, mode: u32) -> Result<()> {
        let (_, path) = self.resolve_path(client, uri);
        let root = Arc::clone(&self.root_fd);
        asyncify(move || set_mode(&root, &path, mode)).await.map_err(|err| match err.kind() {
            io::ErrorKind::Unsupported => Error::new(ErrorKind::CommandNotImplemented, err),
            _ => err.into(),
        })
    }

    fn forget(&self, client: &str) {
        self.bases.remove(client);
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    fn storage() -> (TempDir, Filesystem) {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("htdocs")).unwrap();
        std::fs::write(root.path().join("htdocs/index.html"), b"<html/>").unwrap();
        let fs = Filesystem::new(root.path()).unwrap();
        (root, fs)
    }

    #[tokio::test]
    async fn bases_are_per_client() {
        let (_root, fs) = storage();
        assert_eq!(fs.set_base("a", "htdocs").await.unwrap(), "/htdocs");
        assert_eq!(fs.base("a"), "/htdocs");
        assert_eq!(fs.base("b"), "/");
        assert_eq!(fs.realname("a", "index.html"), "/htdocs/index.html");

        fs.forget("a");
        assert_eq!(fs.base("a"), "/");
    }

    #[tokio::test]
    async fn base_must_be_a_directory() {
        let (_root, fs) = storage();
        let err = fs.set_base("a", "/htdocs/index.html").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermanentDirectoryNotAvailable);
        assert_eq!(fs.set_base("a", "/nothing").await.unwrap_err().kind(), ErrorKind::PermanentDirectoryNotAvailable);
        assert_eq!(fs.base("a"), "/");
    }

    #[tokio::test]
    async fn cannot_climb_above_root() {
        let (_root, fs) = storage();
        assert_eq!(fs.set_base("a", "../../..").await.unwrap(), "/");
        let entry = fs.lookup("a", "../htdocs/index.html").await.unwrap().unwrap();
        assert_eq!(entry.name, "/htdocs/index.html");
    }

    #[tokio::test]
    async fn lookup_describes_entries() {
        let (_root, fs) = storage();
        let file = fs.lookup("a", "/htdocs/index.html").await.unwrap().unwrap();
        assert_eq!(file.entry_type, EntryType::Element);
        assert_eq!(file.size, 7);

        let dir = fs.lookup("a", "/htdocs").await.unwrap().unwrap();
        assert!(dir.is_collection());
        assert_eq!(dir.name, "/htdocs/");

        assert_eq!(fs.lookup("a", "/").await.unwrap().unwrap().name, "/");
        assert_eq!(fs.lookup("a", "/missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn elements_of_a_collection() {
        let (_root, fs) = storage();
        fs.create("a", "/htdocs/images", EntryType::Collection).await.unwrap();
        let mut names: Vec<String> = fs.elements("a", "/htdocs").await.unwrap().into_iter().map(|e| e.name).collect();
        names.sort();
        assert_eq!(names, ["/htdocs/images/", "/htdocs/index.html"]);
    }

    #[tokio::test]
    async fn put_then_get() {
        let (_root, fs) = storage();
        let stored = fs.put("a", "/hello.txt", Box::new(&b"hello world"[..])).await.unwrap();
        assert_eq!(stored, 11);

        let mut content = String::new();
        fs.get("a", "/hello.txt").await.unwrap().read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "hello world");
    }

    #[tokio::test]
    async fn create_refuses_existing_names() {
        let (_root, fs) = storage();
        let err = fs.create("a", "/htdocs", EntryType::Collection).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNameNotAllowed);
        let err = fs.create("a", "/htdocs/index.html", EntryType::Element).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNameNotAllowed);
    }

    #[tokio::test]
    async fn delete_and_rename() {
        let (root, fs) = storage();
        fs.rename("a", "/htdocs/index.html", "/htdocs/home.html").await.unwrap();
        assert!(root.path().join("htdocs/home.html").exists());

        let err = fs.delete("a", "/htdocs").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermanentDirectoryNotEmpty);

        fs.delete("a", "/htdocs/home.html").await.unwrap();
        fs.delete("a", "/htdocs").await.unwrap();
        assert!(!root.path().join("htdocs").exists());

        let err = fs.rename("a", "/gone", "/there").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermanentFileNotAvailable);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn chmod_changes_mode_bits() {
        let (_root, fs) = storage();
        fs.set_permissions("a", "/htdocs/index.html", 0o600).await.unwrap();
        let entry = fs.lookup("a", "/htdocs/index.html").await.unwrap().unwrap();
        assert_eq!(entry.permissions.0 & 0o777, 0o600);
    }

    #[tokio::test]
    async fn root_must_be_a_directory() {
        let (root, _fs) = storage();
        assert!(Filesystem::new(root.path().join("htdocs/index.html")).is_err());
        assert!(Filesystem::new(root.path().join("missing")).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_leading_outside_the_root_are_refused() {
        let (root, fs) = storage();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "top secret").unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("link")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), root.path().join("secret.txt")).unwrap();

        assert!(fs.lookup("a", "/link/secret.txt").await.is_err());
        assert!(fs.lookup("a", "/secret.txt").await.is_err());
        assert!(fs.get("a", "/link/secret.txt").await.is_err());
        assert!(fs.get("a", "/secret.txt").await.is_err());
        assert!(fs.set_base("a", "/link").await.is_err());
        assert!(fs.elements("a", "/link").await.is_err());
        assert!(fs.put("a", "/link/secret.txt", Box::new(&b"overwritten"[..])).await.is_err());
        assert!(fs.put("a", "/link/planted.txt", Box::new(&b"planted"[..])).await.is_err());
        assert!(fs.create("a", "/link/sub", EntryType::Collection).await.is_err());
        assert!(fs.delete("a", "/link/secret.txt").await.is_err());
        assert!(fs.rename("a", "/link/secret.txt", "/stolen.txt").await.is_err());

        assert_eq!(std::fs::read_to_string(outside.path().join("secret.txt")).unwrap(), "top secret");
        assert!(!outside.path().join("planted.txt").exists());
        assert!(!outside.path().join("sub").exists());
        assert!(!root.path().join("stolen.txt").exists());

        // the links themselves still show up in a listing of the root
        let mut names: Vec<String> = fs.elements("a", "/").await.unwrap().into_iter().map(|e| e.name).collect();
        names.sort();
        assert_eq!(names, ["/htdocs/", "/link", "/secret.txt"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_inside_the_root_are_followed() {
        let (root, fs) = storage();
        std::os::unix::fs::symlink("htdocs", root.path().join("www")).unwrap();
        let entry = fs.lookup("a", "/www/index.html").await.unwrap().unwrap();
        assert_eq!(entry.size, 7);
        assert_eq!(fs.set_base("a", "/www").await.unwrap(), "/www");
    }
}
