//! Looking up, creating and removing entries below a [`Directory`], plus whole-file transfers.

use super::{
    connection::Connection,
    entry::{self, Directory, Entry, File, RemoteEntry},
    entry_list::EntryList,
    error::{FtpError, Result},
    transfer::{Transfer, TransferListener, TransferMode},
};
use std::io::{Read, Write};

impl Directory {
    /// Lists the content of this directory in the dialect of the connection.
    pub fn entries(&self, conn: &mut Connection) -> Result<EntryList> {
        let parser = conn.parser()?;
        let command = format!("{} {}", parser.list_command(), self.name());
        let cannot_list = |reason: String| FtpError::io(format!("Cannot list \"{}\"", self.name()), reason);
        match conn.retrieve_lines(&command) {
            Ok(Some(lines)) => Ok(EntryList::new(lines, self.name(), parser)),
            Ok(None) => Err(cannot_list("no listing returned".to_string())),
            Err(e @ FtpError::UnexpectedReply { .. }) => Err(cannot_list(e.to_string())),
            Err(e) => Err(e),
        }
    }

    /// Looks up a single entry below this directory with `LIST -ald`. `name` may contain
    /// slashes to reach into subdirectories.
    pub fn find_entry(&self, conn: &mut Connection, name: &str) -> Result<Option<Entry>> {
        let path = format!("{}{}", self.name(), name);
        let Some(mut lines) = conn.listing_of(&path, Some("-ald"))? else {
            return Ok(None);
        };

        // Some servers ignore -d and list the directory's content, starting with ".".
        let mut line = lines.swap_remove(0);
        if !lines.is_empty() {
            if !line.ends_with('.') {
                return Err(FtpError::Protocol(format!(
                    "List \"{}\" yielded {} results, expected 1",
                    path,
                    lines.len() + 1
                )));
            }
            line.pop();
            line.push_str(entry::basename(name));
        }

        let base = match name.trim_end_matches('/').rfind('/') {
            Some(pos) => format!("{}{}", self.name(), &name[..=pos]),
            None => self.name().to_string(),
        };
        let parser = conn.parser()?.long_listing();
        parser.entry_from(&line, &base, None).map(Some)
    }

    /// Whether a file called `name` exists. Fails if `name` is a directory.
    pub fn has_file(&self, conn: &mut Connection, name: &str) -> Result<bool> {
        Ok(self.lookup_file(conn, name)?.is_some())
    }

    /// The existing file `name`.
    pub fn get_file(&self, conn: &mut Connection, name: &str) -> Result<File> {
        self.lookup_file(conn, name)?
            .ok_or_else(|| FtpError::NotFound(format!("File \"{name}\" not found")))
    }

    /// A placeholder for a file that does not exist yet, to upload to.
    pub fn new_file(&self, conn: &mut Connection, name: &str) -> Result<File> {
        if let Some(existing) = self.find_entry(conn, name)? {
            return Err(FtpError::IllegalState(format!("File \"{name}\" already exists ({existing})")));
        }
        Ok(File::new(&format!("{}{}", self.name(), name)))
    }

    /// The file `name`, or a placeholder if it does not exist.
    pub fn file(&self, conn: &mut Connection, name: &str) -> Result<File> {
        match self.lookup_file(conn, name)? {
            Some(file) => Ok(file),
            None => Ok(File::new(&format!("{}{}", self.name(), name))),
        }
    }

    /// Whether a directory called `name` exists. Fails if `name` is a file.
    pub fn has_dir(&self, conn: &mut Connection, name: &str) -> Result<bool> {
        Ok(self.lookup_dir(conn, name)?.is_some())
    }

    /// The existing directory `name`.
    pub fn get_dir(&self, conn: &mut Connection, name: &str) -> Result<Directory> {
        self.lookup_dir(conn, name)?
            .ok_or_else(|| FtpError::NotFound(format!("Directory \"{name}\" not found")))
    }

    /// Creates the directory `name`, which must not exist yet.
    pub fn new_dir(&self, conn: &mut Connection, name: &str) -> Result<Directory> {
        if let Some(existing) = self.find_entry(conn, name)? {
            return Err(FtpError::IllegalState(format!("Directory \"{name}\" already exists ({existing})")));
        }
        self.make_dir(conn, name)
    }

    /// The directory `name`, created if it does not exist.
    pub fn dir(&self, conn: &mut Connection, name: &str) -> Result<Directory> {
        match self.lookup_dir(conn, name)? {
            Some(dir) => Ok(dir),
            None => self.make_dir(conn, name),
        }
    }

    /// Removes this directory with `RMD`.
    pub fn delete(&self, conn: &mut Connection) -> Result<()> {
        conn.command(&format!("RMD {}", self.name()), &[250]).map(|_| ())
    }

    fn lookup_file(&self, conn: &mut Connection, name: &str) -> Result<Option<File>> {
        match self.find_entry(conn, name)? {
            None => Ok(None),
            Some(Entry::File(file)) => Ok(Some(file)),
            Some(Entry::Directory(_)) => Err(FtpError::IllegalState(format!("File \"{name}\" is a directory"))),
        }
    }

    fn lookup_dir(&self, conn: &mut Connection, name: &str) -> Result<Option<Directory>> {
        match self.find_entry(conn, name)? {
            None => Ok(None),
            Some(Entry::Directory(dir)) => Ok(Some(dir)),
            Some(Entry::File(_)) => Err(FtpError::IllegalState(format!("Directory \"{name}\" is a file"))),
        }
    }

    fn make_dir(&self, conn: &mut Connection, name: &str) -> Result<Directory> {
        conn.command(&format!("MKD {}{}", self.name(), name), &[257])?;
        match self.find_entry(conn, name)? {
            Some(Entry::Directory(dir)) => Ok(dir),
            Some(Entry::File(_)) => Err(FtpError::Protocol(format!(
                "MKD \"{name}\" succeeded but directory listing reveals a file"
            ))),
            None => Err(FtpError::Protocol(format!(
                "MKD \"{name}\" succeeded but the created directory cannot be found"
            ))),
        }
    }
}

impl File {
    /// Removes this file with `DELE`.
    pub fn delete(&self, conn: &mut Connection) -> Result<()> {
        conn.command(&format!("DELE {}", self.name()), &[250]).map(|_| ())
    }

    /// Re-reads the metadata of this file from a `LIST` of it.
    pub fn refresh(&mut self, conn: &mut Connection) -> Result<()> {
        let cannot_refresh = |reason: String| FtpError::io(format!("Cannot refresh \"{}\"", self.name()), reason);
        let lines = match conn.listing_of(self.name(), None)? {
            Some(lines) if lines.len() == 1 => lines,
            Some(lines) => return Err(cannot_refresh(format!("{} listing lines, expected 1", lines.len()))),
            None => return Err(cannot_refresh("file does not exist".to_string())),
        };
        let base = format!("{}/", entry::dirname(self.name()));
        let parsed = conn.parser()?.long_listing().entry_from(&lines[0], &base, None)?;
        let mut info = parsed.info().clone();
        info.name = self.name().to_string();
        self.replace_info(info);
        Ok(())
    }

    /// Uploads everything `source` yields to this file, then refreshes its metadata.
    pub fn upload_from<R: Read>(
        &mut self,
        conn: &mut Connection,
        source: R,
        mode: TransferMode,
        listener: Option<&dyn TransferListener>,
    ) -> Result<()> {
        let mut transfer = Transfer::upload(self, source);
        if let Some(listener) = listener {
            transfer = transfer.with_listener(listener);
        }
        transfer.run(conn, mode)?;
        drop(transfer);
        self.refresh(conn)
    }

    /// Downloads this file into `sink`.
    pub fn download_to<W: Write>(
        &self,
        conn: &mut Connection,
        sink: W,
        mode: TransferMode,
        listener: Option<&dyn TransferListener>,
    ) -> Result<()> {
        let mut transfer = Transfer::download(self, sink);
        if let Some(listener) = listener {
            transfer = transfer.with_listener(listener);
        }
        transfer.run(conn, mode)
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{
        Directory, Entry, ErrorKind, File, RemoteEntry, Transfer, TransferListener, TransferMode, testing::MockServer,
    };
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    const LISTING: &str = "drwxr-xr-x   2 ftp ftp 4096 Apr  4  2009 .\r\n\
                           drwxr-xr-x  10 ftp ftp 4096 Apr  4  2009 ..\r\n\
                           -rw-r--r--   1 ftp ftp  512 Apr  4  2009 index.html\r\n\
                           drwxr-xr-x   2 ftp ftp 4096 Apr  4  2009 images\r\n";

    fn listing(server: &MockServer, payload: &str) {
        server
            .pasv()
            .serve(payload.as_bytes())
            .reply("150 Here comes the directory listing")
            .reply("226 Directory send OK");
    }

    #[test]
    fn entries_of_directory() {
        let server = MockServer::new();
        let mut conn = server.connected();
        listing(&server, LISTING);

        let list = Directory::new("/htdocs").entries(&mut conn).unwrap();
        let names: Vec<String> = list.iter().map(|e| e.unwrap().name().to_string()).collect();
        assert_eq!(names, ["/htdocs/index.html", "/htdocs/images/"]);
        assert_eq!(list.size(), 2);
        assert_eq!(server.commands(), ["PASV", "LIST -a /htdocs/"]);
    }

    #[test]
    fn entries_with_mlsd() {
        let server = MockServer::new();
        let mut conn = server.connected();
        conn.set_parser(crate::client::ListingParser::Mlsx).unwrap();
        listing(
            &server,
            "type=cdir;modify=20190219174820; .\r\n\
             type=pdir;modify=20190219174820; ..\r\n\
             type=file;size=3;modify=20190219174820; a.txt\r\n",
        );

        let list = Directory::new("/").entries(&mut conn).unwrap();
        let entry = list.first().unwrap().unwrap();
        assert_eq!(entry.name(), "/a.txt");
        assert_eq!(entry.size(), 3);
        assert_eq!(server.commands(), ["PASV", "MLSD /"]);
    }

    #[test]
    fn entries_of_missing_directory() {
        let server = MockServer::new();
        let mut conn = server.connected();
        server.pasv().reply("550 No such directory");

        let err = Directory::new("/gone").entries(&mut conn).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().starts_with("Cannot list \"/gone/\""));
    }

    #[test]
    fn find_single_file() {
        let server = MockServer::new();
        let mut conn = server.connected();
        listing(&server, "-rw-r--r--   1 ftp ftp  512 Apr  4  2009 index.html\r\n");

        let found = Directory::new("/htdocs").find_entry(&mut conn, "index.html").unwrap().unwrap();
        assert!(found.is_file());
        assert_eq!(found.name(), "/htdocs/index.html");
        assert_eq!(found.size(), 512);
        assert_eq!(server.commands(), ["PASV", "LIST -ald /htdocs/index.html"]);
    }

    #[test]
    fn find_entry_corrects_expanded_listing() {
        let server = MockServer::new();
        let mut conn = server.connected();
        listing(&server, LISTING);

        let found = Directory::new("/htdocs").find_entry(&mut conn, "images").unwrap().unwrap();
        assert!(found.is_dir());
        assert_eq!(found.name(), "/htdocs/images/");
    }

    #[test]
    fn find_entry_rejects_ambiguous_listing() {
        let server = MockServer::new();
        let mut conn = server.connected();
        listing(&server, "-rw-r--r-- 1 ftp ftp 1 Apr  4  2009 a\r\n-rw-r--r-- 1 ftp ftp 1 Apr  4  2009 b\r\n");

        let err = Directory::new("/").find_entry(&mut conn, "a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn find_entry_in_subdirectory() {
        let server = MockServer::new();
        let mut conn = server.connected();
        listing(&server, "-rw-r--r--   1 ftp ftp  42 Apr  4  2009 logo.png\r\n");

        let found = Directory::new("/htdocs").find_entry(&mut conn, "images/logo.png").unwrap().unwrap();
        assert_eq!(found.name(), "/htdocs/images/logo.png");
    }

    #[test]
    fn find_entry_not_found() {
        let server = MockServer::new();
        let mut conn = server.connected();
        server.pasv().reply("550 No such file");
        assert_eq!(Directory::new("/").find_entry(&mut conn, "nothing").unwrap(), None);
    }

    #[test]
    fn type_mismatches() {
        let server = MockServer::new();
        let mut conn = server.connected();
        let dir = Directory::new("/htdocs");

        listing(&server, "drwxr-xr-x 2 ftp ftp 4096 Apr  4  2009 images\r\n");
        assert_eq!(dir.get_file(&mut conn, "images").unwrap_err().kind(), ErrorKind::IllegalState);

        listing(&server, "-rw-r--r-- 1 ftp ftp 1 Apr  4  2009 index.html\r\n");
        assert_eq!(dir.has_dir(&mut conn, "index.html").unwrap_err().kind(), ErrorKind::IllegalState);

        server.pasv().reply("550 No such file");
        assert_eq!(dir.get_dir(&mut conn, "missing").unwrap_err().kind(), ErrorKind::NotFound);

        listing(&server, "-rw-r--r-- 1 ftp ftp 1 Apr  4  2009 index.html\r\n");
        assert_eq!(dir.new_file(&mut conn, "index.html").unwrap_err().kind(), ErrorKind::IllegalState);
    }

    #[test]
    fn file_placeholder() {
        let server = MockServer::new();
        let mut conn = server.connected();
        server.pasv().reply("550 No such file");

        let file = Directory::new("/htdocs").file(&mut conn, "new.txt").unwrap();
        assert_eq!(file, File::new("/htdocs/new.txt"));
        assert_eq!(file.size(), 0);
    }

    #[test]
    fn new_dir_issues_mkd() {
        let server = MockServer::new();
        let mut conn = server.connected();
        server.pasv().reply("550 No such file");
        server.reply("257 \"/htdocs/css\" created");
        listing(&server, "drwxr-xr-x 2 ftp ftp 4096 Apr  4  2009 css\r\n");

        let created = Directory::new("/htdocs").new_dir(&mut conn, "css").unwrap();
        assert_eq!(created.name(), "/htdocs/css/");
        assert_eq!(
            server.commands(),
            ["PASV", "LIST -ald /htdocs/css", "MKD /htdocs/css", "PASV", "LIST -ald /htdocs/css"]
        );
    }

    #[test]
    fn new_dir_that_turns_out_a_file() {
        let server = MockServer::new();
        let mut conn = server.connected();
        server.pasv().reply("550 No such file");
        server.reply("257 \"/css\" created");
        listing(&server, "-rw-r--r-- 1 ftp ftp 1 Apr  4  2009 css\r\n");

        let err = Directory::new("/").dir(&mut conn, "css").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn delete_entries() {
        let server = MockServer::new();
        let mut conn = server.connected();
        server.reply("250 Removed").reply("250 Deleted").reply("550 Permission denied");

        Directory::new("/old").delete(&mut conn).unwrap();
        File::new("/old.txt").delete(&mut conn).unwrap();
        assert_eq!(File::new("/etc/passwd").delete(&mut conn).unwrap_err().reply_code(), Some(550));
        assert_eq!(server.commands(), ["RMD /old/", "DELE /old.txt", "DELE /etc/passwd"]);
    }

    #[test]
    fn refresh_replaces_metadata() {
        let server = MockServer::new();
        let mut conn = server.connected();
        listing(&server, "-rwxr-x---   3 www www  1024 Apr  4  2009 run.sh\r\n");

        let mut file = File::new("/bin/run.sh");
        file.refresh(&mut conn).unwrap();
        assert_eq!(file.name(), "/bin/run.sh");
        assert_eq!(file.permissions(), 750);
        assert_eq!(file.numlinks(), 3);
        assert_eq!(file.user(), Some("www"));
        assert_eq!(file.size(), 1024);
        assert_eq!(server.commands(), ["PASV", "LIST /bin/run.sh"]);
    }

    #[test]
    fn refresh_of_missing_file() {
        let server = MockServer::new();
        let mut conn = server.connected();
        server.pasv().reply("550 No such file");

        let err = File::new("/gone").refresh(&mut conn).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn upload_then_refresh() {
        let server = MockServer::new();
        let mut conn = server.connected();
        server
            .reply("200 Type set to I")
            .pasv()
            .serve(b"")
            .reply("150 Ok to send data")
            .reply("226 Transfer complete")
            .reply("200 Type set to A");
        listing(&server, "-rw-r--r--   1 ftp ftp  5 Apr  4  2009 hello.txt\r\n");

        let mut file = File::new("/hello.txt");
        file.upload_from(&mut conn, &b"hello"[..], TransferMode::Binary, None).unwrap();
        assert_eq!(file.size(), 5);
        assert_eq!(server.uploads(), [b"hello".to_vec()]);
    }

    #[test]
    fn download_into_buffer() {
        let server = MockServer::new();
        let mut conn = server.connected();
        server
            .reply("200 Type set to A")
            .pasv()
            .serve(b"line 1\r\nline 2\r\n")
            .reply("150 Opening ASCII mode data connection")
            .reply("226 Transfer complete");

        let mut sink = Vec::new();
        File::new("/notes.txt").download_to(&mut conn, &mut sink, TransferMode::Ascii, None).unwrap();
        assert_eq!(sink, b"line 1\r\nline 2\r\n");
        assert_eq!(server.commands(), ["TYPE A", "PASV", "RETR /notes.txt"]);
    }

    #[test]
    fn download_aborted_by_listener() {
        struct StopEarly(Cell<bool>);

        impl TransferListener for StopEarly {
            fn transferred(&self, t: &Transfer<'_>) {
                t.request_abort();
            }
            fn completed(&self, _t: &Transfer<'_>) {
                self.0.set(true);
            }
        }

        let server = MockServer::new();
        let mut conn = server.connected();
        server
            .reply("200 Type set to I")
            .pasv()
            .serve(&[b'x'; 20_000])
            .reply("150 Opening BINARY mode data connection")
            .reply("426 Connection closed; transfer aborted");

        let listener = StopEarly(Cell::new(false));
        let mut sink = Vec::new();
        let err = File::new("/big.bin")
            .download_to(&mut conn, &mut sink, TransferMode::Binary, Some(&listener))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransferAborted);
        assert!(!listener.0.get());
        assert_eq!(sink.len(), 8192);
        assert_eq!(server.pending_replies(), 0);
        assert_eq!(server.commands(), ["TYPE I", "PASV", "RETR /big.bin"]);
    }

    #[test]
    fn entry_conversion_errors() {
        let entry = Entry::from(File::new("/a"));
        assert_eq!(entry.into_dir().unwrap_err().kind(), ErrorKind::IllegalState);
    }
}
