use super::{
    entry::{Entry, RemoteEntry},
    error::Result,
    listing::ListingParser,
};
use chrono::NaiveDateTime;

/// The raw lines of a directory listing together with what is needed to parse them.
///
/// Lines are parsed on every iteration, so iterating twice yields the same entries. The `.` and
/// `..` entries are skipped wherever they appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryList {
    lines: Vec<String>,
    base: String,
    parser: ListingParser,
    reference: Option<NaiveDateTime>,
}

impl EntryList {
    /// Creates a list of `lines` living in the directory `base` (which ends with `/`).
    pub fn new(lines: Vec<String>, base: impl Into<String>, parser: ListingParser) -> Self {
        EntryList {
            lines,
            base: base.into(),
            parser,
            reference: None,
        }
    }

    /// Resolves compact Unix dates against `reference` instead of the current time.
    pub fn with_reference_date(mut self, reference: NaiveDateTime) -> Self {
        self.reference = Some(reference);
        self
    }

    /// The number of lines minus two, for the `.` and `..` entries servers normally send.
    ///
    /// This is not a recount: a listing without dot entries reports two entries less than it
    /// holds, and an empty listing reports `-2`.
    pub fn size(&self) -> i64 {
        self.lines.len() as i64 - 2
    }

    /// Whether [`size`](Self::size) is zero
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// The unparsed listing lines
    pub fn raw_lines(&self) -> &[String] {
        &self.lines
    }

    /// The directory the lines were listed from
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Parses the lines one by one, skipping `.` and `..`.
    pub fn iter(&self) -> impl Iterator<Item = Result<Entry>> + '_ {
        let current = format!("{}./", self.base);
        let parent = format!("{}../", self.base);
        self.lines
            .iter()
            .map(move |line| self.parser.entry_from(line, &self.base, self.reference))
            .filter(move |entry| match entry {
                Ok(e) => e.name() != current && e.name() != parent,
                Err(_) => true,
            })
    }

    /// The first entry that is not `.` or `..`
    pub fn first(&self) -> Option<Result<Entry>> {
        self.iter().next()
    }

    /// Parses all lines into a vector, failing on the first unparseable line.
    pub fn to_vec(&self) -> Result<Vec<Entry>> {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for &'a EntryList {
    type Item = Result<Entry>;
    type IntoIter = Box<dyn Iterator<Item = Result<Entry>> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|l| l.to_string()).collect()
    }

    fn names(list: &EntryList) -> Vec<String> {
        list.iter().map(|e| e.unwrap().name().to_string()).collect()
    }

    const DOT: &str = "drwx---r-t 37 p159995 ftpusers 4096 Apr 4 2009 .";
    const DOTDOT: &str = "drwxr-xr-x 23 p159995 ftpusers 4096 Apr 4 2009 ..";
    const HTDOCS: &str = "drwxr-xr-x 2 p159995 ftpusers 4096 Apr 4 2009 htdocs";
    const WRITE: &str = "-rw----r-- 1 p159995 ftpusers 415 May 23 2000 write.html";

    #[test]
    fn dot_entries_first() {
        let list = EntryList::new(lines(&[DOT, DOTDOT, HTDOCS, WRITE]), "/", ListingParser::Unix);
        assert_eq!(names(&list), ["/htdocs/", "/write.html"]);
        assert_eq!(list.size(), 2);
        assert!(!list.is_empty());
    }

    #[test]
    fn dot_entries_anywhere() {
        let list = EntryList::new(lines(&[HTDOCS, DOT, WRITE, DOTDOT]), "/", ListingParser::Unix);
        assert_eq!(names(&list), ["/htdocs/", "/write.html"]);
        let list = EntryList::new(lines(&[HTDOCS, WRITE, DOT, DOTDOT]), "/", ListingParser::Unix);
        assert_eq!(names(&list), ["/htdocs/", "/write.html"]);
    }

    #[test]
    fn only_dot_entries() {
        let list = EntryList::new(lines(&[DOT, DOTDOT]), "/", ListingParser::Unix);
        assert_eq!(list.size(), 0);
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
        assert!(list.first().is_none());
    }

    #[test]
    fn size_without_dot_entries_is_two_short() {
        let list = EntryList::new(lines(&[HTDOCS, WRITE]), "/", ListingParser::Unix);
        assert_eq!(list.size(), 0);
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 2);
        assert_eq!(EntryList::new(vec![], "/", ListingParser::Unix).size(), -2);
    }

    #[test]
    fn iteration_is_restartable() {
        let list = EntryList::new(lines(&[DOT, DOTDOT, HTDOCS, WRITE]), "/", ListingParser::Unix);
        assert_eq!(names(&list), names(&list));
        assert_eq!(list.to_vec().unwrap().len(), 2);
        let mut seen = 0;
        for entry in &list {
            assert!(entry.is_ok());
            seen += 1;
        }
        assert_eq!(seen, 2);
    }

    #[test]
    fn entries_live_in_base() {
        let list = EntryList::new(lines(&[DOT, WRITE]), "/htdocs/", ListingParser::Unix);
        assert_eq!(names(&list), ["/htdocs/write.html"]);
        assert_eq!(list.first().unwrap().unwrap().name(), "/htdocs/write.html");
    }

    #[test]
    fn mlsx_cdir_and_pdir_are_skipped() {
        let list = EntryList::new(
            lines(&[
                "type=cdir;modify=20090404000000; .",
                "type=pdir;modify=20090404000000; ..",
                "type=file;size=8;modify=20090404000000; index.html",
            ]),
            "/htdocs/",
            ListingParser::Mlsx,
        );
        assert_eq!(names(&list), ["/htdocs/index.html"]);
    }

    #[test]
    fn parse_errors_surface() {
        let list = EntryList::new(lines(&[DOT, "garbage"]), "/", ListingParser::Unix);
        assert!(list.to_vec().is_err());
    }
}
