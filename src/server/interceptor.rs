//! Hooks that can veto storage operations before the server carries them out.
//!
//! An [`Interceptor`] is registered together with an [`InterceptorCondition`] deciding which
//! operations it gets to see. When any applicable interceptor returns [`Verdict::Deny`], the
//! client gets `550 Permission denied` and storage is left untouched.
//! [`on_stored`](Interceptor::on_stored) is the exception: it is told about uploads that have
//! already been stored and cannot veto them.

use crate::storage::EntryType;
use regex::Regex;
use std::fmt::Debug;

/// The outcome of an interceptor hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Carry on
    Allow,
    /// Refuse the operation
    Deny,
}

/// The operation an interceptor is asked about.
#[derive(Debug, Clone, Copy)]
pub struct Operation<'a> {
    /// The logged in user
    pub user: &'a str,
    /// Absolute virtual path of the entry operated on; for renames the new name
    pub path: &'a str,
    /// Whether the entry is a file or a directory
    pub entry_type: EntryType,
}

impl Operation<'_> {
    /// The last segment of the path
    pub fn basename(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }
}

/// Vetoes storage operations. Every hook allows by default.
pub trait Interceptor: Send + Sync + Debug {
    /// Changing the working directory
    fn on_cwd(&self, _op: &Operation<'_>) -> Verdict {
        Verdict::Allow
    }

    /// Creating a directory with `MKD`, or a new file with `STOR`
    fn on_create(&self, _op: &Operation<'_>) -> Verdict {
        Verdict::Allow
    }

    /// Invoked after a `STOR` upload was stored completely, just before the client gets its 226.
    fn on_stored(&self, _op: &Operation<'_>) {}

    /// Removing a file or directory
    fn on_delete(&self, _op: &Operation<'_>) -> Verdict {
        Verdict::Allow
    }

    /// Reading a file
    fn on_read(&self, _op: &Operation<'_>) -> Verdict {
        Verdict::Allow
    }

    /// Renaming; the operation carries the new name
    fn on_rename(&self, _op: &Operation<'_>) -> Verdict {
        Verdict::Allow
    }

    /// `SITE CHMOD`
    fn on_change_permissions(&self, _op: &Operation<'_>) -> Verdict {
        Verdict::Allow
    }
}

/// Decides whether an interceptor applies to an operation.
pub trait InterceptorCondition: Send + Sync + Debug {
    /// Returns true when the interceptor should be consulted
    fn check(&self, op: &Operation<'_>) -> bool;
}

/// Applies to operations on paths starting with a prefix.
#[derive(Debug, Clone)]
pub struct PathCondition {
    prefix: String,
}

impl PathCondition {
    /// Matches every path starting with `prefix`, e.g. `/incoming/`.
    pub fn new(prefix: impl Into<String>) -> Self {
        PathCondition { prefix: prefix.into() }
    }
}

impl InterceptorCondition for PathCondition {
    fn check(&self, op: &Operation<'_>) -> bool {
        op.path.starts_with(&self.prefix)
    }
}

/// Only lets files be created or renamed to names matching a pattern. Directories are not
/// checked.
#[derive(Debug, Clone)]
pub struct EntrynameInterceptor {
    pattern: Regex,
}

impl EntrynameInterceptor {
    /// Creates the interceptor from a regular expression matched against file base names.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(EntrynameInterceptor {
            pattern: Regex::new(pattern)?,
        })
    }

    fn check(&self, op: &Operation<'_>) -> Verdict {
        if op.entry_type == EntryType::Collection || self.pattern.is_match(op.basename()) {
            Verdict::Allow
        } else {
            Verdict::Deny
        }
    }
}

impl Interceptor for EntrynameInterceptor {
    fn on_create(&self, op: &Operation<'_>) -> Verdict {
        self.check(op)
    }

    fn on_rename(&self, op: &Operation<'_>) -> Verdict {
        self.check(op)
    }
}

/// The registered interceptors of a server.
#[derive(Debug, Default)]
pub(crate) struct Interceptors {
    registered: Vec<(Box<dyn InterceptorCondition>, Box<dyn Interceptor>)>,
}

impl Interceptors {
    pub fn add(&mut self, condition: Box<dyn InterceptorCondition>, interceptor: Box<dyn Interceptor>) {
        self.registered.push((condition, interceptor));
    }

    /// Runs `hook` on every interceptor whose condition matches, denying on the first veto.
    pub fn check<F>(&self, op: &Operation<'_>, hook: F) -> Verdict
    where
        F: Fn(&dyn Interceptor, &Operation<'_>) -> Verdict,
    {
        let denied = self
            .registered
            .iter()
            .filter(|(condition, _)| condition.check(op))
            .any(|(_, interceptor)| hook(interceptor.as_ref(), op) == Verdict::Deny);
        if denied { Verdict::Deny } else { Verdict::Allow }
    }

    /// Runs `hook` on every interceptor whose condition matches.
    pub fn notify<F>(&self, op: &Operation<'_>, hook: F)
    where
        F: Fn(&dyn Interceptor, &Operation<'_>),
    {
        self.registered
            .iter()
            .filter(|(condition, _)| condition.check(op))
            .for_each(|(_, interceptor)| hook(interceptor.as_ref(), op));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn file(path: &str) -> Operation<'_> {
        Operation {
            user: "alice",
            path,
            entry_type: EntryType::Element,
        }
    }

    #[derive(Debug)]
    struct NoDeletes;

    impl Interceptor for NoDeletes {
        fn on_delete(&self, _op: &Operation<'_>) -> Verdict {
            Verdict::Deny
        }
    }

    #[derive(Debug, Default)]
    struct StoredLog {
        paths: Arc<Mutex<Vec<String>>>,
    }

    impl Interceptor for StoredLog {
        fn on_stored(&self, op: &Operation<'_>) {
            self.paths.lock().unwrap().push(op.path.to_string());
        }
    }

    #[test]
    fn notify_reaches_matching_interceptors_only() {
        let paths = Arc::new(Mutex::new(Vec::new()));
        let mut interceptors = Interceptors::default();
        interceptors.add(Box::new(PathCondition::new("/incoming/")), Box::new(StoredLog { paths: paths.clone() }));

        interceptors.notify(&file("/incoming/a.txt"), |i, op| i.on_stored(op));
        interceptors.notify(&file("/outgoing/b.txt"), |i, op| i.on_stored(op));

        assert_eq!(*paths.lock().unwrap(), ["/incoming/a.txt"]);
    }

    #[test]
    fn entryname_checks_files_only() {
        let interceptor = EntrynameInterceptor::new(r"^[a-z]+\.txt$").unwrap();
        assert_eq!(interceptor.on_create(&file("/in/notes.txt")), Verdict::Allow);
        assert_eq!(interceptor.on_create(&file("/in/notes.exe")), Verdict::Deny);
        assert_eq!(interceptor.on_rename(&file("/in/Notes.txt")), Verdict::Deny);
        assert_eq!(interceptor.on_delete(&file("/in/notes.exe")), Verdict::Allow);

        let dir = Operation {
            entry_type: EntryType::Collection,
            ..file("/in/subdir")
        };
        assert_eq!(interceptor.on_create(&dir), Verdict::Allow);
    }

    #[test]
    fn path_condition_matches_prefix() {
        let condition = PathCondition::new("/incoming/");
        assert!(condition.check(&file("/incoming/a.txt")));
        assert!(!condition.check(&file("/outgoing/a.txt")));
    }

    #[test]
    fn only_matching_interceptors_are_consulted() {
        let mut interceptors = Interceptors::default();
        interceptors.add(Box::new(PathCondition::new("/archive/")), Box::new(NoDeletes));

        assert_eq!(interceptors.check(&file("/archive/2009.tgz"), |i, op| i.on_delete(op)), Verdict::Deny);
        assert_eq!(interceptors.check(&file("/tmp/2009.tgz"), |i, op| i.on_delete(op)), Verdict::Allow);
        assert_eq!(interceptors.check(&file("/archive/2009.tgz"), |i, op| i.on_read(op)), Verdict::Allow);
    }
}
