use super::error::{ParseError, Result};

use bytes::Bytes;
use std::{fmt, str};

/// One command line from the client: the verb in upper case and whatever followed it.
#[derive(Clone, PartialEq, Eq)]
pub struct Line {
    pub verb: String,
    pub arg: Option<String>,
}

// PASS arguments stay out of logs.
impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arg = match (&*self.verb, &self.arg) {
            ("PASS", Some(_)) => Some("********"),
            (_, arg) => arg.as_deref(),
        };
        f.debug_struct("Line").field("verb", &self.verb).field("arg", &arg).finish()
    }
}

/// Parse the given bytes into a [`Line`].
///
/// The line must end in `\n` (optionally preceded by `\r`). Verbs are case insensitive. Exactly
/// one space separates the verb from its argument, so arguments may start with a space.
pub fn parse<T>(line: T) -> Result<Line>
where
    T: AsRef<[u8]> + Into<Bytes>,
{
    let vec = line.into().to_vec();
    let body = strip_eol(&vec)?;
    let mut iter = body.splitn(2, |&b| b == b' ');
    let verb = match iter.next() {
        Some(token) if !token.is_empty() => normalize(token)?,
        _ => return Err(ParseError::InvalidCommand),
    };
    let arg = match iter.next() {
        Some(params) if !params.is_empty() => Some(String::from(str::from_utf8(params)?)),
        _ => None,
    };
    Ok(Line { verb, arg })
}

fn strip_eol(bytes: &[u8]) -> Result<&[u8]> {
    match bytes {
        [body @ .., b'\r', b'\n'] => Ok(body),
        [body @ .., b'\n'] => Ok(body),
        _ => Err(ParseError::InvalidEol),
    }
}

/// Try to convert a buffer of bytes into an upper case verb. Verbs are plain ASCII letters.
fn normalize(token: &[u8]) -> Result<String> {
    if !token.iter().all(u8::is_ascii_alphabetic) {
        return Err(ParseError::InvalidCommand);
    }
    Ok(str::from_utf8(token)?.to_uppercase())
}
