use super::error::{FtpError, Result};
use std::fmt;

/// A reply read from the control channel, one entry per line with line terminators removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    lines: Vec<String>,
}

impl Response {
    /// Wraps the given lines
    pub fn new(lines: Vec<String>) -> Self {
        Response { lines }
    }

    /// Splits a raw reply on `\n` and drops the trailing CRLF.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim_end_matches(['\r', '\n']);
        Response {
            lines: trimmed.split('\n').map(|l| l.trim_end_matches('\r').to_string()).collect(),
        }
    }

    /// All lines of the reply
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The first line, which carries the status code
    pub fn first_line(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or_default()
    }

    /// Parses the leading status code and message of the first line.
    pub fn status(&self) -> Result<(u32, &str)> {
        let line = self.first_line();
        let digits = line.get(..3).filter(|d| d.bytes().all(|b| b.is_ascii_digit()));
        let code = digits
            .and_then(|d| d.parse::<u32>().ok())
            .ok_or_else(|| FtpError::Protocol(format!("Malformed response \"{line}\"")))?;
        let message = line.get(4..).unwrap_or_default();
        Ok((code, message))
    }

    /// Returns the status code, failing when the reply does not start with one.
    pub fn code(&self) -> Result<u32> {
        self.status().map(|(code, _)| code)
    }

    /// Checks the status code against the acceptable ones and returns the message.
    pub fn expect(&self, acceptable: &[u32]) -> Result<String> {
        let (code, message) = self.status()?;
        if acceptable.contains(&code) {
            Ok(message.to_string())
        } else {
            Err(self.unexpected(acceptable))
        }
    }

    /// The error describing that this reply is not one of `acceptable`.
    pub fn unexpected(&self, acceptable: &[u32]) -> FtpError {
        match self.status() {
            Ok((code, message)) => FtpError::UnexpectedReply {
                code,
                message: message.to_string(),
                expected: acceptable.to_vec(),
            },
            Err(e) => e,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

/// Returns the text between the first pair of double quotes, as found in `257` replies.
pub(crate) fn quoted(message: &str) -> Option<&str> {
    let start = message.find('"')? + 1;
    let len = message[start..].find('"')?;
    Some(&message[start..start + len])
}

/// Parses the `(h1,h2,h3,h4,p1,p2)` part of a `227` reply into a host and port.
pub(crate) fn passive_address(message: &str) -> Option<(String, u16)> {
    let start = message.find('(')? + 1;
    let end = start + message[start..].find(')')?;
    let numbers = message[start..end]
        .split(',')
        .map(|n| n.trim().parse::<u8>())
        .collect::<std::result::Result<Vec<u8>, _>>()
        .ok()?;
    match numbers.as_slice() {
        [h1, h2, h3, h4, p1, p2] => Some((format!("{h1}.{h2}.{h3}.{h4}"), u16::from(*p1) * 256 + u16::from(*p2))),
        _ => None,
    }
}
