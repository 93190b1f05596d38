use super::error::ParseError;
use super::parser::{Line, parse};

use pretty_assertions::assert_eq;

fn line(verb: &str, arg: Option<&str>) -> Line {
    Line {
        verb: verb.to_string(),
        arg: arg.map(str::to_string),
    }
}

#[test]
fn parse_user_cmd_crnl() {
    let input = "USER Dolores\r\n";
    assert_eq!(parse(input).unwrap(), line("USER", Some("Dolores")));
}

#[test]
fn parse_user_cmd_mixed_case() {
    let input = "uSeR Dolores\r\n";
    assert_eq!(parse(input).unwrap(), line("USER", Some("Dolores")));
}

#[test]
// Not all clients include the (actually mandatory) '\r'
fn parse_user_cmd_nl() {
    let input = "USER Dolores\n";
    assert_eq!(parse(input).unwrap(), line("USER", Some("Dolores")));
}

#[test]
// Although we accept requests ending in only '\n', we won't accept requests ending only in '\r'
fn parse_user_cmd_cr() {
    let input = "USER Dolores\r";
    assert_eq!(parse(input), Err(ParseError::InvalidEol));
}

#[test]
fn parse_user_cmd_no_eol() {
    let input = "USER Dolores";
    assert_eq!(parse(input), Err(ParseError::InvalidEol));
}

#[test]
// We should skip only one space after a token, to allow for tokens starting with a space.
fn parse_user_cmd_double_space() {
    let input = "USER  Dolores\r\n";
    assert_eq!(parse(input).unwrap(), line("USER", Some(" Dolores")));
}

#[test]
fn parse_argument_with_spaces() {
    let input = "STOR my holiday pictures.zip\r\n";
    assert_eq!(parse(input).unwrap(), line("STOR", Some("my holiday pictures.zip")));
}

#[test]
fn parse_list_with_options() {
    let input = "LIST -ald /htdocs/index.html\r\n";
    assert_eq!(parse(input).unwrap(), line("LIST", Some("-ald /htdocs/index.html")));
}

#[test]
fn parse_verb_without_argument() {
    assert_eq!(parse("PWD\r\n").unwrap(), line("PWD", None));
    assert_eq!(parse("pasv \r\n").unwrap(), line("PASV", None));
}

#[test]
fn parse_empty_line() {
    assert_eq!(parse("\r\n"), Err(ParseError::InvalidCommand));
}

#[test]
fn parse_verb_with_digits() {
    assert_eq!(parse("US3R x\r\n"), Err(ParseError::InvalidCommand));
}

#[test]
fn parse_invalid_utf8_argument() {
    let input: &[u8] = b"CWD \xff\xfe\r\n";
    assert_eq!(parse(input), Err(ParseError::InvalidUtf8));
}

#[test]
fn password_is_not_shown() {
    let parsed = parse("PASS s3cr3t\r\n").unwrap();
    assert_eq!(format!("{parsed:?}"), "Line { verb: \"PASS\", arg: Some(\"********\") }");
}
