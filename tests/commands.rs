mod common;

use common::RawClient;
use pretty_assertions::assert_eq;
use std::{
    fs,
    io::{BufRead, BufReader},
    net::TcpStream,
    path::Path,
};

fn server(root: &Path) -> RawClient {
    fs::create_dir(root.join("htdocs")).unwrap();
    fs::write(root.join("htdocs/index.html"), "<html/>").unwrap();
    let addr = common::start_server(root, |s| s);
    let (client, greeting) = RawClient::connect(addr);
    assert_eq!(greeting, "220 Welcome test");
    client
}

#[test]
fn login_is_required() {
    let root = tempfile::tempdir().unwrap();
    let mut client = server(root.path());

    assert_eq!(client.send("PWD"), "530 Please authenticate");
    assert_eq!(client.send("SYST"), "215 UNIX Type: L8");
    assert_eq!(client.send("NOOP"), "200 Successfully did nothing");
    assert_eq!(client.send("PASS test"), "503 Please give me a username first");
    client.login();
    assert_eq!(client.send("USER other"), "503 Please create a new connection to switch user");
    assert_eq!(client.send("PWD"), "257 \"/\" is current directory");
}

#[test]
fn unknown_commands() {
    let root = tempfile::tempdir().unwrap();
    let mut client = server(root.path());
    client.login();

    assert_eq!(client.send("FOO"), "502 Command not implemented");
    assert_eq!(client.send("TYPE X"), "504 Type not implemented");
    assert_eq!(client.send("SITE EXEC ls"), "504 Unknown SITE command");
    assert_eq!(client.send("CWD"), "501 Missing argument");
}

#[test]
fn features() {
    let root = tempfile::tempdir().unwrap();
    let mut client = server(root.path());

    assert_eq!(
        client.send("FEAT"),
        "211-Extensions supported:\n MDTM\n MLSD\n SITE CHMOD\n SIZE\n UTF8\n211 END"
    );
}

#[test]
fn navigation() {
    let root = tempfile::tempdir().unwrap();
    let mut client = server(root.path());
    client.login();

    assert_eq!(client.send("CWD htdocs"), "250 \"/htdocs\" is new working directory");
    assert_eq!(client.send("PWD"), "257 \"/htdocs\" is current directory");
    assert!(client.send("CWD missing").starts_with("550 "));
    assert!(client.send("CWD index.html").starts_with("550 "));
    assert_eq!(client.send("PWD"), "257 \"/htdocs\" is current directory");
    assert_eq!(client.send("CDUP"), "250 CDUP command successful");
    assert_eq!(client.send("PWD"), "257 \"/\" is current directory");
    assert_eq!(client.send("CDUP"), "250 CDUP command successful");
    assert_eq!(client.send("PWD"), "257 \"/\" is current directory");
}

#[test]
fn file_status() {
    let root = tempfile::tempdir().unwrap();
    let mut client = server(root.path());
    client.login();

    assert_eq!(client.send("SIZE /htdocs/index.html"), "213 7");
    assert_eq!(client.send("SIZE /htdocs/missing"), "550 File not found");

    let mdtm = client.send("MDTM /htdocs/index.html");
    let (code, stamp) = mdtm.split_once(' ').unwrap();
    assert_eq!(code, "213");
    assert_eq!(stamp.len(), 14);
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn sequence_errors() {
    let root = tempfile::tempdir().unwrap();
    let mut client = server(root.path());
    client.login();

    assert_eq!(client.send("LIST"), "425 No data connection established");
    assert_eq!(client.send("RNTO elsewhere"), "503 Please tell me what file you want to rename first");
    assert_eq!(client.send("RNFR /htdocs/index.html"), "350 Tell me, what would you like the new name to be?");
    assert_eq!(client.send("RNTO /index.html"), "250 Renamed");
    assert!(root.path().join("index.html").exists());
}

#[test]
fn list_over_passive_connection() {
    let root = tempfile::tempdir().unwrap();
    let mut client = server(root.path());
    client.login();

    let data_addr = client.pasv();
    let data = TcpStream::connect(data_addr).unwrap();
    assert_eq!(client.send("LIST /htdocs"), "150 Sending directory list");
    let lines: Vec<String> = BufReader::new(data).lines().map(|l| l.unwrap()).collect();
    assert_eq!(client.read_reply(), "226 Closing data connection, sent 3 entries");

    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(" ."));
    assert!(lines[1].ends_with(" .."));
    assert!(lines[2].starts_with('-'));
    assert!(lines[2].ends_with(" index.html"));
}

#[test]
fn quit() {
    let root = tempfile::tempdir().unwrap();
    let mut client = server(root.path());

    assert_eq!(client.send("QUIT"), "221 Bye!");
}

#[test]
fn idle_sessions_are_closed() {
    let root = tempfile::tempdir().unwrap();
    let addr = common::start_server(root.path(), |s| s.idle_session_timeout(1));
    let (mut client, _) = RawClient::connect(addr);

    assert_eq!(client.read_reply(), "221 Session timed out. Closing control connection");
}
