#![allow(dead_code)]

use libftpkit::{client::Connection, server::Server, storage::Filesystem};
use std::{
    io::{BufRead, BufReader, Write},
    net::{SocketAddr, TcpStream},
    path::Path,
    sync::mpsc,
    thread,
};

/// Runs a server over `root` on a free local port in a background runtime.
pub fn start_server<F>(root: &Path, configure: F) -> SocketAddr
where
    F: FnOnce(Server) -> Server + Send + 'static,
{
    let root = root.to_path_buf();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            let server = configure(Server::new(Filesystem::new(root).unwrap()).greeting("Welcome test"));
            let _ = server.listen_prebound(listener).await;
        });
    });
    rx.recv().unwrap()
}

pub fn connect(addr: SocketAddr) -> Connection {
    let mut conn = Connection::new(&format!("ftp://test:test@{addr}/?timeout=5")).unwrap();
    conn.connect().unwrap();
    conn
}

/// Speaks the control protocol line by line.
pub struct RawClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl RawClient {
    pub fn connect(addr: SocketAddr) -> (Self, String) {
        let stream = TcpStream::connect(addr).unwrap();
        let mut client = RawClient {
            reader: BufReader::new(stream.try_clone().unwrap()),
            writer: stream,
        };
        let greeting = client.read_reply();
        (client, greeting)
    }

    /// Sends a command and returns the complete reply without line endings; multi-line replies
    /// are joined with `\n`.
    pub fn send(&mut self, command: &str) -> String {
        self.writer.write_all(format!("{command}\r\n").as_bytes()).unwrap();
        self.read_reply()
    }

    pub fn read_reply(&mut self) -> String {
        let first = self.read_line();
        if first.len() < 4 || first.as_bytes()[3] != b'-' {
            return first;
        }
        let end = format!("{} ", &first[..3]);
        let mut lines = vec![first];
        loop {
            let line = self.read_line();
            let done = line.starts_with(&end);
            lines.push(line);
            if done {
                return lines.join("\n");
            }
        }
    }

    fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        line.trim_end_matches(['\r', '\n']).to_string()
    }

    pub fn login(&mut self) {
        assert_eq!(self.send("USER test"), "331 Password Required");
        assert_eq!(self.send("PASS test"), "230 User logged in, proceed");
    }

    /// Enters passive mode, returning the data address.
    pub fn pasv(&mut self) -> SocketAddr {
        let reply = self.send("PASV");
        let start = reply.find('(').unwrap() + 1;
        let end = reply.find(')').unwrap();
        let fields: Vec<u16> = reply[start..end].split(',').map(|f| f.parse().unwrap()).collect();
        let host = format!("{}.{}.{}.{}", fields[0], fields[1], fields[2], fields[3]);
        format!("{}:{}", host, fields[4] * 256 + fields[5]).parse().unwrap()
    }
}
