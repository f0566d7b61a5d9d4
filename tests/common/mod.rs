#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use arxiv_daily_lib::RunConfig;

pub const DATE: &str = "Thu, 23 Sep 2021";
pub const SENDER: &str = "digest@163.com";

/// Minimal SMTP relay on a random local port. Accepts any login and mail,
/// and keeps every command line it receives.
pub struct FakeSmtp {
    pub port: u16,
    commands: Arc<Mutex<Vec<String>>>,
}

impl FakeSmtp {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let commands = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&commands);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let seen = Arc::clone(&seen);
                thread::spawn(move || serve(stream, &seen));
            }
        });

        FakeSmtp { port, commands }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

fn serve(stream: TcpStream, seen: &Mutex<Vec<String>>) {
    let mut writer = stream.try_clone().unwrap();
    let mut reader = BufReader::new(stream);
    if writer.write_all(b"220 fake.smtp ESMTP\r\n").is_err() {
        return;
    }

    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let command = line.trim_end().to_string();
        seen.lock().unwrap().push(command.clone());

        let verb = command.to_uppercase();
        let reply: &[u8] = if verb.starts_with("EHLO") || verb.starts_with("HELO") {
            b"250-fake.smtp\r\n250 AUTH PLAIN LOGIN\r\n"
        } else if verb.starts_with("AUTH") {
            b"235 2.7.0 Authentication successful\r\n"
        } else if verb.starts_with("DATA") {
            if writer.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n").is_err() {
                return;
            }
            loop {
                line.clear();
                match reader.read_line(&mut line) {
                    Ok(0) | Err(_) => return,
                    Ok(_) if line.trim_end() == "." => break,
                    Ok(_) => {}
                }
            }
            b"250 2.0.0 Ok: queued\r\n"
        } else if verb.starts_with("QUIT") {
            let _ = writer.write_all(b"221 2.0.0 Bye\r\n");
            return;
        } else {
            b"250 2.0.0 Ok\r\n"
        };

        if writer.write_all(reply).is_err() {
            return;
        }
    }
}

/// Run configuration writing into `dir`, fetching `listing_url` and mailing through `smtp_port`.
pub fn run_config(dir: &Path, listing_url: &str, smtp_port: u16) -> RunConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("ARXIV_DAILY_DATE", DATE.to_string()),
        ("ARXIV_DAILY_MAIL_SENDER", SENDER.to_string()),
        ("ARXIV_DAILY_MAIL_LICENSE", "license".to_string()),
        ("ARXIV_DAILY_FILES_DIR", dir.to_string_lossy().into_owned()),
        ("ARXIV_DAILY_LISTING_URL", listing_url.to_string()),
        ("ARXIV_DAILY_SMTP_HOST", "127.0.0.1".to_string()),
        ("ARXIV_DAILY_SMTP_PORT", smtp_port.to_string()),
    ]);
    RunConfig::from_lookup(move |key| vars.get(key).cloned()).unwrap()
}

pub fn json_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|name| name.ends_with(".json"))
                .collect()
        })
        .unwrap_or_default()
}
