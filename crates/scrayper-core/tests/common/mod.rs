#![allow(dead_code)]

pub mod listing_server;

/// Listing page markup with one `tr.class1` row per `(host, hash)` pair,
/// laid out like the upstream table (header row, seven columns).
pub fn listing_html(rows: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (host, hash) in rows {
        body.push_str(&format!(
            "<tr class=\"class1\"><td>2019-03-01</td><td>{host}</td><td>127.0.0.1</td>\
             <td>ZZ</td><td>64500</td><td>TEST-AS</td>\
             <td><a href=\"/database/index.php?search={hash}\">{hash}</a></td></tr>"
        ));
    }
    format!(
        "<html><body><font><center><table class=\"prettytable\">\
         <tr class=\"class0\"><th>Date</th><th>Domain</th><th>IP</th><th>CC</th>\
         <th>ASN</th><th>AS Name</th><th>MD5</th></tr>{body}\
         </table></center></font></body></html>"
    )
}

/// `127.0.0.1:port` with nothing listening on it.
pub fn unreachable_host() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("127.0.0.1:{}", port)
}

/// In-memory log sink for asserting on what a run printed.
#[derive(Clone, Default)]
pub struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl CapturedLog {
    /// Run `f` with a plain-text fmt subscriber writing into this buffer.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Index of the first line at or after `from` containing `needle`.
    pub fn position(&self, from: usize, needle: &str) -> Option<usize> {
        self.lines()
            .iter()
            .skip(from)
            .position(|line| line.contains(needle))
            .map(|i| i + from)
    }
}

impl std::io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLog {
    type Writer = CapturedLog;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
