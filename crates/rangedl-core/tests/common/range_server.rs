//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body. Responds to HEAD with Content-Length and
//! Accept-Ranges: bytes; responds to GET with Range with 206 Partial Content.
//! Options inject the misbehaviors the downloader has to cope with;
//! `start_redirect` puts a 302 hop in front of another server.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How long a stalled range response holds its body back.
const STALL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, omit `Accept-Ranges: bytes` from HEAD responses.
    pub advertise_ranges: bool,
    /// If false, omit `Content-Length` from HEAD responses.
    pub advertise_length: bool,
    /// If true, ranged GETs return everything from the range start to EOF.
    pub overshoot: bool,
    /// If true, ranged GETs starting at `faulty_offset` return one byte too few.
    pub short_body: bool,
    /// If set, ranged GETs starting at `faulty_offset` get this status and an empty body.
    pub fail_status: Option<u16>,
    /// Range start that `short_body` / `fail_status` apply to.
    pub faulty_offset: u64,
    /// If set, the ranged GET starting here sends its headers and then stalls for a minute.
    pub stall_offset: Option<u64>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            advertise_ranges: true,
            advertise_length: true,
            overshoot: false,
            short_body: false,
            fail_status: None,
            faulty_offset: 0,
            stall_offset: None,
        }
    }
}

/// Handle to a running server.
pub struct RangeServer {
    pub url: String,
    gets: Arc<AtomicUsize>,
}

impl RangeServer {
    /// Number of GET requests served so far.
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `body`. The server runs until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior.
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let body = Arc::new(body);
    serve(move |stream, gets| handle(stream, &body, opts, gets))
}

/// Starts a server that answers every request with `302 Found` pointing at
/// `location`. HEAD answers carry `head_length` as Content-Length and, if
/// `head_ranges` is set, `Accept-Ranges: bytes`. GETs are counted too.
pub fn start_redirect(location: String, head_length: u64, head_ranges: bool) -> RangeServer {
    let location = Arc::new(location);
    serve(move |mut stream, gets| {
        let Some(request) = read_request(&mut stream) else {
            return;
        };
        let (method, _) = parse_request(&request);
        let mut response = format!("HTTP/1.1 302 Found\r\nLocation: {}\r\n", location);
        if method.eq_ignore_ascii_case("HEAD") {
            response.push_str(&format!("Content-Length: {}\r\n", head_length));
            if head_ranges {
                response.push_str("Accept-Ranges: bytes\r\n");
            }
        } else {
            gets.fetch_add(1, Ordering::SeqCst);
            response.push_str("Content-Length: 0\r\n");
        }
        response.push_str("Connection: close\r\n\r\n");
        let _ = stream.write_all(response.as_bytes());
    })
}

fn serve<F>(handler: F) -> RangeServer
where
    F: Fn(TcpStream, &AtomicUsize) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let handler = Arc::new(handler);
    let gets = Arc::new(AtomicUsize::new(0));
    let gets_srv = Arc::clone(&gets);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let handler = Arc::clone(&handler);
            let gets = Arc::clone(&gets_srv);
            thread::spawn(move || handler(stream, &gets));
        }
    });
    RangeServer {
        url: format!("http://127.0.0.1:{}/file.bin", port),
        gets,
    }
}

fn read_request(stream: &mut TcpStream) -> Option<String> {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return None,
        Ok(n) => n,
        Err(_) => return None,
    };
    std::str::from_utf8(&buf[..n]).ok().map(str::to_string)
}

fn handle(mut stream: TcpStream, body: &[u8], opts: RangeServerOptions, gets: &AtomicUsize) {
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let (method, range) = parse_request(&request);
    let total = body.len() as u64;

    if method.eq_ignore_ascii_case("HEAD") {
        let mut response = String::from("HTTP/1.1 200 OK\r\n");
        if opts.advertise_length {
            response.push_str(&format!("Content-Length: {}\r\n", total));
        }
        if opts.advertise_ranges {
            response.push_str("Accept-Ranges: bytes\r\n");
        }
        response.push_str("Connection: close\r\n\r\n");
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }
    gets.fetch_add(1, Ordering::SeqCst);

    let (status, slice): (String, &[u8]) = match range {
        None => ("200 OK".to_string(), body),
        Some((start, _)) if start == opts.faulty_offset && opts.fail_status.is_some() => {
            let code = opts.fail_status.unwrap_or(500);
            (format!("{} Injected Failure", code), &body[0..0])
        }
        Some((start, end_incl)) => {
            let end_incl = end_incl.min(total.saturating_sub(1));
            if start > end_incl {
                ("416 Range Not Satisfiable".to_string(), &body[0..0])
            } else {
                let start_u = start as usize;
                let mut end_excl = if opts.overshoot {
                    total as usize
                } else {
                    end_incl as usize + 1
                };
                if opts.short_body && start == opts.faulty_offset {
                    end_excl -= 1;
                }
                ("206 Partial Content".to_string(), &body[start_u..end_excl])
            }
        }
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nAccept-Ranges: bytes\r\nConnection: close\r\n\r\n",
        status,
        slice.len()
    );
    let _ = stream.write_all(response.as_bytes());
    if matches!((opts.stall_offset, range), (Some(at), Some((start, _))) if at == start) {
        let _ = stream.flush();
        thread::sleep(STALL);
    }
    let _ = stream.write_all(slice);
}

/// Returns (method, optional (start, end_inclusive) for Range: bytes=X-Y).
fn parse_request(request: &str) -> (&str, Option<(u64, u64)>) {
    let mut method = "";
    let mut range = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            method = line.split_whitespace().next().unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                let value = value.trim();
                if value.to_lowercase().starts_with("bytes=") {
                    let part = value[6..].trim();
                    if let Some((a, b)) = part.split_once('-') {
                        let start = a.trim().parse::<u64>().unwrap_or(0);
                        let end = b.trim();
                        let end_incl = if end.is_empty() {
                            u64::MAX
                        } else {
                            end.parse::<u64>().unwrap_or(0)
                        };
                        range = Some((start, end_incl));
                    }
                }
            }
        }
    }
    (method, range)
}
