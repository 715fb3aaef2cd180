use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

/// A tiny XML-RPC-over-HTTP stub server: accepts `connections` requests in
/// turn and answers each with `response_xml`, wrapped in a bare HTTP/1.0
/// 200 response.
pub struct StubServer {
    pub port: u16,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Start a server that answers every connection with the same body.
    pub fn start(connections: usize, response_xml: &str) -> StubServer {
        Self::start_with(connections, move |_request| response_xml.to_owned())
    }

    /// Start a server whose response is computed per-request from the raw
    /// request bytes (used to check what was actually sent on the wire).
    pub fn start_with<F>(connections: usize, mut respond: F) -> StubServer
    where
        F: FnMut(&str) -> String + Send + 'static,
    {
        let _ = env_logger::builder().is_test(true).try_init();

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let port = listener.local_addr().expect("local_addr").port();

        let handle = thread::spawn(move || {
            for _ in 0..connections {
                let (mut stream, _) = match listener.accept() {
                    Ok(pair) => pair,
                    Err(_) => return,
                };
                let request = read_request(&mut stream);
                let body = respond(&request);
                write_response(&mut stream, &body);
            }
        });

        StubServer {
            port,
            handle: Some(handle),
        }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}/RPC2", self.port)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).unwrap_or(0);
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break end + 4;
        }
    };

    let content_length = String::from_utf8_lossy(&buf[..header_end])
        .lines()
        .find_map(|line| line.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_owned()))
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn write_response(stream: &mut TcpStream, body: &str) {
    let head = format!(
        "HTTP/1.0 200 OK\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body.as_bytes());
    let _ = stream.flush();
}

/// A canned `<methodResponse>` wrapping a single string return value.
pub fn string_response(value: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<methodResponse><params><param><value><string>{value}</string></value></param></params></methodResponse>"
    )
}

/// A canned `<methodResponse><fault>` with the given code and message.
pub fn fault_response(code: i32, message: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<methodResponse><fault><value><struct>\
         <member><name>faultCode</name><value><i4>{code}</i4></value></member>\
         <member><name>faultString</name><value><string>{message}</string></value></member>\
         </struct></value></fault></methodResponse>"
    )
}
