//! Minimal HTTP/1.1 server for integration tests.
//!
//! Answers every request with one fixed status line and body, then closes
//! the connection. `start_tls` serves the same over HTTPS with a freshly
//! generated self-signed certificate.

use rcgen::{generate_simple_self_signed, CertifiedKey};
use rustls::{
    crypto::ring,
    pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer},
    ServerConfig, ServerConnection, StreamOwned,
};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Serve `body` with `200 OK`. Returns the base URL, e.g. "http://127.0.0.1:12345/".
pub fn start(body: &str) -> String {
    start_with_status("200 OK", body)
}

/// Serve `body` with an arbitrary status line such as "404 Not Found".
/// The server runs until the test process exits.
pub fn start_with_status(status: &'static str, body: &str) -> String {
    let (listener, port) = bind();
    let body = Arc::new(body.to_string());
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            thread::spawn(move || {
                set_timeouts(&stream);
                respond(&mut stream, status, &body);
            });
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

/// Serve `body` with `200 OK` over TLS using a self-signed certificate that
/// no client trusts. Returns "https://127.0.0.1:<port>/".
pub fn start_tls(body: &str) -> String {
    let CertifiedKey { cert, key_pair } =
        generate_simple_self_signed(vec!["localhost".to_string(), "127.0.0.1".to_string()])
            .expect("generate certificate");
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));
    let config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key)
        .expect("server config");
    let config = Arc::new(config);

    let (listener, port) = bind();
    let body = Arc::new(body.to_string());
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let config = Arc::clone(&config);
            thread::spawn(move || {
                set_timeouts(&stream);
                let Ok(conn) = ServerConnection::new(config) else {
                    return;
                };
                let mut tls = StreamOwned::new(conn, stream);
                respond(&mut tls, "200 OK", &body);
                tls.conn.send_close_notify();
                let _ = tls.flush();
            });
        }
    });
    format!("https://127.0.0.1:{}/", port)
}

/// A URL on a port nothing is listening on.
///
/// The port is released before returning, so another process could grab it
/// in between; the window is tiny and only makes the test flaky, not wrong.
pub fn unreachable_url() -> String {
    let (listener, port) = bind();
    drop(listener);
    format!("http://127.0.0.1:{}/track.kml", port)
}

fn bind() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn set_timeouts(stream: &TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
}

fn respond<S: Read + Write>(stream: &mut S, status: &str, body: &str) {
    // Read until the end of the request head; GETs carry no body.
    let mut head = Vec::new();
    let mut buf = [0u8; 4096];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/vnd.google-earth.kml+xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body.as_bytes());
    let _ = stream.flush();
}
