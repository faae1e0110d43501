//! Canned HTTP/1.1 server for exercising the HTTP clients.

use reqwest::Client;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Reply sent for requests whose request line starts with `route`,
/// e.g. `"GET /v1/users/u1"`.
pub struct Reply {
    pub route: &'static str,
    pub status: u16,
    pub body: &'static str,
}

pub fn reply(route: &'static str, status: u16, body: &'static str) -> Reply {
    Reply { route, status, body }
}

/// Successful login for `u1`.
pub fn login_ok() -> Reply {
    reply(
        "POST /v1/auth/login",
        200,
        r#"{"token":"jwt","refreshToken":"r","expiresIn":3600,"user":{"_id":"u1","email":"parent@example.com"}}"#,
    )
}

/// Client that never goes through a proxy.
pub fn client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

/// Start serving `replies` on a local port and return the base URL.
/// Unmatched requests get an empty 404.
pub async fn serve(replies: Vec<Reply>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            respond(stream, &replies).await;
        }
    });
    format!("http://{}", addr)
}

async fn respond(mut stream: TcpStream, replies: &[Reply]) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + length {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let (status, body) = replies
        .iter()
        .find(|r| head.starts_with(r.route))
        .map(|r| (r.status, r.body))
        .unwrap_or((404, ""));
    let reason = match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Internal Server Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
