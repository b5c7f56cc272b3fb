use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use eyre::Result;
use md5::{Digest, Md5};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// How the fixture advertises an integrity tag on HEAD responses.
#[derive(Clone, Debug, Default)]
pub enum EtagMode {
    /// Correct MD5 of the payload, quoted as servers do.
    #[default]
    Md5,
    /// A fixed (typically wrong) tag.
    Fixed(String),
    /// No ETag header at all.
    Omit,
}

/// Fault-injection and traffic-shaping knobs for [`RangeServer`].
#[derive(Clone, Debug, Default)]
pub struct ServerOptions {
    pub etag: EtagMode,
    /// Answer the HEAD probe without a Content-Length header.
    pub omit_content_length: bool,
    /// Respond 500 to the range starting at this offset.
    pub fail_at_offset: Option<u64>,
    /// Sleep this long before answering each range request.
    pub response_delay: Option<Duration>,
    /// Extra delay for the range starting at this offset, to force a
    /// chosen chunk to finish last.
    pub slow_offset: Option<(u64, Duration)>,
}

#[derive(Debug, Default)]
pub struct ServerStats {
    pub head_requests: AtomicUsize,
    pub range_requests: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

/// Minimal HTTP/1.1 fixture serving one payload over HEAD and ranged GET.
///
/// Just enough protocol for the client under test; requests never carry
/// bodies, responses close over keep-alive connections.
pub struct RangeServer {
    addr: SocketAddr,
    stats: Arc<ServerStats>,
}

impl RangeServer {
    pub async fn start(payload: Vec<u8>, options: ServerOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fixture listener");
        let addr = listener.local_addr().expect("fixture listener addr");
        let stats = Arc::new(ServerStats::default());
        let payload = Arc::new(payload);
        let options = Arc::new(options);

        let accept_stats = Arc::clone(&stats);
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let payload = Arc::clone(&payload);
                let options = Arc::clone(&options);
                let stats = Arc::clone(&accept_stats);
                tokio::spawn(async move {
                    let _ = serve_connection(socket, payload, options, stats).await;
                });
            }
        });

        Self { addr, stats }
    }

    pub fn url(&self) -> String {
        format!("http://{}/payload.bin", self.addr)
    }

    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }
}

async fn serve_connection(
    socket: TcpStream,
    payload: Arc<Vec<u8>>,
    options: Arc<ServerOptions>,
    stats: Arc<ServerStats>,
) -> std::io::Result<()> {
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let request_line = line.trim_end().to_string();
        if request_line.is_empty() {
            continue;
        }

        // Headers only; neither HEAD nor GET carries a body here.
        let mut range: Option<(u64, u64)> = None;
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).await? == 0 {
                return Ok(());
            }
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("range") {
                    range = parse_range(value.trim());
                }
            }
        }

        let method = request_line.split(' ').next().unwrap_or("");
        match method {
            "HEAD" => {
                stats.head_requests.fetch_add(1, Ordering::SeqCst);
                respond_head(&mut write_half, &payload, &options).await?;
            }
            "GET" => {
                stats.range_requests.fetch_add(1, Ordering::SeqCst);
                track_in_flight(&stats);
                let result = respond_range(&mut write_half, &payload, &options, range).await;
                stats.in_flight.fetch_sub(1, Ordering::SeqCst);
                result?;
            }
            _ => {
                write_simple(&mut write_half, 405, "Method Not Allowed").await?;
            }
        }
    }
}

fn track_in_flight(stats: &ServerStats) {
    let current = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    let mut max = stats.max_in_flight.load(Ordering::SeqCst);
    while current > max {
        match stats.max_in_flight.compare_exchange_weak(
            max,
            current,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => break,
            Err(observed) => max = observed,
        }
    }
}

fn parse_range(value: &str) -> Option<(u64, u64)> {
    let rest = value.strip_prefix("bytes=")?;
    let (start, end) = rest.split_once('-')?;
    Some((start.parse().ok()?, end.parse().ok()?))
}

async fn respond_head(
    stream: &mut (impl AsyncWrite + Unpin),
    payload: &[u8],
    options: &ServerOptions,
) -> std::io::Result<()> {
    let mut response = String::from("HTTP/1.1 200 OK\r\n");
    if !options.omit_content_length {
        response.push_str(&format!("Content-Length: {}\r\n", payload.len()));
    }
    match &options.etag {
        EtagMode::Md5 => {
            response.push_str(&format!("ETag: \"{}\"\r\n", md5_hex(payload)));
        }
        EtagMode::Fixed(tag) => {
            response.push_str(&format!("ETag: \"{tag}\"\r\n"));
        }
        EtagMode::Omit => {}
    }
    response.push_str("\r\n");
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await
}

async fn respond_range(
    stream: &mut (impl AsyncWrite + Unpin),
    payload: &[u8],
    options: &ServerOptions,
    range: Option<(u64, u64)>,
) -> std::io::Result<()> {
    if let Some(delay) = options.response_delay {
        tokio::time::sleep(delay).await;
    }

    let Some((start, end)) = range else {
        return write_simple(stream, 400, "Bad Request").await;
    };

    if let Some((slow_start, delay)) = options.slow_offset {
        if start == slow_start {
            tokio::time::sleep(delay).await;
        }
    }

    if options.fail_at_offset == Some(start) {
        return write_simple(stream, 500, "Internal Server Error").await;
    }

    if start as usize >= payload.len() || end < start {
        return write_simple(stream, 416, "Range Not Satisfiable").await;
    }

    let end = (end as usize).min(payload.len() - 1);
    let body = &payload[start as usize..=end];
    let header = format!(
        "HTTP/1.1 206 Partial Content\r\nContent-Length: {}\r\nContent-Range: bytes {}-{}/{}\r\n\r\n",
        body.len(),
        start,
        end,
        payload.len()
    );
    stream.write_all(header.as_bytes()).await?;
    stream.write_all(body).await?;
    stream.flush().await
}

async fn write_simple(
    stream: &mut (impl AsyncWrite + Unpin),
    status: u16,
    reason: &str,
) -> std::io::Result<()> {
    let response = format!("HTTP/1.1 {status} {reason}\r\nContent-Length: 0\r\n\r\n");
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await
}

pub fn md5_hex(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Deterministic non-repeating-ish payload so misplaced chunks are visible.
pub fn patterned_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

pub fn write_config_file(dir: &Path, config: &serde_json::Value) -> Result<PathBuf> {
    let path = dir.join("parfetch.json");
    std::fs::write(&path, serde_json::to_string_pretty(config)?)?;
    Ok(path)
}
