use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use http::StatusCode;
use http_ingest::config::ParserConfig;
use http_ingest::connection::{Connection, ParseOutcome};
use http_ingest::protocol::body::BodyKind;
use http_ingest::protocol::{ConnectionId, Request};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = ParserConfig::default()
        .with_server("127.0.0.1", 8080)
        .with_body_buffer_size(64 * 1024)
        .into_shared();

    info!(port = 8080, "start listening");
    let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };

    loop {
        let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        let id = ConnectionId::new(NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed));
        let connection = Connection::new(config.clone(), id, Some(remote_addr));

        tokio::spawn(async move {
            match serve(connection, tcp_stream).await {
                Ok(()) => info!(connection = %id, "connection shutdown"),
                Err(e) => error!(connection = %id, cause = %e, "connection io error"),
            }
        });
    }
}

async fn serve(mut connection: Connection, mut tcp_stream: TcpStream) -> io::Result<()> {
    let result = drive(&mut connection, &mut tcp_stream).await;
    connection.reset();
    result
}

async fn drive(connection: &mut Connection, tcp_stream: &mut TcpStream) -> io::Result<()> {
    while let Some(outcome) = connection.read_from(tcp_stream).await? {
        while let Some(request) = connection.next_request() {
            log_request(&request);
            write_response(tcp_stream, StatusCode::OK, connection.keep_alive()).await?;
        }

        match outcome {
            ParseOutcome::Error(status) => return write_response(tcp_stream, status, false).await,
            ParseOutcome::Complete(_) if !connection.keep_alive() => return Ok(()),
            ParseOutcome::Complete(_) | ParseOutcome::Incomplete => {}
        }
    }
    Ok(())
}

fn log_request(request: &Request) {
    let environ = request.environ();
    info!(
        connection = %request.connection_id(),
        method = environ.request_method(),
        path = environ.path_info(),
        query = environ.query_string(),
        body_length = request.body_length(),
        spilled = request.body_kind() == BodyKind::File,
        elapsed_us = u64::try_from(request.elapsed().as_micros()).unwrap_or(u64::MAX),
        "request"
    );
}

async fn write_response(tcp_stream: &mut TcpStream, status: StatusCode, keep_alive: bool) -> io::Result<()> {
    let body = status.canonical_reason().unwrap_or("Unknown");
    let connection = if keep_alive { "keep-alive" } else { "close" };
    let response = format!(
        "HTTP/1.1 {} {body}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: {connection}\r\n\r\n{body}",
        status.as_u16(),
        body.len()
    );
    tcp_stream.write_all(response.as_bytes()).await?;
    tcp_stream.flush().await
}
