//! HTTP server loop
//!
//! Serves one connection at a time on `HTTP_PORT`. Each connection carries
//! exactly one request: read up to the end of the headers, route it, answer
//! with `Connection: close` and hang up. The monitor stays locked while a
//! request is handled, so a request and a periodic sample never interleave.

use defmt::{info, warn};
use embassy_net::tcp::{Error, TcpSocket};
use embassy_net::Stack;
use embassy_time::Duration;
use embedded_io_async::Write;
use smart_parking::system::http::{parse_request, respond, Response, HTTP_PORT};

use crate::task::SharedMonitor;

/// Idle connections are dropped after this long
const SOCKET_TIMEOUT: Duration = Duration::from_secs(5);

/// Only the request line matters, longer headers are cut off
const REQUEST_BUFFER_SIZE: usize = 512;

/// Accepts and answers requests forever
pub async fn serve(stack: Stack<'static>, monitor: &'static SharedMonitor) -> ! {
    let mut rx_buffer = [0; 1024];
    let mut tx_buffer = [0; 2048];
    let mut request = [0; REQUEST_BUFFER_SIZE];

    info!("HTTP Server started on port {}", HTTP_PORT);

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(SOCKET_TIMEOUT));

        if let Err(e) = socket.accept(HTTP_PORT).await {
            warn!("accept failed: {:?}", e);
            continue;
        }

        let len = match read_request(&mut socket, &mut request).await {
            Ok(len) => len,
            Err(e) => {
                warn!("read failed: {:?}", e);
                socket.abort();
                continue;
            }
        };

        let response = match parse_request(&request[..len]) {
            Ok(route) => {
                info!("Request: {}", route);
                let mut monitor = monitor.lock().await;
                respond(&mut *monitor, route).await
            }
            Err(e) => {
                warn!("unroutable request: {}", e);
                Response::rejected(e)
            }
        };

        if let Err(e) = send(&mut socket, &response).await {
            warn!("write failed: {:?}", e);
        }
        socket.close();
    }
}

/// Reads until the end of the headers, a full buffer, or the peer closing
async fn read_request(socket: &mut TcpSocket<'_>, buf: &mut [u8]) -> Result<usize, Error> {
    let mut len = 0;
    while len < buf.len() {
        let n = socket.read(&mut buf[len..]).await?;
        if n == 0 {
            break;
        }
        len += n;
        if buf[..len].windows(4).any(|end| end == b"\r\n\r\n") {
            break;
        }
    }
    Ok(len)
}

async fn send(socket: &mut TcpSocket<'_>, response: &Response) -> Result<(), Error> {
    socket.write_all(response.head().as_bytes()).await?;
    socket.write_all(response.body.as_str().as_bytes()).await?;
    socket.flush().await
}
