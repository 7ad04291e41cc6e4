//! Single-use loopback listener for the authorization-code redirect.
//!
//! The listener accepts exactly one connection and is dropped on every exit
//! path. Single use is a security property: after the legitimate browser
//! redirect is consumed, no second local process gets a chance to deliver a
//! forged code.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use super::errors::AuthFlowError;

const SUCCESS_PAGE: &str = "<html>\
<head><title>Authorization complete</title></head>\
<body style=\"font-family: sans-serif; text-align: center; padding: 50px;\">\
<h1>Authorization complete</h1>\
<p>You can close this window and return to the terminal.</p>\
</body></html>";

const FAILURE_PAGE: &str = "<html>\
<head><title>Authorization failed</title></head>\
<body style=\"font-family: sans-serif; text-align: center; padding: 50px;\">\
<h1>Authorization failed</h1>\
<p>No authorization code was received. You can close this window.</p>\
</body></html>";

/// Bind the loopback listener before the browser is launched, so the
/// redirect always has somewhere to land. Fails cleanly when the port is
/// taken instead of hanging.
pub(crate) async fn bind(port: u16) -> Result<TcpListener, AuthFlowError> {
    TcpListener::bind(("127.0.0.1", port))
        .await
        .map_err(|e| AuthFlowError::CallbackBind {
            port,
            detail: e.to_string(),
        })
}

/// Wait for the single redirect and extract the authorization code.
///
/// The browser gets a 200 confirmation page when a code is present and a
/// 400 otherwise. The listener is consumed either way.
pub(crate) async fn receive_code(
    listener: TcpListener,
    timeout: Duration,
) -> Result<String, AuthFlowError> {
    let io_err = |e: std::io::Error| AuthFlowError::CallbackIo {
        detail: e.to_string(),
    };

    // The deadline covers the accept AND the request-line read. A connection
    // that arrives but never sends anything (a browser preconnect, say) must
    // not stall the flow past its timeout.
    let accept_and_read = async {
        let (mut stream, peer) = listener.accept().await.map_err(io_err)?;
        tracing::debug!(%peer, "callback connection accepted");

        // Only the request line matters; the code rides in its query string.
        let mut request_line = String::new();
        {
            let mut reader = BufReader::new(&mut stream);
            reader.read_line(&mut request_line).await.map_err(io_err)?;
        }
        Ok::<_, AuthFlowError>((stream, request_line))
    };
    let (mut stream, request_line) = tokio::time::timeout(timeout, accept_and_read)
        .await
        .map_err(|_| AuthFlowError::UserCancelledOrTimedOut { waited: timeout })??;

    match parse_request_line(&request_line) {
        Ok(code) => {
            respond(&mut stream, "200 OK", SUCCESS_PAGE).await;
            Ok(code)
        }
        Err(e) => {
            respond(&mut stream, "400 Bad Request", FAILURE_PAGE).await;
            Err(e)
        }
    }
}

/// Pull the authorization code out of an HTTP request line like
/// `GET /?code=... HTTP/1.1`.
pub(crate) fn parse_request_line(line: &str) -> Result<String, AuthFlowError> {
    let invalid = |reason: &str| AuthFlowError::InvalidCallback {
        reason: reason.to_string(),
    };

    let target = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| invalid("malformed request line"))?;
    let url = Url::parse(&format!("http://localhost{target}"))
        .map_err(|_| invalid("unparseable request target"))?;

    let mut code = None;
    let mut error = None;
    let mut error_description = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        let description = error_description.unwrap_or_else(|| "no description".to_string());
        return Err(AuthFlowError::InvalidCallback {
            reason: format!("provider returned '{error}': {description}"),
        });
    }

    match code {
        Some(code) if !code.is_empty() => Ok(code),
        _ => Err(invalid("no authorization code in callback")),
    }
}

async fn respond(stream: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    // The browser-facing reply is best-effort; the flow outcome is already
    // decided by the time we write it.
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        tracing::debug!(error = %e, "failed to answer the callback connection");
    }
    let _ = stream.shutdown().await;
}
