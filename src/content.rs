use crate::endpoint::Endpoint;
use crate::timeouts::Timeouts;
use crate::transport::{Session, TransportError};

const SCRATCH: usize = 4096;
const TERMINATOR: &[u8] = b".\r\n";

/// Streams a file response's raw bytes, truncating at the Gopher
/// terminator sequence `.\r\n` if one appears, per spec.md §4.8/§6. Unlike
/// the menu parser, content is not line-structured — a text file may be a
/// single unterminated chunk of bytes — so this reads until EOF or the
/// terminator substring shows up in the accumulated buffer, never
/// splitting on CRLF.
pub async fn fetch_content(endpoint: &Endpoint, selector: &str, timeouts: &Timeouts) -> Result<Vec<u8>, TransportError> {
    let mut session = Session::open(endpoint, timeouts.connect).await?;
    session.send(selector).await?;

    let mut body = Vec::new();
    let mut buf = [0u8; SCRATCH];
    let mut first = true;

    loop {
        let deadline = if first { timeouts.per_recv } else { timeouts.inter_chunk };
        let n = session.recv(&mut buf, deadline).await?;
        first = false;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
        if let Some(pos) = find_subslice(&body, TERMINATOR) {
            body.truncate(pos);
            break;
        }
    }

    Ok(body)
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
