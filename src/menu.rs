use crate::timeouts::Timeouts;
use crate::transport::{Session, TransportError};

/// One line of a parsed menu response, before classification. Field names
/// follow spec.md §4.2's five-tuple `(typeChar, displayName, selector,
/// host, port)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub item_type: char,
    pub display: String,
    pub selector: String,
    pub host: String,
    pub port: String,
}

const TERMINATOR: &str = ".";
const SCRATCH: usize = 4096;

/// Reads a full response off `session`, splitting strictly on CRLF (never
/// bare CR or LF, per spec.md §4.2), and returns the raw lines up to (not
/// including) the terminator line or EOF — whichever comes first.
///
/// The first `recv` is bound by `per_recv`; once any byte has arrived,
/// subsequent `recv`s are bound by `inter_chunk`, per spec.md §4.1's two
/// deadlines. Partial reads are tolerated: a line that spans two `recv`
/// calls is reassembled from the carry-over buffer before being split.
pub async fn read_lines(session: &mut Session, timeouts: &Timeouts) -> Result<Vec<String>, TransportError> {
    let mut carry = Vec::new();
    let mut lines = Vec::new();
    let mut buf = [0u8; SCRATCH];
    let mut first = true;

    loop {
        let deadline = if first { timeouts.per_recv } else { timeouts.inter_chunk };
        let n = session.recv(&mut buf, deadline).await?;
        first = false;
        if n == 0 {
            break;
        }
        carry.extend_from_slice(&buf[..n]);

        let mut terminated = false;
        while let Some(pos) = find_crlf(&carry) {
            let line_bytes: Vec<u8> = carry.drain(..pos + 2).collect();
            let line = String::from_utf8_lossy(&line_bytes[..line_bytes.len() - 2]).into_owned();
            if line == TERMINATOR {
                terminated = true;
                break;
            }
            lines.push(line);
        }
        if terminated {
            break;
        }
    }

    Ok(lines)
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Splits one menu line into its five tab-separated fields, per spec.md
/// §4.2: the first character of the first field is the type, the rest of
/// that field is the display name.
pub fn parse_line(line: &str) -> Option<Entry> {
    if line.is_empty() {
        return None;
    }
    let mut fields = line.splitn(4, '\t');
    let first = fields.next()?;
    let selector = fields.next().unwrap_or("").to_string();
    let host = fields.next().unwrap_or("").to_string();
    let port = fields.next().unwrap_or("").to_string();

    let mut chars = first.chars();
    let item_type = chars.next()?;
    let display = chars.as_str().to_string();

    Some(Entry {
        item_type,
        display,
        selector,
        host,
        port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_directory_line() {
        let e = parse_line("1Around the world\t/around\tgopher.example.net\t70").unwrap();
        assert_eq!(e.item_type, '1');
        assert_eq!(e.display, "Around the world");
        assert_eq!(e.selector, "/around");
        assert_eq!(e.host, "gopher.example.net");
        assert_eq!(e.port, "70");
    }

    #[test]
    fn parses_an_info_line() {
        let e = parse_line("iSome comment\t\t\t").unwrap();
        assert_eq!(e.item_type, 'i');
        assert_eq!(e.display, "Some comment");
    }

    #[test]
    fn empty_line_has_no_entry() {
        assert!(parse_line("").is_none());
    }

    #[test]
    fn round_trips_synthetic_tuples() {
        let tuples = [
            ('0', "hello", "/hello", "localhost", "70"),
            ('1', "sub", "/sub", "localhost", "70"),
        ];
        for (t, display, selector, host, port) in tuples {
            let line = format!("{t}{display}\t{selector}\t{host}\t{port}");
            let e = parse_line(&line).unwrap();
            assert_eq!(e.item_type, t);
            assert_eq!(e.display, display);
            assert_eq!(e.selector, selector);
            assert_eq!(e.host, host);
            assert_eq!(e.port, port);
        }
    }
}
