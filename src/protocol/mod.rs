//! Line-Oriented Spell-Check Protocol
//!
//! The client side of the protocol is plain text: newline-terminated lines
//! of whitespace-separated words. For every word received, the server
//! answers one verdict line:
//!
//! ```text
//! C: cat dog bird\n
//! S: cat is correct\n
//! S: dog is correct\n
//! S: bird is not correct\n
//! ```
//!
//! TCP is a stream, so a read may deliver half a line or several lines at
//! once. Incoming bytes accumulate in a `BytesMut` buffer and
//! [`extract_line`] carves complete lines off the front; the connection
//! handler drives reads until the buffer yields no more lines.

use crate::dict::Dictionary;
use bytes::{Buf, Bytes, BytesMut};

/// Splits one complete line off the front of the buffer, if present.
///
/// The returned line excludes the `\n` terminator and any trailing `\r`.
/// Returns `None` when the buffer holds no complete line yet; the caller
/// reads more data and retries.
pub fn extract_line(buf: &mut BytesMut) -> Option<Bytes> {
    let pos = buf.iter().position(|&b| b == b'\n')?;
    let mut line = buf.split_to(pos).freeze();
    buf.advance(1); // the newline itself

    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
    Some(line)
}

/// Checks every whitespace-separated token of `line` against the
/// dictionary, in order of appearance.
///
/// Yields `(word, correct)` pairs. Runs of whitespace produce no empty
/// tokens, so a blank line yields nothing.
pub fn check_line<'a>(
    line: &'a str,
    dict: &'a Dictionary,
) -> impl Iterator<Item = (&'a str, bool)> + 'a {
    line.split_ascii_whitespace()
        .map(move |word| (word, dict.contains(word)))
}

/// Formats one verdict line, newline included.
pub fn verdict_line(word: &str, correct: bool) -> String {
    if correct {
        format!("{word} is correct\n")
    } else {
        format!("{word} is not correct\n")
    }
}
