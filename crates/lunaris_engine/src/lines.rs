//! Incremental splitting of a byte stream into text lines.
//!
//! Line breaks may be `\n`, `\r`, or `\r\n`, and may fall on chunk
//! boundaries; partial lines are carried over until the next chunk.

/// Receives lines as a streamed query response is decoded.
pub trait LineSink: Send + Sync {
    fn line(&self, line: &str);
}

#[derive(Debug, Default)]
pub struct LineSplitter {
    carry: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk, emitting every line completed by it.
    pub fn push<F: FnMut(&str)>(&mut self, chunk: &[u8], emit: &mut F) {
        self.carry.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        let mut i = 0;
        while i < self.carry.len() {
            match self.carry[i] {
                b'\n' => {
                    lines.push(decode(&self.carry[start..i]));
                    i += 1;
                    start = i;
                }
                b'\r' => {
                    // A trailing CR may be half of a CRLF split across
                    // chunks; hold it until more data arrives.
                    if i + 1 == self.carry.len() {
                        break;
                    }
                    lines.push(decode(&self.carry[start..i]));
                    i += if self.carry[i + 1] == b'\n' { 2 } else { 1 };
                    start = i;
                }
                _ => i += 1,
            }
        }
        self.carry.drain(..start);

        for line in &lines {
            emit(line);
        }
    }

    /// Flushes a trailing line that did not end in a newline.
    pub fn finish<F: FnMut(&str)>(mut self, emit: &mut F) {
        if self.carry.is_empty() {
            return;
        }
        if self.carry.last() == Some(&b'\r') {
            self.carry.pop();
        }
        let line = decode(&self.carry);
        emit(&line);
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::LineSplitter;

    fn split(chunks: &[&[u8]]) -> Vec<String> {
        let mut splitter = LineSplitter::new();
        let mut lines = Vec::new();
        let mut emit = |line: &str| lines.push(line.to_string());
        for chunk in chunks {
            splitter.push(chunk, &mut emit);
        }
        splitter.finish(&mut emit);
        lines
    }

    #[test]
    fn splits_on_all_three_terminators() {
        assert_eq!(split(&[b"a\nb\rc\r\nd\n"]), ["a", "b", "c", "d"]);
    }

    #[test]
    fn carries_partial_lines_across_chunks() {
        assert_eq!(split(&[b"hea", b"der\nro", b"w1\n"]), ["header", "row1"]);
    }

    #[test]
    fn crlf_split_across_chunks_yields_one_break() {
        assert_eq!(split(&[b"a\r", b"\nb\n"]), ["a", "b"]);
    }

    #[test]
    fn lone_cr_at_chunk_boundary_still_breaks() {
        assert_eq!(split(&[b"a\r", b"b\n"]), ["a", "b"]);
    }

    #[test]
    fn unterminated_final_line_is_flushed() {
        assert_eq!(split(&[b"a\nlast"]), ["a", "last"]);
        assert_eq!(split(&[b"last\r"]), ["last"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(split(&[]), Vec::<String>::new());
        assert_eq!(split(&[b""]), Vec::<String>::new());
    }

    #[test]
    fn blank_lines_are_preserved() {
        assert_eq!(split(&[b"a\n\nb\n"]), ["a", "", "b"]);
    }
}
