//! Comments, preprocessor lines and other trivia.
//!
//! Every stripping helper here is offset-preserving: removed text is replaced
//! by spaces and newlines are kept, so byte offsets and line numbers computed
//! on the stripped copy are valid for the original source.

/// A comment in the source, with byte offsets `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment<'a> {
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
    pub is_block: bool,
}

/// Skip a string or character literal starting at the quote `i`.
///
/// Returns the offset just past the closing quote. An unterminated literal
/// stops at the end of its line.
pub(crate) fn skip_literal(bytes: &[u8], i: usize) -> usize {
    let quote = bytes[i];
    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

/// Skip a `/* ... */` comment starting at `i`; returns the offset past `*/`.
pub(crate) fn skip_block_comment(bytes: &[u8], i: usize) -> usize {
    let mut j = i + 2;
    while j + 1 < bytes.len() {
        if bytes[j] == b'*' && bytes[j + 1] == b'/' {
            return j + 2;
        }
        j += 1;
    }
    bytes.len()
}

/// Skip a `// ...` comment starting at `i`; returns the offset of the newline.
pub(crate) fn skip_line_comment(bytes: &[u8], i: usize) -> usize {
    bytes[i..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |p| i + p)
}

/// Collect all comments in source order, ignoring comment markers in literals.
pub fn collect_comments(src: &str) -> Vec<Comment<'_>> {
    let bytes = src.as_bytes();
    let mut comments = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = skip_literal(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = skip_block_comment(bytes, i);
                comments.push(Comment {
                    start: i,
                    end,
                    text: &src[i..end],
                    is_block: true,
                });
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = skip_line_comment(bytes, i);
                comments.push(Comment {
                    start: i,
                    end,
                    text: &src[i..end],
                    is_block: false,
                });
                i = end;
            }
            _ => i += 1,
        }
    }
    comments
}

/// Replace every comment with spaces.
pub fn blank_comments(src: &str) -> String {
    let mut out = src.as_bytes().to_vec();
    for comment in collect_comments(src) {
        blank_range(&mut out, comment.start, comment.end);
    }
    into_string(out)
}

/// Replace preprocessor directives (and their `\` continuation lines) with spaces.
pub fn blank_preprocessor(src: &str) -> String {
    let mut out = src.as_bytes().to_vec();
    let mut offset = 0;
    let mut continuing = false;
    for line in src.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if continuing || content.trim_start().starts_with('#') {
            blank_range(&mut out, offset, offset + content.len());
            continuing = content.trim_end().ends_with('\\');
        }
        offset += line.len();
    }
    into_string(out)
}

fn blank_range(bytes: &mut [u8], start: usize, end: usize) {
    for b in &mut bytes[start..end] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

fn into_string(bytes: Vec<u8>) -> String {
    // Blanked ranges always start and end on ASCII delimiters, so whole
    // multi-byte sequences are either kept or replaced.
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Advance past whitespace and comments starting at `pos`.
pub fn skip_trivia(src: &str, mut pos: usize) -> usize {
    let bytes = src.as_bytes();
    while pos < bytes.len() {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
        } else if bytes[pos] == b'/' && bytes.get(pos + 1) == Some(&b'*') {
            pos = skip_block_comment(bytes, pos);
        } else if bytes[pos] == b'/' && bytes.get(pos + 1) == Some(&b'/') {
            pos = skip_line_comment(bytes, pos);
        } else {
            break;
        }
    }
    pos
}

/// Offset of the first byte of the line containing `offset`.
pub fn line_start(src: &str, offset: usize) -> usize {
    src[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Maps byte offsets to 1-based line numbers.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(src.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset)
    }
}
