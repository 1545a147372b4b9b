// src/conversation/format.rs — Assistant text → display bullets
//
// Segmentation is a pure function of the input: paragraphs split on blank
// lines, list paragraphs split per line with the marker removed, and every
// resulting unit split again on sentence boundaries (". " + capital).
// All bullets borrow from the input, nothing is allocated.

/// Bullets shown for an assistant message before the user asks for more.
pub const DEFAULT_PREVIEW_BULLETS: usize = 3;

/// Segment assistant text into bullets. The returned iterator is lazy and
/// `Clone`, so a caller can restart it; repeated calls on the same input
/// yield the same sequence.
pub fn format_assistant_text(text: &str) -> Bullets<'_> {
    Bullets {
        paragraphs: Paragraphs { rest: text },
        units: None,
        sentences: None,
    }
}

/// The bullets a message shows under the preview policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview<'a> {
    pub bullets: Vec<&'a str>,
    /// Bullets left out because the message is collapsed.
    pub hidden: usize,
}

/// Apply the display policy: the first `limit` bullets unless `expanded`.
pub fn preview(text: &str, expanded: bool, limit: usize) -> Preview<'_> {
    let all = format_assistant_text(text);
    if expanded {
        return Preview {
            bullets: all.collect(),
            hidden: 0,
        };
    }
    let bullets: Vec<&str> = all.clone().take(limit).collect();
    let hidden = all.skip(limit).count();
    Preview { bullets, hidden }
}

#[derive(Debug, Clone)]
pub struct Bullets<'a> {
    paragraphs: Paragraphs<'a>,
    units: Option<Units<'a>>,
    sentences: Option<Sentences<'a>>,
}

impl<'a> Iterator for Bullets<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            if let Some(sentences) = &mut self.sentences {
                if let Some(sentence) = sentences.next() {
                    return Some(sentence);
                }
                self.sentences = None;
            }
            if let Some(units) = &mut self.units {
                if let Some(unit) = units.next() {
                    self.sentences = Some(Sentences { rest: unit });
                    continue;
                }
                self.units = None;
            }
            let paragraph = self.paragraphs.next()?;
            self.units = Some(Units::new(paragraph));
        }
    }
}

/// Splits on runs of two or more line breaks (`\n` or `\r\n`).
#[derive(Debug, Clone)]
struct Paragraphs<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Paragraphs<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let bytes = self.rest.as_bytes();
        for i in 0..bytes.len() {
            if bytes[i] != b'\n' {
                continue;
            }
            let mut j = i + 1;
            if bytes.get(j) == Some(&b'\r') {
                j += 1;
            }
            if bytes.get(j) == Some(&b'\n') {
                let paragraph = &self.rest[..i];
                let mut end = j;
                while matches!(bytes.get(end), Some(b'\n' | b'\r')) {
                    end += 1;
                }
                self.rest = &self.rest[end..];
                return Some(paragraph);
            }
        }
        let paragraph = self.rest;
        self.rest = "";
        Some(paragraph)
    }
}

/// Candidate bullets of one paragraph: one per line for lists, otherwise
/// the paragraph as a whole.
#[derive(Debug, Clone)]
enum Units<'a> {
    Lines(std::str::Lines<'a>),
    Whole(Option<&'a str>),
}

impl<'a> Units<'a> {
    fn new(paragraph: &'a str) -> Self {
        if paragraph.lines().any(|line| marker_len(line).is_some()) {
            Units::Lines(paragraph.lines())
        } else {
            Units::Whole(Some(paragraph))
        }
    }
}

impl<'a> Iterator for Units<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let raw = match self {
                Units::Lines(lines) => lines.next()?,
                Units::Whole(whole) => whole.take()?,
            };
            let unit = strip_marker(raw).trim();
            if !unit.is_empty() {
                return Some(unit);
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Sentences<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while !self.rest.is_empty() {
            let sentence = match sentence_break(self.rest) {
                Some((end, resume)) => {
                    let sentence = &self.rest[..end];
                    self.rest = &self.rest[resume..];
                    sentence
                }
                None => std::mem::take(&mut self.rest),
            };
            let sentence = sentence.trim();
            if !sentence.is_empty() {
                return Some(sentence);
            }
        }
        None
    }
}

/// Length of a leading list marker (`* `, `- ` or `12. `), if any.
fn marker_len(line: &str) -> Option<usize> {
    if line.starts_with("* ") || line.starts_with("- ") {
        return Some(2);
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && line[digits..].starts_with(". ") {
        return Some(digits + 2);
    }
    None
}

fn strip_marker(line: &str) -> &str {
    match marker_len(line) {
        Some(len) => &line[len..],
        None => line,
    }
}

/// Finds a period followed by whitespace and an ASCII capital. Returns the
/// end of the sentence (just past the period) and where the next one starts.
fn sentence_break(text: &str) -> Option<(usize, usize)> {
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '.' {
            continue;
        }
        let end = i + 1;
        let mut resume = end;
        while let Some(&(j, w)) = chars.peek() {
            if !w.is_whitespace() {
                break;
            }
            resume = j + w.len_utf8();
            chars.next();
        }
        if resume > end {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_ascii_uppercase() {
                    return Some((end, resume));
                }
            }
        }
    }
    None
}
