//! Case-insensitive substring search over wrapped lines
//!
//! Each line is scanned on its own. After a hit the scan resumes one
//! character past the start of the hit, so overlapping occurrences are all
//! reported: `"aa"` in `"aaa"` matches at 0 and at 1.
//!
//! Offsets are character offsets into the line, not byte offsets.

/// A single hit inside the line sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Line index in the current line sequence
    pub line: usize,
    /// First matched character
    pub start: usize,
    /// One past the last matched character
    pub end: usize,
}

/// All matches of `query` in `lines`, ordered by line then start offset
pub fn find_matches(lines: &[String], query: &str) -> Vec<Match> {
    let needle: Vec<char> = fold(query).collect();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (line_idx, line) in lines.iter().enumerate() {
        let hay: Vec<char> = fold(line).collect();
        if hay.len() < needle.len() {
            continue;
        }
        for start in 0..=hay.len() - needle.len() {
            if hay[start..start + needle.len()] == needle[..] {
                matches.push(Match { line: line_idx, start, end: start + needle.len() });
            }
        }
    }
    matches
}

/// Lowercase one character at a time so offsets stay aligned with the source
fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().map(|c| c.to_lowercase().next().unwrap_or(c))
}

/// Active search: the query, its matches, and the selected match
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    query: String,
    matches: Vec<Match>,
    current: Option<usize>,
}

impl SearchIndex {
    /// Build the index for `query` over `lines`, selecting the first match
    pub fn build(lines: &[String], query: &str) -> Self {
        let matches = find_matches(lines, query);
        let current = if matches.is_empty() { None } else { Some(0) };
        Self { query: query.to_string(), matches, current }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Index of the selected match, if any
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The selected match, if any
    pub fn current(&self) -> Option<Match> {
        self.current.and_then(|i| self.matches.get(i).copied())
    }

    /// Select the next match, wrapping to the first
    pub fn select_next(&mut self) -> Option<Match> {
        let count = self.matches.len();
        if count == 0 {
            return None;
        }
        self.current = Some(self.current.map_or(0, |i| (i + 1) % count));
        self.current()
    }

    /// Select the previous match, wrapping to the last
    pub fn select_prev(&mut self) -> Option<Match> {
        let count = self.matches.len();
        if count == 0 {
            return None;
        }
        self.current = Some(self.current.map_or(count - 1, |i| (i + count - 1) % count));
        self.current()
    }

    /// Matches on one line, paired with whether each is the selected one
    pub fn matches_on_line(&self, line: usize) -> impl Iterator<Item = (Match, bool)> + '_ {
        let first = self.matches.partition_point(|m| m.line < line);
        self.matches[first..]
            .iter()
            .enumerate()
            .take_while(move |(_, m)| m.line == line)
            .map(move |(i, m)| (*m, self.current == Some(first + i)))
    }
}

/// Offset that brings `match_line` into a viewport of `visible` lines at `offset`
pub fn follow_offset(offset: usize, visible: usize, match_line: usize) -> usize {
    if match_line < offset {
        match_line
    } else if match_line >= offset + visible {
        match_line + 1 - visible.max(1)
    } else {
        offset
    }
}
