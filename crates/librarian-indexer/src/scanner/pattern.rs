//! Gitignore pattern compilation.
//!
//! A pattern line compiles into a [`Pattern`]: a list of path segments plus
//! the anchored / negated / directory-only flags. Compilation is pure and
//! never fails; lines that carry no pattern (blank, comment) yield `None`.

/// One path segment of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Exact segment text (escapes already resolved).
    Literal(String),
    /// Segment with `*`, `?` or `[...]` wildcards.
    Glob(Vec<Token>),
    /// `**`: any number of whole segments.
    AnyDepth,
}

/// One element of a glob segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Char(char),
    /// `?`
    AnyChar,
    /// `*`
    AnyRun,
    /// `[...]`
    Class {
        negated: bool,
        ranges: Vec<(char, char)>,
    },
}

/// A compiled gitignore pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<Segment>,
    anchored: bool,
    negated: bool,
    dir_only: bool,
}

impl Pattern {
    /// Compile one line of gitignore syntax.
    pub fn compile(line: &str) -> Option<Pattern> {
        let line = trim_trailing_spaces(line.trim_end_matches(['\n', '\r']));
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (negated, body) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };

        let dir_only = body.ends_with('/');
        let body = body.trim_end_matches('/');
        if body.is_empty() {
            return None;
        }

        let anchored = body.contains('/');
        let body = body.trim_start_matches('/');

        let segments: Vec<Segment> = body
            .split('/')
            .filter(|s| !s.is_empty())
            .map(compile_segment)
            .collect();

        if segments.is_empty() {
            return None;
        }

        Some(Pattern {
            segments,
            anchored,
            negated,
            dir_only,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    /// Whether this pattern matches the given root-relative path.
    ///
    /// Only the path itself is tested; ancestor directories are the
    /// caller's concern.
    pub fn matches(&self, rel_path: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }

        if self.anchored {
            let parts: Vec<&str> = rel_path.split('/').filter(|s| !s.is_empty()).collect();
            match_segments(&self.segments, &parts)
        } else {
            let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
            self.segments
                .first()
                .is_some_and(|segment| segment.matches(name))
        }
    }
}

impl Segment {
    /// Match a single path segment.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Segment::Literal(text) => text == name,
            Segment::Glob(tokens) => {
                let chars: Vec<char> = name.chars().collect();
                glob_match(tokens, &chars)
            }
            Segment::AnyDepth => true,
        }
    }
}

impl Token {
    fn matches_char(&self, c: char) -> bool {
        match self {
            Token::Char(expected) => *expected == c,
            Token::AnyChar => true,
            Token::AnyRun => true,
            Token::Class { negated, ranges } => {
                let hit = ranges.iter().any(|(lo, hi)| *lo <= c && c <= *hi);
                hit != *negated
            }
        }
    }
}

/// Trailing spaces are dropped unless escaped with a backslash.
fn trim_trailing_spaces(line: &str) -> &str {
    let mut end = line.len();
    while line[..end].ends_with(' ') {
        let before = &line[..end - 1];
        if before.ends_with('\\') {
            break;
        }
        end -= 1;
    }
    &line[..end]
}

fn compile_segment(text: &str) -> Segment {
    if text == "**" {
        return Segment::AnyDepth;
    }

    let tokens = tokenize(text);
    if tokens.iter().all(|t| matches!(t, Token::Char(_))) {
        let literal = tokens
            .into_iter()
            .filter_map(|t| match t {
                Token::Char(c) => Some(c),
                _ => None,
            })
            .collect();
        Segment::Literal(literal)
    } else {
        Segment::Glob(tokens)
    }
}

fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                tokens.push(Token::Char(chars[i + 1]));
                i += 2;
            }
            '*' => {
                // Consecutive stars inside a segment behave like one.
                if tokens.last() != Some(&Token::AnyRun) {
                    tokens.push(Token::AnyRun);
                }
                i += 1;
            }
            '?' => {
                tokens.push(Token::AnyChar);
                i += 1;
            }
            '[' => match parse_class(&chars[i..]) {
                Some((class, consumed)) => {
                    tokens.push(class);
                    i += consumed;
                }
                None => {
                    tokens.push(Token::Char('['));
                    i += 1;
                }
            },
            c => {
                tokens.push(Token::Char(c));
                i += 1;
            }
        }
    }

    tokens
}

/// Parse a bracket expression starting at `chars[0] == '['`.
///
/// Returns the class token and the number of chars consumed, or `None` when
/// the bracket is never closed (it is then a literal `[`).
fn parse_class(chars: &[char]) -> Option<(Token, usize)> {
    let mut j = 1;
    let negated = matches!(chars.get(j), Some('!') | Some('^'));
    if negated {
        j += 1;
    }

    let mut ranges = Vec::new();
    let mut first = true;

    while j < chars.len() {
        let c = chars[j];
        if c == ']' && !first {
            return Some((Token::Class { negated, ranges }, j + 1));
        }
        first = false;

        let (lo, next) = if c == '\\' && j + 1 < chars.len() {
            (chars[j + 1], j + 2)
        } else {
            (c, j + 1)
        };

        if next + 1 < chars.len() && chars[next] == '-' && chars[next + 1] != ']' {
            ranges.push((lo, chars[next + 1]));
            j = next + 2;
        } else {
            ranges.push((lo, lo));
            j = next;
        }
    }

    None
}

/// Single-segment glob match. Backtracks only to the most recent `*`, so
/// the cost stays linear in `tokens.len() * text.len()`.
fn glob_match(tokens: &[Token], text: &[char]) -> bool {
    let (mut t, mut c) = (0, 0);
    // Position of the last `*` and the text index it currently absorbs up to
    let mut star: Option<(usize, usize)> = None;

    while c < text.len() {
        match tokens.get(t) {
            Some(Token::AnyRun) => {
                star = Some((t, c));
                t += 1;
            }
            Some(token) if token.matches_char(text[c]) => {
                t += 1;
                c += 1;
            }
            _ => match star {
                Some((star_t, star_c)) => {
                    t = star_t + 1;
                    c = star_c + 1;
                    star = Some((star_t, star_c + 1));
                }
                None => return false,
            },
        }
    }

    tokens[t..].iter().all(|token| matches!(token, Token::AnyRun))
}

fn match_segments(pattern: &[Segment], parts: &[&str]) -> bool {
    match pattern.split_first() {
        None => parts.is_empty(),
        // A trailing `**` means "everything inside", not the directory itself.
        Some((Segment::AnyDepth, [])) => !parts.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=parts.len()).any(|skip| match_segments(rest, &parts[skip..]))
        }
        Some((segment, rest)) => match parts.split_first() {
            Some((name, tail)) => segment.matches(name) && match_segments(rest, tail),
            None => false,
        },
    }
}
