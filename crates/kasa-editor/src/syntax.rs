//! Incremental syntax highlighting.
//!
//! Each row gets one [`Highlight`] tag per rendered character, produced by a
//! single left-to-right scan. The only state that crosses rows is the
//! open-block-comment flag: a row ending inside `/* ... ` marks
//! `open_comment`, and the next row's scan starts inside the comment.
//!
//! [`highlight_from`] re-scans a row and then walks forward while the
//! open-comment flag keeps changing — an explicit loop, bounded by "state
//! unchanged," so a pathological file cannot grow the call stack.
//!
//! Language definitions are static data. A language is selected once per
//! filename (first matcher wins); no language means every row is all-Normal.

use bitflags::bitflags;

use crate::row::Row;

// ---------------------------------------------------------------------------
// Highlight
// ---------------------------------------------------------------------------

/// Classification of one rendered character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Normal,
    /// Single-line comment, from the marker to end of row.
    Comment,
    /// Inside a multi-line comment.
    BlockComment,
    /// Control-flow and statement keywords.
    Keyword1,
    /// Type-like keywords (marked with a trailing `|` in the tables).
    Keyword2,
    String,
    Number,
    /// Current search match, painted over the saved row highlight.
    Match,
}

impl Highlight {
    /// The classic SGR color code used when drawing this tag.
    #[must_use]
    pub const fn color(self) -> u8 {
        match self {
            Self::Normal => 39,
            Self::Comment | Self::BlockComment => 36,
            Self::Keyword1 => 33,
            Self::Keyword2 => 32,
            Self::String => 35,
            Self::Number => 31,
            Self::Match => 34,
        }
    }
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

bitflags! {
    /// Which optional scanner features a language enables.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HighlightFlags: u8 {
        const NUMBERS = 1 << 0;
        const STRINGS = 1 << 1;
    }
}

/// A static language definition.
#[derive(Debug)]
pub struct Language {
    pub name: &'static str,
    /// Filename matchers. A matcher starting with `.` must equal the
    /// filename's extension; anything else matches as a substring.
    pub filematch: &'static [&'static str],
    /// Keyword list. A trailing `|` marks a type-like keyword (Keyword2).
    pub keywords: &'static [&'static str],
    pub line_comment: Option<&'static str>,
    pub block_comment: Option<(&'static str, &'static str)>,
    pub flags: HighlightFlags,
}

const C_KEYWORDS: &[&str] = &[
    "switch", "if", "while", "for", "break", "continue", "return", "else",
    "struct", "union", "typedef", "static", "enum", "class", "case",
    "int|", "long|", "double|", "float|", "char|", "unsigned|", "signed|", "void|",
];

/// The built-in language registry. First filematch hit wins.
pub static LANGUAGES: &[Language] = &[
    Language {
        name: "c",
        filematch: &[".c", ".h"],
        keywords: C_KEYWORDS,
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        flags: HighlightFlags::NUMBERS.union(HighlightFlags::STRINGS),
    },
    Language {
        name: "c++",
        filematch: &[".cpp", ".hpp", ".cc", ".cxx"],
        keywords: C_KEYWORDS,
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        flags: HighlightFlags::NUMBERS.union(HighlightFlags::STRINGS),
    },
    Language {
        name: "python",
        filematch: &[".py", ".pyw"],
        keywords: &[
            "def", "class", "if", "elif", "else", "while", "for", "in", "try", "except",
            "finally", "with", "as", "pass", "break", "continue", "return", "yield",
            "import", "from", "raise", "global", "nonlocal", "assert", "lambda",
            "True", "False", "None",
            "int|", "float|", "str|", "bool|", "list|", "dict|", "set|", "tuple|",
            "object|", "bytes|", "range|", "enumerate|", "len|", "open|", "print|",
        ],
        line_comment: Some("#"),
        block_comment: Some(("\"\"\"", "\"\"\"")),
        flags: HighlightFlags::NUMBERS.union(HighlightFlags::STRINGS),
    },
    Language {
        name: "c#",
        filematch: &[".cs"],
        keywords: &[
            "using", "namespace", "class", "public", "private", "protected", "internal",
            "static", "readonly", "void|", "int|", "string|", "bool|", "float|", "double|",
            "if", "else", "for", "while", "switch", "case", "return", "new", "try", "catch",
            "finally", "true", "false", "null",
        ],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        flags: HighlightFlags::NUMBERS.union(HighlightFlags::STRINGS),
    },
    Language {
        name: "java",
        filematch: &[".java"],
        keywords: &[
            "package", "import", "class", "interface", "extends", "implements",
            "public", "private", "protected", "static", "void|", "int|", "float|",
            "double|", "boolean|", "char|", "new", "return", "this", "super",
            "if", "else", "for", "while", "switch", "case", "try", "catch", "finally",
            "null", "true", "false",
        ],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        flags: HighlightFlags::NUMBERS.union(HighlightFlags::STRINGS),
    },
    Language {
        name: "javascript",
        filematch: &[".js", ".jsx"],
        keywords: &[
            "function", "var", "let", "const", "return", "if", "else", "for",
            "while", "switch", "case", "break", "continue", "new", "this",
            "class", "extends", "super", "try", "catch", "finally", "true",
            "false", "null", "undefined",
        ],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        flags: HighlightFlags::NUMBERS.union(HighlightFlags::STRINGS),
    },
    Language {
        name: "html",
        filematch: &[".html", ".htm", ".css"],
        keywords: &[
            "html", "head", "body", "div", "span", "h1", "h2", "h3", "h4", "h5", "h6",
            "p", "a", "img", "ul", "li", "table", "tr", "td", "th", "form", "input",
            "button", "style", "script", "link", "meta", "class", "id",
            "color", "font-size", "margin", "padding", "border", "background",
            "display", "flex", "grid", "align-items", "justify-content", "position",
        ],
        line_comment: Some("<!--"),
        block_comment: Some(("<!--", "-->")),
        flags: HighlightFlags::STRINGS,
    },
    Language {
        name: "rust",
        filematch: &[".rs"],
        keywords: &[
            "fn", "let", "mut", "const", "struct", "enum", "impl", "trait", "match",
            "if", "else", "for", "loop", "while", "break", "continue", "return",
            "pub", "use", "crate", "mod", "ref", "as", "in", "where", "move", "Self",
            "true", "false", "Option|", "Result|", "String|", "Vec|",
        ],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        flags: HighlightFlags::NUMBERS.union(HighlightFlags::STRINGS),
    },
    Language {
        name: "sql",
        filematch: &[".sql"],
        keywords: &[
            "SELECT", "FROM", "WHERE", "INSERT", "INTO", "VALUES", "UPDATE",
            "SET", "DELETE", "JOIN", "INNER", "LEFT", "RIGHT", "ON", "AS", "AND",
            "OR", "NOT", "NULL", "LIKE", "IN", "IS", "CREATE", "TABLE", "PRIMARY",
            "KEY", "FOREIGN", "DROP", "ALTER", "INDEX", "VIEW", "DATABASE",
            "INT|", "VARCHAR|", "TEXT|", "DATE|", "BOOLEAN|",
        ],
        line_comment: Some("--"),
        block_comment: Some(("/*", "*/")),
        flags: HighlightFlags::NUMBERS.union(HighlightFlags::STRINGS),
    },
];

/// Select a language for a filename, or `None`.
///
/// Extension matchers compare against the text after the last `.` in the
/// filename (including the dot); other matchers are substring tests.
#[must_use]
pub fn select_language(filename: &str) -> Option<&'static Language> {
    let ext = filename.rfind('.').map(|i| &filename[i..]);

    LANGUAGES.iter().find(|lang| {
        lang.filematch.iter().any(|m| {
            if m.starts_with('.') {
                ext == Some(*m)
            } else {
                filename.contains(m)
            }
        })
    })
}

// ---------------------------------------------------------------------------
// Separators
// ---------------------------------------------------------------------------

/// Word/keyword boundary characters: whitespace, NUL, or fixed punctuation.
#[must_use]
pub fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '\0' || ",.()+-/*=~%<>[];".contains(c)
}

// ---------------------------------------------------------------------------
// Row scanning
// ---------------------------------------------------------------------------

/// Re-highlight `rows[at]` and propagate the open-comment flag forward.
///
/// Propagation runs as a loop over increasing indices and stops at the
/// first row whose `open_comment` comes out unchanged.
pub fn highlight_from(rows: &mut [Row], at: usize, lang: Option<&Language>) {
    let mut idx = at;
    while idx < rows.len() {
        let prev_open = idx > 0 && rows[idx - 1].open_comment;
        let changed = highlight_row(&mut rows[idx], prev_open, lang);
        if !changed {
            break;
        }
        idx += 1;
    }
}

/// Re-highlight every row from the top. Used after selecting a language or
/// restoring an undo snapshot.
pub fn highlight_all(rows: &mut [Row], lang: Option<&Language>) {
    for idx in 0..rows.len() {
        let prev_open = idx > 0 && rows[idx - 1].open_comment;
        highlight_row(&mut rows[idx], prev_open, lang);
    }
}

fn matches_at(chars: &[char], at: usize, pat: &str) -> bool {
    let mut k = at;
    for pc in pat.chars() {
        if chars.get(k) != Some(&pc) {
            return false;
        }
        k += 1;
    }
    true
}

/// Scan one row. Returns true when the trailing open-comment state changed
/// (the caller must then recompute the next row).
fn highlight_row(row: &mut Row, prev_open: bool, lang: Option<&Language>) -> bool {
    let chars: Vec<char> = row.rendered.chars().collect();
    let mut hl = vec![Highlight::Normal; chars.len()];

    let Some(lang) = lang else {
        row.highlight = hl;
        let changed = row.open_comment;
        row.open_comment = false;
        return changed;
    };

    let mut prev_sep = true;
    let mut in_string: Option<char> = None;
    let mut in_comment = prev_open;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let prev_hl = if i > 0 { hl[i - 1] } else { Highlight::Normal };

        if let Some(scs) = lang.line_comment {
            if in_string.is_none() && !in_comment && matches_at(&chars, i, scs) {
                for tag in &mut hl[i..] {
                    *tag = Highlight::Comment;
                }
                break;
            }
        }

        if let Some((mcs, mce)) = lang.block_comment {
            if in_string.is_none() {
                if in_comment {
                    hl[i] = Highlight::BlockComment;
                    if matches_at(&chars, i, mce) {
                        let end = i + mce.chars().count();
                        for tag in &mut hl[i..end] {
                            *tag = Highlight::BlockComment;
                        }
                        i = end;
                        in_comment = false;
                        prev_sep = true;
                    } else {
                        i += 1;
                    }
                    continue;
                } else if matches_at(&chars, i, mcs) {
                    let end = i + mcs.chars().count();
                    for tag in &mut hl[i..end] {
                        *tag = Highlight::BlockComment;
                    }
                    i = end;
                    in_comment = true;
                    continue;
                }
            }
        }

        if lang.flags.contains(HighlightFlags::STRINGS) {
            if let Some(quote) = in_string {
                hl[i] = Highlight::String;
                // An escape pair stays inside the string as one unit.
                if c == '\\' && i + 1 < chars.len() {
                    hl[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if c == quote {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if c == '"' || c == '\'' {
                in_string = Some(c);
                hl[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        if lang.flags.contains(HighlightFlags::NUMBERS)
            && ((c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == '.' && prev_hl == Highlight::Number))
        {
            hl[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        if prev_sep {
            let mut matched = false;
            for kw in lang.keywords {
                let (word, tag) = kw.strip_suffix('|').map_or(
                    (*kw, Highlight::Keyword1),
                    |w| (w, Highlight::Keyword2),
                );
                let klen = word.chars().count();
                // A keyword only counts when a separator (or end of row)
                // follows it.
                if matches_at(&chars, i, word)
                    && chars.get(i + klen).is_none_or(|&next| is_separator(next))
                {
                    for t in &mut hl[i..i + klen] {
                        *t = tag;
                    }
                    i += klen;
                    matched = true;
                    break;
                }
            }
            if matched {
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(c);
        i += 1;
    }

    row.highlight = hl;
    let changed = row.open_comment != in_comment;
    row.open_comment = in_comment;
    changed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
