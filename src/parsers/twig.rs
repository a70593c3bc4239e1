//! Twig template lexer and parser.
//!
//! Produces the template AST consumed by the template extractor. The parser
//! deliberately covers only what static extraction needs: literal strings,
//! name references, filter chains with their arguments, `set` bindings, and
//! tag nesting (so the walk is depth-first over real scopes). Everything it
//! cannot classify becomes [`Expr::Dynamic`], which downstream extraction
//! treats as "skip, never guess".
//!
//! The parser is lenient by construction: malformed input degrades to text
//! or dynamic nodes and never aborts the surrounding scan.

/// A lexed token inside an expression (`{{ … }}`) or statement (`{% … %}`) body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Quoted string literal, with quote characters and escapes removed.
    Str(String),
    /// Identifier: variable name, filter name, tag keyword.
    Name(String),
    /// Numeric literal (kept as source text; extraction never needs the value).
    Number(String),
    /// Single punctuation character: `| ( ) , = . [ ] { } + - * / ~ : ? < > ! %`.
    Punct(char),
}

/// A top-level segment of a template document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain text between delimiter blocks.
    Text(String),
    /// Expression block `{{ … }}` with its lexed body.
    Expr(Vec<Token>, usize),
    /// Statement block `{% … %}` with its lexed body.
    Stmt(Vec<Token>, usize),
    /// Comment block `{# … #}` (contents discarded).
    Comment,
}

/// Parsed expression, as much of it as static extraction can use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// String literal subject: `'Submit'`.
    Literal(String),
    /// Bare name reference: `label`.
    Name(String),
    /// Subject with one or more applied filters: `'Submit'|t('forms')`.
    Filtered {
        subject: Box<Expr>,
        filters: Vec<FilterCall>,
    },
    /// Anything the parser cannot classify (function calls, concatenation,
    /// arithmetic, member access). Never resolved, never guessed at.
    Dynamic,
}

/// One filter application in a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCall {
    pub name: String,
    pub args: Vec<Arg>,
}

/// A single filter argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Positional string literal.
    Literal(String),
    /// Named argument; `value` is `Some` only when the value is a string literal.
    Named { name: String, value: Option<String> },
    /// Non-literal positional argument.
    Dynamic,
}

/// A node of the template AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal template text.
    Text(String),
    /// Output expression: `{{ … }}`.
    Print { expr: Expr, line: usize },
    /// Inline binding: `{% set name = <expr> %}`.
    Set {
        name: String,
        value: Expr,
        line: usize,
    },
    /// Any other statement tag. Block tags carry their body as children.
    /// `exprs` holds filter chains applied to string literals inside the
    /// statement body (`{% if x == 'Yes'|t %}`, `include ... with` maps), so
    /// translation calls in statement position are not lost.
    Tag {
        name: String,
        exprs: Vec<Expr>,
        children: Vec<Node>,
        line: usize,
    },
}

/// A parsed template document.
#[derive(Debug, Clone, Default)]
pub struct Template {
    pub nodes: Vec<Node>,
}

/// Tags whose bodies nest until the matching `end<tag>`.
const BLOCK_TAGS: &[&str] = &[
    "for",
    "if",
    "block",
    "macro",
    "embed",
    "with",
    "apply",
    "autoescape",
    "sandbox",
    "cache",
    "verbatim",
];

/// Parse a template source string into an AST.
///
/// Never fails: malformed delimiter blocks degrade to text, unknown
/// expressions degrade to [`Expr::Dynamic`], and unbalanced tags are closed
/// at end of input.
pub fn parse(source: &str) -> Template {
    let segments = lex(source);
    let mut pos = 0;
    let nodes = parse_nodes(&segments, &mut pos, None);
    Template { nodes }
}

// ============================================================
// Lexer
// ============================================================

/// Split a document into text / expression / statement / comment segments.
pub fn lex(source: &str) -> Vec<Segment> {
    let bytes = source.as_bytes();
    let mut segments = Vec::new();
    let mut pos = 0;
    let mut line = 1;
    let mut text_start = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'{' && pos + 1 < bytes.len() {
            let opener = bytes[pos + 1];
            if opener == b'{' || opener == b'%' || opener == b'#' {
                if text_start < pos {
                    let text = &source[text_start..pos];
                    line += text.matches('\n').count();
                    segments.push(Segment::Text(text.to_string()));
                }
                let seg_line = line;
                match lex_block(source, pos, opener) {
                    Some((segment, end)) => {
                        line += source[pos..end].matches('\n').count();
                        segments.push(match segment {
                            LexedBlock::Expr(tokens) => Segment::Expr(tokens, seg_line),
                            LexedBlock::Stmt(tokens) => Segment::Stmt(tokens, seg_line),
                            LexedBlock::Comment => Segment::Comment,
                        });
                        pos = end;
                        text_start = pos;
                        continue;
                    }
                    None => {
                        // Unterminated block: the remainder is plain text.
                        segments.push(Segment::Text(source[pos..].to_string()));
                        return segments;
                    }
                }
            }
        }
        pos += 1;
    }

    if text_start < bytes.len() {
        segments.push(Segment::Text(source[text_start..].to_string()));
    }
    segments
}

enum LexedBlock {
    Expr(Vec<Token>),
    Stmt(Vec<Token>),
    Comment,
}

/// Lex one delimiter block starting at `start` (which points at `{`).
///
/// Returns the lexed block and the byte offset just past the closer, or
/// `None` when the closer is missing.
fn lex_block(source: &str, start: usize, opener: u8) -> Option<(LexedBlock, usize)> {
    if opener == b'#' {
        let close = source[start + 2..].find("#}")?;
        return Some((LexedBlock::Comment, start + 2 + close + 2));
    }

    let closer = if opener == b'{' { "}}" } else { "%}" };
    let mut tokens = Vec::new();
    let mut chars = source[start + 2..].char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        let abs = start + 2 + offset;

        // Whitespace-control modifier directly against a delimiter.
        if ch == '-' && source[abs + 1..].starts_with(closer) {
            return Some((finish_block(opener, tokens), abs + 1 + 2));
        }
        if source[abs..].starts_with(closer) {
            return Some((finish_block(opener, tokens), abs + 2));
        }

        if ch.is_whitespace() {
            chars.next();
        } else if ch == '\'' || ch == '"' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                if c == '\\' {
                    if let Some((_, escaped)) = chars.next() {
                        value.push(escaped);
                    }
                } else if c == ch {
                    closed = true;
                    break;
                } else {
                    value.push(c);
                }
            }
            if !closed {
                return None;
            }
            tokens.push(Token::Str(value));
        } else if ch.is_alphabetic() || ch == '_' {
            let mut name = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Name(name));
        } else if ch.is_ascii_digit() {
            let mut number = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_digit() || c == '.' {
                    number.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Number(number));
        } else {
            tokens.push(Token::Punct(ch));
            chars.next();
        }
    }

    None
}

fn finish_block(opener: u8, tokens: Vec<Token>) -> LexedBlock {
    if opener == b'{' {
        LexedBlock::Expr(tokens)
    } else {
        LexedBlock::Stmt(tokens)
    }
}

// ============================================================
// Parser
// ============================================================

/// Parse segments into nodes until end of input or, when `open_tag` is set,
/// until the matching (or any) `end*` statement.
fn parse_nodes(segments: &[Segment], pos: &mut usize, open_tag: Option<&str>) -> Vec<Node> {
    let mut nodes = Vec::new();

    while *pos < segments.len() {
        match &segments[*pos] {
            Segment::Text(text) => {
                nodes.push(Node::Text(text.clone()));
                *pos += 1;
            }
            Segment::Comment => {
                *pos += 1;
            }
            Segment::Expr(tokens, line) => {
                nodes.push(Node::Print {
                    expr: parse_expr(tokens),
                    line: *line,
                });
                *pos += 1;
            }
            Segment::Stmt(tokens, line) => {
                let line = *line;
                let Some(Token::Name(tag)) = tokens.first() else {
                    // Empty or malformed statement, skip it.
                    *pos += 1;
                    continue;
                };
                let tag = tag.clone();

                if tag.starts_with("end") {
                    if open_tag.is_some() {
                        // Any end tag closes the innermost open tag (lenient
                        // recovery for mis-nested input).
                        *pos += 1;
                        return nodes;
                    }
                    // Stray end tag at top level, drop it.
                    *pos += 1;
                    continue;
                }

                if tag == "set" {
                    if let Some(node) = parse_set(tokens, line) {
                        nodes.push(node);
                        *pos += 1;
                        continue;
                    }
                }

                *pos += 1;
                let exprs = embedded_filtered_exprs(&tokens[1..]);
                if BLOCK_TAGS.contains(&tag.as_str()) {
                    let children = parse_nodes(segments, pos, Some(&tag));
                    nodes.push(Node::Tag {
                        name: tag,
                        exprs,
                        children,
                        line,
                    });
                } else {
                    nodes.push(Node::Tag {
                        name: tag,
                        exprs,
                        children: Vec::new(),
                        line,
                    });
                }
            }
        }
    }

    nodes
}

/// Parse `set name = <expr>`. Returns `None` for the block form
/// (`{% set name %}…{% endset %}`), which the caller treats as a plain tag.
fn parse_set(tokens: &[Token], line: usize) -> Option<Node> {
    let name = match tokens.get(1) {
        Some(Token::Name(name)) => name.clone(),
        _ => return None,
    };
    if tokens.get(2) != Some(&Token::Punct('=')) {
        return None;
    }
    Some(Node::Set {
        name,
        value: parse_expr(&tokens[3..]),
        line,
    })
}

/// Find every filter chain applied directly to a string literal inside a
/// statement body. Name subjects are left alone here: a bare name in
/// statement position is almost never a constant binding, and guessing is
/// worse than missing.
fn embedded_filtered_exprs(tokens: &[Token]) -> Vec<Expr> {
    let mut exprs = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if let Token::Str(subject) = &tokens[i] {
            if tokens.get(i + 1) == Some(&Token::Punct('|')) {
                if let Some((expr, end)) = parse_chain(subject, tokens, i + 1) {
                    exprs.push(expr);
                    i = end;
                    continue;
                }
            }
        }
        i += 1;
    }
    exprs
}

/// Parse a filter chain starting at the `|` that follows a literal subject.
/// Returns the expression and the index just past the chain.
fn parse_chain(subject: &str, tokens: &[Token], mut pos: usize) -> Option<(Expr, usize)> {
    let mut filters = Vec::new();
    while tokens.get(pos) == Some(&Token::Punct('|')) {
        let Some(Token::Name(name)) = tokens.get(pos + 1) else {
            break;
        };
        let name = name.clone();
        pos += 2;

        let mut args = Vec::new();
        if tokens.get(pos) == Some(&Token::Punct('(')) {
            let mut depth = 0usize;
            let mut close = None;
            for (j, token) in tokens.iter().enumerate().skip(pos) {
                match token {
                    Token::Punct('(') => depth += 1,
                    Token::Punct(')') => {
                        depth -= 1;
                        if depth == 0 {
                            close = Some(j);
                            break;
                        }
                    }
                    _ => {}
                }
            }
            let close = close?;
            args = parse_args(&tokens[pos + 1..close]);
            pos = close + 1;
        }
        filters.push(FilterCall { name, args });
    }

    if filters.is_empty() {
        return None;
    }
    Some((
        Expr::Filtered {
            subject: Box::new(Expr::Literal(subject.to_string())),
            filters,
        },
        pos,
    ))
}

/// Parse an expression body into the extraction-relevant shape.
fn parse_expr(tokens: &[Token]) -> Expr {
    if tokens.is_empty() {
        return Expr::Dynamic;
    }

    // Split on top-level `|` into subject + filter chain.
    let mut groups: Vec<&[Token]> = Vec::new();
    let mut depth = 0usize;
    let mut group_start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Punct('(') | Token::Punct('[') | Token::Punct('{') => depth += 1,
            Token::Punct(')') | Token::Punct(']') | Token::Punct('}') => {
                depth = depth.saturating_sub(1);
            }
            Token::Punct('|') if depth == 0 => {
                groups.push(&tokens[group_start..i]);
                group_start = i + 1;
            }
            _ => {}
        }
    }
    groups.push(&tokens[group_start..]);

    let subject = match groups[0] {
        [Token::Str(value)] => Expr::Literal(value.clone()),
        [Token::Name(name)] => Expr::Name(name.clone()),
        _ => Expr::Dynamic,
    };

    if groups.len() == 1 {
        return subject;
    }

    let filters: Vec<FilterCall> = groups[1..].iter().filter_map(|g| parse_filter(g)).collect();
    if filters.is_empty() {
        // A pipe with no parsable filter after it: not a usable expression.
        return Expr::Dynamic;
    }

    Expr::Filtered {
        subject: Box::new(subject),
        filters,
    }
}

/// Parse one filter group: `name` or `name(arg, arg, …)`.
fn parse_filter(tokens: &[Token]) -> Option<FilterCall> {
    let name = match tokens.first() {
        Some(Token::Name(name)) => name.clone(),
        _ => return None,
    };

    if tokens.len() == 1 {
        return Some(FilterCall {
            name,
            args: Vec::new(),
        });
    }

    // Arguments must be a single balanced parenthesized list.
    if tokens.get(1) != Some(&Token::Punct('(')) || tokens.last() != Some(&Token::Punct(')')) {
        return Some(FilterCall {
            name,
            args: vec![Arg::Dynamic],
        });
    }

    Some(FilterCall {
        name,
        args: parse_args(&tokens[2..tokens.len() - 1]),
    })
}

/// Split a parenthesized argument body on top-level commas.
fn parse_args(inner: &[Token]) -> Vec<Arg> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut arg_start = 0;
    for (i, token) in inner.iter().enumerate() {
        match token {
            Token::Punct('(') | Token::Punct('[') | Token::Punct('{') => depth += 1,
            Token::Punct(')') | Token::Punct(']') | Token::Punct('}') => {
                depth = depth.saturating_sub(1);
            }
            Token::Punct(',') if depth == 0 => {
                args.push(parse_arg(&inner[arg_start..i]));
                arg_start = i + 1;
            }
            _ => {}
        }
    }
    if arg_start < inner.len() {
        args.push(parse_arg(&inner[arg_start..]));
    }
    args
}

fn parse_arg(tokens: &[Token]) -> Arg {
    match tokens {
        [Token::Str(value)] => Arg::Literal(value.clone()),
        [Token::Name(name), Token::Punct('='), Token::Str(value)] => Arg::Named {
            name: name.clone(),
            value: Some(value.clone()),
        },
        [Token::Name(name), Token::Punct('='), ..] => Arg::Named {
            name: name.clone(),
            value: None,
        },
        _ => Arg::Dynamic,
    }
}
