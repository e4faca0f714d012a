//! Template tokenizer and parser.

use prism_core::errors::TemplateError;

use crate::ast::{Base, Expr, FilterCall, Literal, Node};

#[derive(Debug)]
enum RawToken {
    Text(String),
    Output(String),
    Tag(String),
}

fn syntax(message: impl Into<String>) -> TemplateError {
    TemplateError::Syntax {
        message: message.into(),
    }
}

fn tokenize(src: &str) -> Result<Vec<RawToken>, TemplateError> {
    let mut tokens = Vec::new();
    let mut rest = src;

    while !rest.is_empty() {
        let output_at = rest.find("{{");
        let tag_at = rest.find("{%");
        let next = match (output_at, tag_at) {
            (None, None) => None,
            (Some(a), None) => Some((a, true)),
            (None, Some(b)) => Some((b, false)),
            (Some(a), Some(b)) => {
                if a < b {
                    Some((a, true))
                } else {
                    Some((b, false))
                }
            }
        };

        match next {
            None => {
                tokens.push(RawToken::Text(rest.to_string()));
                break;
            }
            Some((pos, is_output)) => {
                if pos > 0 {
                    tokens.push(RawToken::Text(rest[..pos].to_string()));
                }
                let close = if is_output { "}}" } else { "%}" };
                let after = &rest[pos + 2..];
                let end = after
                    .find(close)
                    .ok_or_else(|| syntax(format!("unclosed '{}'", if is_output { "{{" } else { "{%" })))?;
                let inner = after[..end].trim().to_string();
                if is_output {
                    tokens.push(RawToken::Output(inner));
                } else {
                    tokens.push(RawToken::Tag(inner));
                }
                rest = &after[end + close.len()..];
            }
        }
    }

    Ok(tokens)
}

/// Parse a template into its AST.
pub fn parse(src: &str) -> Result<Vec<Node>, TemplateError> {
    let tokens = tokenize(src)?;
    let mut pos = 0;
    let nodes = parse_nodes(&tokens, &mut pos, None)?;
    if pos != tokens.len() {
        if let RawToken::Tag(tag) = &tokens[pos] {
            return Err(syntax(format!("unexpected '{{% {tag} %}}'")));
        }
        return Err(syntax("unexpected trailing content"));
    }
    Ok(nodes)
}

fn tag_keyword(tag: &str) -> &str {
    tag.split_whitespace().next().unwrap_or("")
}

fn parse_nodes(
    tokens: &[RawToken],
    pos: &mut usize,
    terminators: Option<&[&str]>,
) -> Result<Vec<Node>, TemplateError> {
    let mut nodes = Vec::new();

    while *pos < tokens.len() {
        match &tokens[*pos] {
            RawToken::Text(text) => {
                nodes.push(Node::Text(text.clone()));
                *pos += 1;
            }
            RawToken::Output(expr) => {
                nodes.push(Node::Output(parse_expr(expr)?));
                *pos += 1;
            }
            RawToken::Tag(tag) => {
                let keyword = tag_keyword(tag);
                if let Some(terms) = terminators {
                    if terms.contains(&keyword) {
                        // Caller consumes the terminator.
                        return Ok(nodes);
                    }
                }
                match keyword {
                    "if" => {
                        *pos += 1;
                        nodes.push(parse_if(tag, tokens, pos)?);
                    }
                    "for" => {
                        *pos += 1;
                        nodes.push(parse_for(tag, tokens, pos)?);
                    }
                    "else" | "endif" | "endfor" => {
                        return Err(syntax(format!("unexpected '{{% {keyword} %}}'")));
                    }
                    other => {
                        return Err(syntax(format!("unknown tag '{other}'")));
                    }
                }
            }
        }
    }

    if terminators.is_some() {
        return Err(syntax("unclosed block"));
    }
    Ok(nodes)
}

fn parse_if(tag: &str, tokens: &[RawToken], pos: &mut usize) -> Result<Node, TemplateError> {
    let cond_src = tag["if".len()..].trim();
    if cond_src.is_empty() {
        return Err(syntax("'if' requires a condition"));
    }
    let cond = parse_expr(cond_src)?;

    let then_body = parse_nodes(tokens, pos, Some(&["else", "endif"]))?;
    let mut else_body = Vec::new();

    match tokens.get(*pos) {
        Some(RawToken::Tag(t)) if tag_keyword(t) == "else" => {
            *pos += 1;
            else_body = parse_nodes(tokens, pos, Some(&["endif"]))?;
            match tokens.get(*pos) {
                Some(RawToken::Tag(t)) if tag_keyword(t) == "endif" => *pos += 1,
                _ => return Err(syntax("unclosed 'if' block")),
            }
        }
        Some(RawToken::Tag(t)) if tag_keyword(t) == "endif" => {
            *pos += 1;
        }
        _ => return Err(syntax("unclosed 'if' block")),
    }

    Ok(Node::If {
        cond,
        then_body,
        else_body,
    })
}

fn parse_for(tag: &str, tokens: &[RawToken], pos: &mut usize) -> Result<Node, TemplateError> {
    // for <ident> in <expr>
    let rest = tag["for".len()..].trim();
    let (var, iterable_src) = rest
        .split_once(" in ")
        .ok_or_else(|| syntax("'for' requires the form 'for x in expr'"))?;
    let var = var.trim();
    if var.is_empty() || !is_ident(var) {
        return Err(syntax(format!("invalid loop variable '{var}'")));
    }
    let iterable = parse_expr(iterable_src.trim())?;

    let body = parse_nodes(tokens, pos, Some(&["endfor"]))?;
    match tokens.get(*pos) {
        Some(RawToken::Tag(t)) if tag_keyword(t) == "endfor" => *pos += 1,
        _ => return Err(syntax("unclosed 'for' block")),
    }

    Ok(Node::For {
        var: var.to_string(),
        iterable,
        body,
    })
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn parse_ident(&mut self) -> Result<String, TemplateError> {
        let mut ident = String::new();
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                ident.push(c);
                self.pos += 1;
            }
            _ => return Err(syntax("expected identifier")),
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            ident.push(self.bump().unwrap());
        }
        Ok(ident)
    }

    fn parse_string(&mut self, quote: char) -> Result<String, TemplateError> {
        // Opening quote already consumed.
        let mut s = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(s),
                Some('\\') => match self.bump() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c) => s.push(c),
                    None => return Err(syntax("unterminated string literal")),
                },
                Some(c) => s.push(c),
                None => return Err(syntax("unterminated string literal")),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Literal, TemplateError> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push(self.bump().unwrap());
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(self.bump().unwrap());
            } else if c == '.' && !is_float {
                is_float = true;
                text.push(self.bump().unwrap());
            } else {
                break;
            }
        }
        if is_float {
            text.parse::<f64>()
                .map(Literal::Float)
                .map_err(|_| syntax(format!("invalid number '{text}'")))
        } else {
            text.parse::<i64>()
                .map(Literal::Int)
                .map_err(|_| syntax(format!("invalid number '{text}'")))
        }
    }

    fn parse_literal(&mut self) -> Result<Literal, TemplateError> {
        match self.peek() {
            Some(q @ ('\'' | '"')) => {
                self.pos += 1;
                Ok(Literal::Str(self.parse_string(q)?))
            }
            Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() => {
                let ident = self.parse_ident()?;
                match ident.as_str() {
                    "true" => Ok(Literal::Bool(true)),
                    "false" => Ok(Literal::Bool(false)),
                    other => Err(syntax(format!(
                        "expected literal argument, found '{other}'"
                    ))),
                }
            }
            _ => Err(syntax("expected literal argument")),
        }
    }
}

/// Parse an expression: base, then a filter pipeline.
pub fn parse_expr(src: &str) -> Result<Expr, TemplateError> {
    let mut cursor = Cursor::new(src);
    cursor.skip_ws();

    let base = parse_base(&mut cursor)?;
    let mut filters = Vec::new();

    loop {
        cursor.skip_ws();
        if !cursor.eat('|') {
            break;
        }
        cursor.skip_ws();
        let name = cursor.parse_ident()?;
        let mut args = Vec::new();
        cursor.skip_ws();
        if cursor.eat('(') {
            loop {
                cursor.skip_ws();
                if cursor.eat(')') {
                    break;
                }
                args.push(cursor.parse_literal()?);
                cursor.skip_ws();
                if cursor.eat(',') {
                    continue;
                }
                if cursor.eat(')') {
                    break;
                }
                return Err(syntax(format!("malformed arguments for filter '{name}'")));
            }
        }
        filters.push(FilterCall { name, args });
    }

    cursor.skip_ws();
    if !cursor.at_end() {
        return Err(syntax(format!("unexpected input in expression '{src}'")));
    }

    Ok(Expr { base, filters })
}

fn parse_base(cursor: &mut Cursor) -> Result<Base, TemplateError> {
    match cursor.peek() {
        Some(q @ ('\'' | '"')) => {
            cursor.pos += 1;
            Ok(Base::Literal(Literal::Str(cursor.parse_string(q)?)))
        }
        Some(c) if c.is_ascii_digit() || c == '-' => Ok(Base::Literal(cursor.parse_number()?)),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            let first = cursor.parse_ident()?;
            match first.as_str() {
                "true" => return Ok(Base::Literal(Literal::Bool(true))),
                "false" => return Ok(Base::Literal(Literal::Bool(false))),
                _ => {}
            }
            let mut segments = vec![first];
            while cursor.eat('.') {
                segments.push(cursor.parse_ident()?);
            }
            // Zero-argument global call: only valid on a bare name.
            if cursor.eat('(') {
                cursor.skip_ws();
                if !cursor.eat(')') {
                    return Err(syntax("template calls take no arguments"));
                }
                if segments.len() != 1 {
                    return Err(syntax("only bare globals are callable"));
                }
                return Ok(Base::Call(segments.remove(0)));
            }
            Ok(Base::Path(segments))
        }
        _ => Err(syntax("expected expression")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_output_with_filters() {
        let nodes = parse("Hi {{ name | truncate(5, '…') }}!").unwrap();
        assert_eq!(nodes.len(), 3);
        match &nodes[1] {
            Node::Output(expr) => {
                assert_eq!(expr.base, Base::Path(vec!["name".to_string()]));
                assert_eq!(expr.filters.len(), 1);
                assert_eq!(expr.filters[0].name, "truncate");
                assert_eq!(
                    expr.filters[0].args,
                    vec![Literal::Int(5), Literal::Str("…".to_string())]
                );
            }
            other => panic!("expected output node, got {other:?}"),
        }
    }

    #[test]
    fn parses_nested_blocks() {
        let nodes =
            parse("{% if x %}{% for i in items %}{{ i }}{% endfor %}{% else %}none{% endif %}")
                .unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            Node::If {
                then_body,
                else_body,
                ..
            } => {
                assert_eq!(then_body.len(), 1);
                assert_eq!(else_body.len(), 1);
            }
            other => panic!("expected if node, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unclosed_blocks() {
        assert!(parse("{% if x %}yes").is_err());
        assert!(parse("{% for i in xs %}{{ i }}").is_err());
        assert!(parse("{{ name").is_err());
    }

    #[test]
    fn rejects_stray_terminators() {
        assert!(parse("{% endif %}").is_err());
        assert!(parse("{% else %}").is_err());
    }
}
