//! Environment markers on requirement lines (`; sys_platform == "darwin"`).
//!
//! Only the platform variables are evaluated. Interpreter variables such
//! as `python_version` describe the downstream installer rather than the
//! machine this build runs on, so comparisons against them always match.

/// Platform values in the form requirement markers expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// `sys_platform`: `linux`, `darwin`, `win32`, ...
    pub sys_platform: String,
    /// `platform_system`: `Linux`, `Darwin`, `Windows`, ...
    pub platform_system: String,
    /// `os_name`: `posix` or `nt`
    pub os_name: String,
}

impl Platform {
    /// The platform this process was compiled for.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a Rust `target_os` name onto marker values.
    pub fn from_os(os: &str) -> Self {
        let (sys_platform, platform_system, os_name) = match os {
            "linux" => ("linux", "Linux", "posix"),
            "macos" => ("darwin", "Darwin", "posix"),
            "windows" => ("win32", "Windows", "nt"),
            "freebsd" => ("freebsd", "FreeBSD", "posix"),
            "openbsd" => ("openbsd", "OpenBSD", "posix"),
            "netbsd" => ("netbsd", "NetBSD", "posix"),
            other => (other, other, "posix"),
        };
        Self {
            sys_platform: sys_platform.to_owned(),
            platform_system: platform_system.to_owned(),
            os_name: os_name.to_owned(),
        }
    }

    fn lookup(&self, variable: &str) -> Option<&str> {
        match variable {
            "sys_platform" => Some(&self.sys_platform),
            "platform_system" => Some(&self.platform_system),
            "os_name" => Some(&self.os_name),
            _ => None,
        }
    }
}

/// Evaluate a marker expression against `platform`.
///
/// Returns `Err` with a human-readable reason when the marker is malformed.
pub fn evaluate(marker: &str, platform: &Platform) -> Result<bool, String> {
    let tokens = tokenize(marker)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        platform,
    };
    let value = parser.expr()?;
    if parser.pos != tokens.len() {
        return Err(format!("unexpected token {:?}", tokens[parser.pos]));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Str(String),
    Ident(String),
    Op(String),
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == c => break,
                        Some(ch) => value.push(ch),
                        None => return Err("unterminated string literal".to_owned()),
                    }
                }
                tokens.push(Token::Str(value));
            }
            '=' | '!' | '<' | '>' | '~' => {
                let mut op = String::new();
                while let Some(&ch) = chars.peek() {
                    if matches!(ch, '=' | '!' | '<' | '>' | '~') {
                        op.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Op(op));
            }
            c if c.is_ascii_alphanumeric() || c == '_' || c == '.' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character {other:?}")),
        }
    }

    Ok(tokens)
}

/// PEP 508 comparison operators spelled with symbols.
const COMPARISON_OPS: &[&str] = &["==", "!=", "<", "<=", ">", ">=", "~=", "==="];

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    platform: &'a Platform,
}

enum Operand {
    Literal(String),
    Variable(String),
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(id)) if id == keyword)
    }

    fn expr(&mut self) -> Result<bool, String> {
        let mut value = self.term()?;
        while self.peek_keyword("or") {
            self.pos += 1;
            let rhs = self.term()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<bool, String> {
        let mut value = self.atom()?;
        while self.peek_keyword("and") {
            self.pos += 1;
            let rhs = self.atom()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn atom(&mut self) -> Result<bool, String> {
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            let value = self.expr()?;
            return match self.next() {
                Some(Token::RParen) => Ok(value),
                _ => Err("missing closing parenthesis".to_owned()),
            };
        }

        let lhs = self.operand()?;
        let op = self.operator()?;
        let rhs = self.operand()?;
        self.compare(lhs, &op, rhs)
    }

    fn operand(&mut self) -> Result<Operand, String> {
        match self.next() {
            Some(Token::Str(value)) => Ok(Operand::Literal(value)),
            Some(Token::Ident(name)) if name != "and" && name != "or" => {
                Ok(Operand::Variable(name))
            }
            Some(other) => Err(format!("expected a value, found {other:?}")),
            None => Err("expected a value, found end of marker".to_owned()),
        }
    }

    fn operator(&mut self) -> Result<String, String> {
        match self.next() {
            Some(Token::Op(op)) if COMPARISON_OPS.contains(&op.as_str()) => Ok(op),
            Some(Token::Op(op)) => Err(format!("unknown comparison operator {op:?}")),
            Some(Token::Ident(word)) if word == "in" => Ok("in".to_owned()),
            Some(Token::Ident(word)) if word == "not" => match self.next() {
                Some(Token::Ident(next)) if next == "in" => Ok("not in".to_owned()),
                _ => Err("expected `in` after `not`".to_owned()),
            },
            Some(other) => Err(format!("expected an operator, found {other:?}")),
            None => Err("expected an operator, found end of marker".to_owned()),
        }
    }

    fn compare(&self, lhs: Operand, op: &str, rhs: Operand) -> Result<bool, String> {
        let (left, right) = match (self.resolve(lhs)?, self.resolve(rhs)?) {
            (Some(l), Some(r)) => (l, r),
            // Interpreter variable on either side
            _ => return Ok(true),
        };

        match op {
            "==" | "===" => Ok(left == right),
            "!=" => Ok(left != right),
            "in" => Ok(right.contains(left.as_str())),
            "not in" => Ok(!right.contains(left.as_str())),
            other => Err(format!("operator {other:?} is not supported for platform markers")),
        }
    }

    fn resolve(&self, operand: Operand) -> Result<Option<String>, String> {
        match operand {
            Operand::Literal(value) => Ok(Some(value)),
            Operand::Variable(name) => match self.platform.lookup(&name) {
                Some(value) => Ok(Some(value.to_owned())),
                None if is_known_variable(&name) => Ok(None),
                None => Err(format!("unknown marker variable {name:?}")),
            },
        }
    }
}

fn is_known_variable(name: &str) -> bool {
    matches!(
        name,
        "python_version"
            | "python_full_version"
            | "implementation_name"
            | "implementation_version"
            | "platform_python_implementation"
            | "platform_release"
            | "platform_version"
            | "platform_machine"
            | "extra"
    )
}
