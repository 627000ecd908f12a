use std::fmt;

use crate::error::SourceLocation;

/// All token types in AWK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Newline,

    // Operands
    Var,
    Number,
    String,
    Regex,
    UserFunc,
    Builtin(Builtin),

    // Delimiters
    Semicolon,    // ;
    Comma,        // ,
    LeftBracket,  // [
    RightBracket, // ]
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }

    // Operators
    Dollar,    // $
    Increment, // ++
    Decrement, // --
    Pow,       // ^ or **
    Not,       // !
    Star,      // *
    Slash,     // /
    Percent,   // %
    Plus,      // +
    Minus,     // -

    Less,         // <
    LessEqual,    // <=
    NotEqual,     // !=
    Equal,        // ==
    Greater,      // >
    GreaterEqual, // >=
    Match,        // ~
    NotMatch,     // !~
    And,          // &&
    Or,           // ||
    Question,     // ?
    Colon,        // :

    PowAssign,     // ^= or **=
    PercentAssign, // %=
    StarAssign,    // *=
    SlashAssign,   // /=
    PlusAssign,    // +=
    MinusAssign,   // -=
    Assign,        // =
    Append,        // >>
    Pipe,          // |

    // Keywords
    In,
    Begin,
    End,
    If,
    Else,
    While,
    For,
    Do,
    Break,
    Continue,
    Exit,
    Function,
    Return,
    Next,
    Nextfile,
    Delete,
    Print,
    Printf,
    Getline,
}

/// Builtin functions, including the ones the grammar treats specially
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Atan2,
    Cos,
    Sin,
    Exp,
    Log,
    Sqrt,
    Int,
    Rand,
    Srand,
    Length,
    Tolower,
    Toupper,
    System,
    Fflush,
    And,
    Or,
    Xor,
    Lshift,
    Rshift,
    Close,
    Index,
    Match,
    Split,
    Sub,
    Gsub,
    Sprintf,
    Substr,
}

/// Coarse classification of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Eof,
    Newline,
    Var,
    Number,
    String,
    Regex,
    UserFunc,
    Builtin,
    /// Operator or punctuation
    Token,
    Keyword,
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenClass::Eof => "eof",
            TokenClass::Newline => "newline",
            TokenClass::Var => "var",
            TokenClass::Number => "number",
            TokenClass::String => "string",
            TokenClass::Regex => "regex",
            TokenClass::UserFunc => "userfunc",
            TokenClass::Builtin => "builtin",
            TokenClass::Token => "token",
            TokenClass::Keyword => "keyword",
        };
        f.write_str(name)
    }
}

impl TokenKind {
    pub fn class(&self) -> TokenClass {
        match self {
            TokenKind::Eof => TokenClass::Eof,
            TokenKind::Newline => TokenClass::Newline,
            TokenKind::Var => TokenClass::Var,
            TokenKind::Number => TokenClass::Number,
            TokenKind::String => TokenClass::String,
            TokenKind::Regex => TokenClass::Regex,
            TokenKind::UserFunc => TokenClass::UserFunc,
            TokenKind::Builtin(_) => TokenClass::Builtin,
            k if k.is_keyword() => TokenClass::Keyword,
            _ => TokenClass::Token,
        }
    }

    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::In
                | TokenKind::Begin
                | TokenKind::End
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Do
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Exit
                | TokenKind::Function
                | TokenKind::Return
                | TokenKind::Next
                | TokenKind::Nextfile
                | TokenKind::Delete
                | TokenKind::Print
                | TokenKind::Printf
                | TokenKind::Getline
        )
    }

    /// Whether a `/` after this token divides rather than starting a regex
    pub fn produces_value(&self) -> bool {
        matches!(
            self,
            TokenKind::Number
                | TokenKind::String
                | TokenKind::Var
                | TokenKind::Getline
                | TokenKind::RightParen
                | TokenKind::RightBracket
                | TokenKind::Increment
                | TokenKind::Decrement
        )
    }

    /// Source spelling of fixed tokens, descriptive name otherwise
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Eof => "end of input",
            TokenKind::Newline => "newline",
            TokenKind::Var => "variable",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Regex => "regex",
            TokenKind::UserFunc => "function name",
            TokenKind::Builtin(b) => b.name(),
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Dollar => "$",
            TokenKind::Increment => "++",
            TokenKind::Decrement => "--",
            TokenKind::Pow => "^",
            TokenKind::Not => "!",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::NotEqual => "!=",
            TokenKind::Equal => "==",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Match => "~",
            TokenKind::NotMatch => "!~",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::PowAssign => "^=",
            TokenKind::PercentAssign => "%=",
            TokenKind::StarAssign => "*=",
            TokenKind::SlashAssign => "/=",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::Assign => "=",
            TokenKind::Append => ">>",
            TokenKind::Pipe => "|",
            TokenKind::In => "in",
            TokenKind::Begin => "BEGIN",
            TokenKind::End => "END",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::Do => "do",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Exit => "exit",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::Next => "next",
            TokenKind::Nextfile => "nextfile",
            TokenKind::Delete => "delete",
            TokenKind::Print => "print",
            TokenKind::Printf => "printf",
            TokenKind::Getline => "getline",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Atan2 => "atan2",
            Builtin::Cos => "cos",
            Builtin::Sin => "sin",
            Builtin::Exp => "exp",
            Builtin::Log => "log",
            Builtin::Sqrt => "sqrt",
            Builtin::Int => "int",
            Builtin::Rand => "rand",
            Builtin::Srand => "srand",
            Builtin::Length => "length",
            Builtin::Tolower => "tolower",
            Builtin::Toupper => "toupper",
            Builtin::System => "system",
            Builtin::Fflush => "fflush",
            Builtin::And => "and",
            Builtin::Or => "or",
            Builtin::Xor => "xor",
            Builtin::Lshift => "lshift",
            Builtin::Rshift => "rshift",
            Builtin::Close => "close",
            Builtin::Index => "index",
            Builtin::Match => "match",
            Builtin::Split => "split",
            Builtin::Sub => "sub",
            Builtin::Gsub => "gsub",
            Builtin::Sprintf => "sprintf",
            Builtin::Substr => "substr",
        }
    }

    /// Builtins with their own grammar (regex or lvalue arguments)
    pub fn is_special(&self) -> bool {
        matches!(
            self,
            Builtin::Close
                | Builtin::Index
                | Builtin::Match
                | Builtin::Split
                | Builtin::Sub
                | Builtin::Gsub
                | Builtin::Sprintf
                | Builtin::Substr
        )
    }
}

/// A token with its text, numeric value and location in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw text; for strings and regexes, the content with escapes processed
    pub text: Vec<u8>,
    /// Parsed value of a number token, 0 otherwise
    pub value: f64,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation) -> Self {
        Self {
            kind,
            text: Vec::new(),
            value: 0.0,
            location,
        }
    }

    pub fn text_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }
}

/// Map keyword strings to token kinds
pub fn keyword_to_token(s: &[u8]) -> Option<TokenKind> {
    match s {
        b"in" => Some(TokenKind::In),
        b"BEGIN" => Some(TokenKind::Begin),
        b"END" => Some(TokenKind::End),
        b"if" => Some(TokenKind::If),
        b"else" => Some(TokenKind::Else),
        b"while" => Some(TokenKind::While),
        b"for" => Some(TokenKind::For),
        b"do" => Some(TokenKind::Do),
        b"break" => Some(TokenKind::Break),
        b"continue" => Some(TokenKind::Continue),
        b"exit" => Some(TokenKind::Exit),
        b"function" => Some(TokenKind::Function),
        b"return" => Some(TokenKind::Return),
        b"next" => Some(TokenKind::Next),
        b"nextfile" => Some(TokenKind::Nextfile),
        b"delete" => Some(TokenKind::Delete),
        b"print" => Some(TokenKind::Print),
        b"printf" => Some(TokenKind::Printf),
        b"getline" => Some(TokenKind::Getline),
        _ => None,
    }
}

/// Map builtin function names to their ids
pub fn builtin_lookup(s: &[u8]) -> Option<Builtin> {
    match s {
        b"atan2" => Some(Builtin::Atan2),
        b"cos" => Some(Builtin::Cos),
        b"sin" => Some(Builtin::Sin),
        b"exp" => Some(Builtin::Exp),
        b"log" => Some(Builtin::Log),
        b"sqrt" => Some(Builtin::Sqrt),
        b"int" => Some(Builtin::Int),
        b"rand" => Some(Builtin::Rand),
        b"srand" => Some(Builtin::Srand),
        b"length" => Some(Builtin::Length),
        b"tolower" => Some(Builtin::Tolower),
        b"toupper" => Some(Builtin::Toupper),
        b"system" => Some(Builtin::System),
        b"fflush" => Some(Builtin::Fflush),
        b"and" => Some(Builtin::And),
        b"or" => Some(Builtin::Or),
        b"xor" => Some(Builtin::Xor),
        b"lshift" => Some(Builtin::Lshift),
        b"rshift" => Some(Builtin::Rshift),
        b"close" => Some(Builtin::Close),
        b"index" => Some(Builtin::Index),
        b"match" => Some(Builtin::Match),
        b"split" => Some(Builtin::Split),
        b"sub" => Some(Builtin::Sub),
        b"gsub" => Some(Builtin::Gsub),
        b"sprintf" => Some(Builtin::Sprintf),
        b"substr" => Some(Builtin::Substr),
        _ => None,
    }
}

/// Two-character operators
pub fn two_char_token(first: u8, second: u8) -> Option<TokenKind> {
    match (first, second) {
        (b'+', b'+') => Some(TokenKind::Increment),
        (b'-', b'-') => Some(TokenKind::Decrement),
        (b'<', b'=') => Some(TokenKind::LessEqual),
        (b'!', b'=') => Some(TokenKind::NotEqual),
        (b'=', b'=') => Some(TokenKind::Equal),
        (b'>', b'=') => Some(TokenKind::GreaterEqual),
        (b'!', b'~') => Some(TokenKind::NotMatch),
        (b'&', b'&') => Some(TokenKind::And),
        (b'|', b'|') => Some(TokenKind::Or),
        (b'^', b'=') => Some(TokenKind::PowAssign),
        (b'%', b'=') => Some(TokenKind::PercentAssign),
        (b'*', b'=') => Some(TokenKind::StarAssign),
        (b'/', b'=') => Some(TokenKind::SlashAssign),
        (b'+', b'=') => Some(TokenKind::PlusAssign),
        (b'-', b'=') => Some(TokenKind::MinusAssign),
        (b'>', b'>') => Some(TokenKind::Append),
        _ => None,
    }
}

/// Single-character operators and punctuation
pub fn one_char_token(c: u8) -> Option<TokenKind> {
    match c {
        b';' => Some(TokenKind::Semicolon),
        b',' => Some(TokenKind::Comma),
        b'[' => Some(TokenKind::LeftBracket),
        b']' => Some(TokenKind::RightBracket),
        b'(' => Some(TokenKind::LeftParen),
        b')' => Some(TokenKind::RightParen),
        b'{' => Some(TokenKind::LeftBrace),
        b'}' => Some(TokenKind::RightBrace),
        b'$' => Some(TokenKind::Dollar),
        b'^' => Some(TokenKind::Pow),
        b'!' => Some(TokenKind::Not),
        b'*' => Some(TokenKind::Star),
        b'/' => Some(TokenKind::Slash),
        b'%' => Some(TokenKind::Percent),
        b'+' => Some(TokenKind::Plus),
        b'-' => Some(TokenKind::Minus),
        b'<' => Some(TokenKind::Less),
        b'>' => Some(TokenKind::Greater),
        b'~' => Some(TokenKind::Match),
        b'?' => Some(TokenKind::Question),
        b':' => Some(TokenKind::Colon),
        b'=' => Some(TokenKind::Assign),
        b'|' => Some(TokenKind::Pipe),
        _ => None,
    }
}
