//! Shared compiler/runtime state
//!
//! One `Context` owns the lexer and every table the compiler and the
//! interpreter share. It is passed by reference to whatever drives them;
//! nothing here is process-global.

use crate::error::Result;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::Value;
use crate::zlist::ZList;
use crate::zstring::ZString;

/// POSIX special variables, in global-table order starting at index 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialVar {
    Argc = 1,
    Argv,
    Convfmt,
    Environ,
    Filename,
    Fnr,
    Fs,
    Nf,
    Nr,
    Ofmt,
    Ofs,
    Ors,
    Rlength,
    Rs,
    Rstart,
    Subsep,
}

pub const SPECIAL_VARS: [&str; 16] = [
    "ARGC", "ARGV", "CONVFMT", "ENVIRON", "FILENAME", "FNR", "FS", "NF", "NR", "OFMT", "OFS",
    "ORS", "RLENGTH", "RS", "RSTART", "SUBSEP",
];

impl SpecialVar {
    /// Slot in the global table
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        SPECIAL_VARS[self.index() - 1]
    }
}

/// How a name has been used so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SymbolUse {
    #[default]
    Unknown,
    Scalar,
    Map,
    /// Passed to a function before its use is known
    MaybeMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub usage: SymbolUse,
}

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            usage: SymbolUse::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionDef {
    pub name: String,
    pub defined: bool,
    pub called: bool,
    pub locals: ZList<Symbol>,
    /// Start of the body in the code list
    pub code_addr: usize,
}

pub struct Context {
    pub lexer: Lexer,
    pub globals: ZList<Symbol>,
    pub locals: ZList<Symbol>,
    pub functions: ZList<FunctionDef>,
    pub literals: ZList<Value>,
    pub fields: ZList<Value>,
    pub code: ZList<i32>,
    pub stack: ZList<Value>,
    /// Globals below this index are the special variables
    pub spec_var_limit: usize,
}

impl Context {
    pub fn new(lexer: Lexer) -> Self {
        let mut globals = ZList::new();
        // Index 0 is never a valid variable.
        globals.append(Symbol::new(""));
        for name in SPECIAL_VARS {
            let mut sym = Symbol::new(name);
            sym.usage = if name == "ARGV" || name == "ENVIRON" {
                SymbolUse::Map
            } else {
                SymbolUse::Scalar
            };
            globals.append(sym);
        }
        let spec_var_limit = globals.len();

        Self {
            lexer,
            globals,
            locals: ZList::new(),
            functions: ZList::new(),
            literals: ZList::new(),
            fields: ZList::new(),
            code: ZList::with_capacity(1024),
            stack: ZList::with_capacity(1024),
            spec_var_limit,
        }
    }

    /// Advance the lexer
    pub fn scan(&mut self) -> Result<&Token> {
        self.lexer.next_token()
    }

    pub fn add_literal(&mut self, value: Value) -> usize {
        self.literals.append(value)
    }

    /// Pool the value of the current number, string or regex token
    pub fn literal_from_token(&mut self) -> Result<Option<usize>> {
        let token = self.lexer.token();
        let value = match token.kind {
            TokenKind::Number => Value::Number(token.value),
            TokenKind::String => Value::String(ZString::new(&token.text)),
            TokenKind::Regex => Value::regex(&token.text)?,
            _ => return Ok(None),
        };
        Ok(Some(self.add_literal(value)))
    }

    pub fn find_global(&self, name: &str) -> Option<usize> {
        self.globals
            .iter()
            .skip(1)
            .position(|sym| sym.name == name)
            .map(|i| i + 1)
    }

    pub fn add_global(&mut self, name: &str) -> usize {
        self.globals.append(Symbol::new(name))
    }

    pub fn find_or_add_global(&mut self, name: &str) -> usize {
        match self.find_global(name) {
            Some(index) => index,
            None => self.add_global(name),
        }
    }

    pub fn find_function(&self, name: &str) -> Option<usize> {
        self.functions.iter().position(|f| f.name == name)
    }

    pub fn find_or_add_function(&mut self, name: &str) -> usize {
        match self.find_function(name) {
            Some(index) => index,
            None => self.functions.append(FunctionDef {
                name: name.to_string(),
                ..FunctionDef::default()
            }),
        }
    }

    /// Append an opcode or operand, returning its address
    pub fn emit(&mut self, word: i32) -> usize {
        self.code.append(word)
    }

    pub fn push(&mut self, value: Value) -> usize {
        self.stack.append(value)
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.stack.pop()
    }
}
