//! Character supply for the lexer
//!
//! Program text comes either from one inline string or from an ordered list
//! of files (`-` is standard input), never both. Input is consumed a line at
//! a time. Files are read back to back with nothing between them. Once all
//! input is consumed, a newline is supplied if the last byte read was not one.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Error, Result, SourceLocation};

/// Name reported for the inline program
pub const COMMAND_LINE: &str = "(command line)";

/// Where the program text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramSource {
    /// Program given inline
    Text(String),
    /// Program files in order; `-` reads standard input
    Files(Vec<PathBuf>),
}

enum Units {
    Text {
        text: Vec<u8>,
        offset: usize,
    },
    Files {
        paths: Vec<PathBuf>,
        next: usize,
        reader: Option<Box<dyn BufRead>>,
    },
}

pub(crate) struct Input {
    units: Units,
    line: Vec<u8>,
    pos: usize,
    filename: Rc<str>,
    line_num: usize,
    last_char: Option<u8>,
    echo_source: bool,
}

impl Input {
    pub(crate) fn new(source: ProgramSource, echo_source: bool) -> Result<Self> {
        match source {
            ProgramSource::Text(text) => Ok(Self::from_text(text, echo_source)),
            ProgramSource::Files(paths) => {
                if paths.is_empty() {
                    return Err(Error::NoProgram);
                }
                let units = Units::Files {
                    paths,
                    next: 0,
                    reader: None,
                };
                Ok(Self::with_units(units, Rc::from(""), echo_source))
            }
        }
    }

    pub(crate) fn from_text(text: String, echo_source: bool) -> Self {
        let units = Units::Text {
            text: text.into_bytes(),
            offset: 0,
        };
        Self::with_units(units, Rc::from(COMMAND_LINE), echo_source)
    }

    fn with_units(units: Units, filename: Rc<str>, echo_source: bool) -> Self {
        Self {
            units,
            line: Vec::new(),
            pos: 0,
            filename,
            line_num: 0,
            last_char: None,
            echo_source,
        }
    }

    /// Next raw byte, or `None` once every unit is exhausted
    pub(crate) fn get_char(&mut self) -> Result<Option<u8>> {
        loop {
            if let Some(&c) = self.line.get(self.pos) {
                self.pos += 1;
                return Ok(Some(c));
            }
            if !self.refill()? {
                return Ok(None);
            }
        }
    }

    /// Unread bytes of the current line
    pub(crate) fn rest_of_line(&self) -> &[u8] {
        &self.line[self.pos..]
    }

    pub(crate) fn location(&self) -> SourceLocation {
        SourceLocation {
            filename: Rc::clone(&self.filename),
            line: self.line_num,
        }
    }

    fn refill(&mut self) -> Result<bool> {
        if self.read_line()? {
            self.line_num += 1;
            self.pos = 0;
            self.last_char = self.line.last().copied();
            if self.echo_source {
                let text = String::from_utf8_lossy(&self.line);
                eprint!("|>{:3} {}", self.line_num, text);
                if !text.ends_with('\n') {
                    eprintln!();
                }
            }
            return Ok(true);
        }
        if self.last_char == Some(b'\n') {
            return Ok(false);
        }
        // End of all input without a trailing newline
        self.last_char = Some(b'\n');
        self.line.clear();
        self.line.push(b'\n');
        self.pos = 0;
        Ok(true)
    }

    /// Load the next line into `self.line`; false once every unit is drained
    fn read_line(&mut self) -> Result<bool> {
        match &mut self.units {
            Units::Text { text, offset } => {
                if *offset >= text.len() {
                    return Ok(false);
                }
                let rest = &text[*offset..];
                let len = rest
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(rest.len(), |nl| nl + 1);
                self.line.clear();
                self.line.extend_from_slice(&rest[..len]);
                *offset += len;
                Ok(true)
            }
            Units::Files {
                paths,
                next,
                reader,
            } => loop {
                if reader.is_none() {
                    let Some(path) = paths.get(*next) else {
                        return Ok(false);
                    };
                    *next += 1;
                    *reader = Some(open_program_file(path)?);
                    self.filename = Rc::from(path.to_string_lossy().as_ref());
                    self.line_num = 0;
                }
                let Some(current) = reader.as_mut() else {
                    return Ok(false);
                };
                self.line.clear();
                if current.read_until(b'\n', &mut self.line)? > 0 {
                    return Ok(true);
                }
                *reader = None;
            },
        }
    }
}

fn open_program_file(path: &Path) -> Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        tracing::debug!("reading program from standard input");
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(file = %path.display(), "opened program file");
    Ok(Box::new(BufReader::new(file)))
}
