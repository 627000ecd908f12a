use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use regex::bytes::{Regex, RegexBuilder};

use crate::error::{Error, Result};
use crate::zmap::ZMap;
use crate::zstring::ZString;

/// Shared handle to an AWK array. Arrays are passed to functions by reference.
pub type SharedMap = Rc<RefCell<ZMap>>;

/// AWK value type with dynamic typing and automatic coercion
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Uninitialized value - coerces to "" or 0 depending on context
    #[default]
    Uninitialized,
    /// Numeric value
    Number(f64),
    /// String value
    String(ZString),
    /// Numeric string - input text that looks like a number
    /// (used for comparison semantics)
    NumericString(ZString, f64),
    /// Array
    Map(SharedMap),
    /// Compiled regex literal
    Regex(Regex),
    /// Lvalue: global or local variable by table index
    VarRef(usize),
    /// Lvalue: array element, the array being the variable at this index
    MapRef(usize),
    /// Lvalue: field `$n`
    FieldRef(usize),
}

impl Value {
    /// Create a string value (never a numeric string)
    pub fn from_text(s: &str) -> Self {
        Value::String(ZString::from(s))
    }

    /// Create a string value from input data, detecting numeric strings
    #[inline]
    pub fn from_input(bytes: &[u8]) -> Self {
        let s = ZString::new(bytes);
        match parse_numeric_string(bytes) {
            Some(num) => Value::NumericString(s, num),
            None => Value::String(s),
        }
    }

    /// Create a numeric value
    #[inline]
    pub fn from_number(n: f64) -> Self {
        Value::Number(n)
    }

    /// Create an empty array
    pub fn new_map() -> Self {
        Value::Map(Rc::new(RefCell::new(ZMap::new())))
    }

    /// Compile a regex literal
    ///
    /// Matching is bytewise. Bytes above 0x7f (from `\xNN` or octal escapes,
    /// or raw in the source) match exactly that byte.
    pub fn regex(pattern: &[u8]) -> Result<Self> {
        let re = RegexBuilder::new(&byte_pattern(pattern))
            .unicode(false)
            .build()?;
        Ok(Value::Regex(re))
    }

    /// Check if this value is "true" in boolean context
    /// - Uninitialized is false
    /// - Number 0 is false
    /// - Empty string is false
    /// - Everything else is true
    #[inline]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Uninitialized => false,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::NumericString(_, n) => *n != 0.0,
            Value::Map(_) | Value::Regex(_) => true,
            Value::VarRef(_) | Value::MapRef(_) | Value::FieldRef(_) => true,
        }
    }

    /// Coerce to numeric value
    #[inline]
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) | Value::NumericString(_, n) => *n,
            Value::String(s) => parse_leading_number(s.as_bytes()),
            _ => 0.0,
        }
    }

    /// Coerce to a string, sharing the buffer when already a string
    pub fn to_zstring(&self) -> ZString {
        match self {
            Value::String(s) | Value::NumericString(s, _) => s.clone(),
            Value::Number(n) => ZString::from(format_number(*n)),
            _ => ZString::default(),
        }
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    pub fn is_numeric_string(&self) -> bool {
        matches!(self, Value::NumericString(_, _))
    }

    #[inline]
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    #[inline]
    pub fn is_regex(&self) -> bool {
        matches!(self, Value::Regex(_))
    }

    /// True for the lvalue reference forms
    #[inline]
    pub fn is_ref(&self) -> bool {
        matches!(self, Value::VarRef(_) | Value::MapRef(_) | Value::FieldRef(_))
    }

    /// Number, string or uninitialized
    #[inline]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Uninitialized | Value::Number(_) | Value::String(_) | Value::NumericString(_, _)
        )
    }

    /// Check if this value should compare as a number
    #[inline]
    pub fn compares_as_number(&self) -> bool {
        matches!(self, Value::Number(_) | Value::NumericString(_, _) | Value::Uninitialized)
    }

    /// Store `from` into this cell. The previous content is released.
    ///
    /// An array can't be overwritten by a scalar and a scalar can't become
    /// an array; an uninitialized cell accepts either.
    pub fn assign(&mut self, from: &Value) -> Result<()> {
        if self.is_map() && !from.is_map() {
            return Err(Error::runtime("can't assign to array"));
        }
        if from.is_map() && !matches!(self, Value::Uninitialized | Value::Map(_)) {
            return Err(Error::runtime("can't assign array to scalar"));
        }
        *self = from.clone();
        Ok(())
    }

    /// Borrow the array, turning an uninitialized cell into an empty one
    pub fn as_map(&mut self) -> Result<SharedMap> {
        match self {
            Value::Map(m) => Ok(Rc::clone(m)),
            Value::Uninitialized => {
                *self = Value::new_map();
                self.as_map()
            }
            _ => Err(Error::runtime("can't use scalar as array")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uninitialized => Ok(()),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) | Value::NumericString(s, _) => write!(f, "{}", s),
            Value::Map(_) => f.write_str("(array)"),
            Value::Regex(re) => write!(f, "/{}/", re.as_str()),
            Value::VarRef(i) => write!(f, "(var ref {i})"),
            Value::MapRef(i) => write!(f, "(array ref {i})"),
            Value::FieldRef(i) => write!(f, "${i}"),
        }
    }
}

/// Regex source with every non-ASCII byte written as `\xNN`
fn byte_pattern(pattern: &[u8]) -> String {
    let mut source = String::with_capacity(pattern.len());
    let mut escaped = false;
    for &b in pattern {
        if b.is_ascii() {
            source.push(char::from(b));
            escaped = b == b'\\' && !escaped;
        } else {
            // `\<byte>` is the byte itself
            if escaped {
                source.pop();
            }
            source.push_str(&format!("\\x{b:02x}"));
            escaped = false;
        }
    }
    source
}

/// Compare two AWK values according to AWK comparison rules
#[inline]
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    // If both are numeric or numeric strings, compare numerically
    if left.compares_as_number() && right.compares_as_number() {
        let l = left.to_number();
        let r = right.to_number();
        l.partial_cmp(&r).unwrap_or(Ordering::Equal)
    } else {
        left.to_zstring().cmp(&right.to_zstring())
    }
}

/// Longest prefix of `bytes` that reads as `digits[.digits][exponent]` or
/// `.digits[exponent]`. Returns the value and the number of bytes used, or
/// `None` when no digits lead the text.
///
/// An exponent marker not followed by digits is not part of the number, so
/// `1E` yields `1` with one byte consumed.
pub fn parse_number_prefix(bytes: &[u8]) -> Option<(f64, usize)> {
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut i = digits(0);
    let mut mantissa_digits = i;
    if bytes.get(i) == Some(&b'.') {
        let frac = digits(i + 1);
        mantissa_digits += frac;
        i += 1 + frac;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp = digits(j);
        if exp > 0 {
            i = j + exp;
        }
    }

    // The prefix is ASCII by construction.
    let text = std::str::from_utf8(&bytes[..i]).ok()?;
    text.parse().ok().map(|n| (n, i))
}

/// Parse the leading numeric portion of a string
/// "42abc" -> 42.0
/// "  3.14  " -> 3.14
/// "abc" -> 0.0
#[inline]
pub fn parse_leading_number(bytes: &[u8]) -> f64 {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let (negative, body) = match bytes.get(start) {
        Some(b'-') => (true, &bytes[start + 1..]),
        Some(b'+') => (false, &bytes[start + 1..]),
        _ => (false, &bytes[start..]),
    };
    match parse_number_prefix(body) {
        Some((n, _)) if negative => -n,
        Some((n, _)) => n,
        None => 0.0,
    }
}

/// Check if input text is a numeric string (looks entirely like a number,
/// surrounding blanks allowed)
fn parse_numeric_string(bytes: &[u8]) -> Option<f64> {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace())?;
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace())? + 1;
    let trimmed = &bytes[start..end];

    let (negative, body) = match trimmed.first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (n, used) = parse_number_prefix(body)?;
    if used != body.len() {
        return None;
    }
    Some(if negative { -n } else { n })
}

/// Format a number for output (`%.6g`, integers without a fraction)
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return if n.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    format_g(n, 6)
}

/// C `%.{precision}g`
fn format_g(n: f64, precision: usize) -> String {
    let precision = precision.max(1);
    let sci = format!("{:.*e}", precision - 1, n);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= precision as i32 {
        let mantissa = trim_fraction_zeros(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        trim_fraction_zeros(&format!("{:.*}", decimals, n)).to_string()
    }
}

fn trim_fraction_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized() {
        let v = Value::Uninitialized;
        assert_eq!(v.to_number(), 0.0);
        assert_eq!(v.to_zstring().as_bytes(), b"");
        assert!(!v.is_truthy());
    }

    #[test]
    fn test_number() {
        let v = Value::Number(42.0);
        assert_eq!(v.to_number(), 42.0);
        assert_eq!(v.to_zstring().as_bytes(), b"42");
        assert!(v.is_truthy());

        let zero = Value::Number(0.0);
        assert!(!zero.is_truthy());
    }

    #[test]
    fn test_string() {
        let v = Value::from_input(b"hello");
        assert_eq!(v.to_number(), 0.0);
        assert_eq!(v.to_string(), "hello");
        assert!(v.is_truthy());

        let empty = Value::from_input(b"");
        assert!(!empty.is_truthy());
    }

    #[test]
    fn test_numeric_string() {
        let v = Value::from_input(b" 42 ");
        assert!(v.is_numeric_string());
        assert_eq!(v.to_number(), 42.0);
        assert_eq!(v.to_string(), " 42 ");

        assert!(Value::from_input(b"-1.5e3").is_numeric_string());
        assert!(!Value::from_input(b"1e").is_numeric_string());
        assert!(!Value::from_input(b"12abc").is_numeric_string());
        assert!(!Value::from_input(b".").is_numeric_string());
    }

    #[test]
    fn test_to_zstring_shares_buffer() {
        let v = Value::from_text("shared");
        let s = v.to_zstring();
        assert_eq!(s.refcount(), 2);
    }

    #[test]
    fn test_number_prefix() {
        assert_eq!(parse_number_prefix(b"12.5e3x"), Some((12500.0, 6)));
        assert_eq!(parse_number_prefix(b"1."), Some((1.0, 2)));
        assert_eq!(parse_number_prefix(b"1.E2"), Some((100.0, 4)));
        assert_eq!(parse_number_prefix(b".1E+2"), Some((10.0, 5)));
        assert_eq!(parse_number_prefix(b"1E"), Some((1.0, 1)));
        assert_eq!(parse_number_prefix(b"1e+"), Some((1.0, 1)));
        assert_eq!(parse_number_prefix(b"."), None);
        assert_eq!(parse_number_prefix(b".E1"), None);
        assert_eq!(parse_number_prefix(b"x"), None);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(parse_leading_number(b"42abc"), 42.0);
        assert_eq!(parse_leading_number(b"  3.14  "), 3.14);
        assert_eq!(parse_leading_number(b"abc"), 0.0);
        assert_eq!(parse_leading_number(b"-5.5"), -5.5);
        assert_eq!(parse_leading_number(b"1e10"), 1e10);
    }

    #[test]
    fn test_comparison() {
        let n1 = Value::Number(10.0);
        let n2 = Value::Number(2.0);
        assert_eq!(compare_values(&n1, &n2), Ordering::Greater);

        let s1 = Value::from_input(b"10");
        let s2 = Value::from_input(b"2");
        // Both numeric strings -> compare numerically
        assert_eq!(compare_values(&s1, &s2), Ordering::Greater);

        let s3 = Value::from_text("10");
        let s4 = Value::from_text("2");
        // Plain strings -> compare bytewise
        assert_eq!(compare_values(&s3, &s4), Ordering::Less);
    }

    #[test]
    fn test_assign_respects_map_exclusivity() {
        let mut arr = Value::new_map();
        assert!(arr.assign(&Value::Number(1.0)).is_err());
        assert!(arr.is_map());

        let mut scalar = Value::Number(1.0);
        assert!(scalar.assign(&Value::new_map()).is_err());

        let mut cell = Value::Uninitialized;
        cell.assign(&Value::new_map()).unwrap();
        assert!(cell.is_map());
    }

    #[test]
    fn test_assign_releases_previous_string() {
        let s = ZString::from("old");
        let mut cell = Value::String(s.clone());
        assert_eq!(s.refcount(), 2);
        cell.assign(&Value::Number(3.0)).unwrap();
        assert_eq!(s.refcount(), 1);
    }

    #[test]
    fn test_as_map_autovivifies() {
        let mut cell = Value::Uninitialized;
        let map = cell.as_map().unwrap();
        map.borrow_mut().insert(&ZString::from("k"), Value::Number(1.0));
        assert!(cell.is_map());
        assert!(Value::Number(1.0).as_map().is_err());
    }

    #[test]
    fn test_regex_value() {
        let re = Value::regex(b"fo+").unwrap();
        assert!(re.is_regex());
        assert!(matches!(&re, Value::Regex(r) if r.is_match(b"xfoo")));
        assert!(Value::regex(b"(").is_err());
    }

    #[test]
    fn test_regex_high_bytes() {
        let Value::Regex(re) = Value::regex(b"^a\xff+$").unwrap() else {
            panic!("expected regex");
        };
        assert!(re.is_match(b"a\xff\xff"));
        // U+00FF encoded as UTF-8 is a different byte sequence
        assert!(!re.is_match("a\u{ff}".as_bytes()));

        let Value::Regex(class) = Value::regex(b"[\xe9\xff]").unwrap() else {
            panic!("expected regex");
        };
        assert!(class.is_match(b"\xe9"));
        assert!(!class.is_match(b"\xc3"));

        let Value::Regex(escaped) = Value::regex(b"x\\\xff").unwrap() else {
            panic!("expected regex");
        };
        assert!(escaped.is_match(b"x\xff"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-17.0), "-17");
        assert_eq!(format_number(3.14159), "3.14159");
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_number(1234567.5), "1.23457e+06");
        assert_eq!(format_number(0.00001234), "1.234e-05");
        assert_eq!(format_number(1e20), "1e+20");
    }
}
