//! Positional string formatting in the style of Go's `fmt` package.
//!
//! Supports the verbs `%s %v %d %f %g %e %t %q %x %X` and `%%`, the flags
//! `-`, `+`, `0` and space, a width and a `.precision`. Each verb consumes
//! exactly one value; the number of verbs must match the number of values.

use crate::error::FormatError;
use crate::value::{format_float, Value};
use std::iter::Peekable;
use std::str::CharIndices;

const VERBS: &str = "svdfgetqxX";
const MAX_WIDTH: usize = 1_000_000;
const MAX_PRECISION: usize = u16::MAX as usize;

#[derive(Clone, Copy, Debug, Default)]
struct Directive {
    minus: bool,
    plus: bool,
    zero: bool,
    space: bool,
    width: Option<usize>,
    precision: Option<usize>,
    verb: char,
}

enum Piece<'a> {
    Literal(&'a str),
    Verb(Directive),
}

/// Render `values` into `template`.
///
/// # Errors
///
/// Fails if the template is malformed, uses an unsupported verb, has a
/// different number of verbs than `values`, or applies a verb to a value it
/// cannot render (e.g. `%d` to a string).
pub fn sprintf(template: &str, values: &[Value]) -> Result<String, FormatError> {
    let pieces = parse(template)?;
    let expected = pieces
        .iter()
        .filter(|piece| matches!(piece, Piece::Verb(_)))
        .count();
    if expected != values.len() {
        return Err(FormatError::Arity {
            template: template.to_owned(),
            expected,
            found: values.len(),
        });
    }

    let mut out = String::with_capacity(template.len());
    let mut values = values.iter();
    for piece in pieces {
        match piece {
            Piece::Literal(text) => out.push_str(text),
            Piece::Verb(directive) => {
                if let Some(value) = values.next() {
                    out.push_str(&render(&directive, value)?);
                }
            }
        }
    }
    Ok(out)
}

fn parse(template: &str) -> Result<Vec<Piece<'_>>, FormatError> {
    let mut pieces = Vec::new();
    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        if pos > 0 {
            pieces.push(Piece::Literal(&rest[..pos]));
        }
        let tail = &rest[pos + 1..];
        let mut chars = tail.char_indices().peekable();
        let mut directive = Directive::default();

        while let Some(&(_, c)) = chars.peek() {
            match c {
                '-' => directive.minus = true,
                '+' => directive.plus = true,
                '0' => directive.zero = true,
                ' ' => directive.space = true,
                _ => break,
            }
            chars.next();
        }
        directive.width = digits(&mut chars);
        if let Some(&(_, '.')) = chars.peek() {
            chars.next();
            directive.precision = Some(digits(&mut chars).unwrap_or(0));
        }
        check_limit(template, "width", directive.width, MAX_WIDTH)?;
        check_limit(template, "precision", directive.precision, MAX_PRECISION)?;

        let (offset, verb) = chars.next().ok_or_else(|| FormatError::Malformed {
            template: template.to_owned(),
        })?;
        match verb {
            '%' => pieces.push(Piece::Literal("%")),
            v if VERBS.contains(v) => {
                directive.verb = v;
                pieces.push(Piece::Verb(directive));
            }
            v => return Err(FormatError::UnknownVerb { verb: v }),
        }
        rest = &tail[offset + verb.len_utf8()..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Literal(rest));
    }
    Ok(pieces)
}

fn digits(chars: &mut Peekable<CharIndices<'_>>) -> Option<usize> {
    let mut n: Option<usize> = None;
    while let Some(&(_, c)) = chars.peek() {
        let Some(d) = c.to_digit(10) else { break };
        n = Some(n.unwrap_or(0).saturating_mul(10).saturating_add(d as usize));
        chars.next();
    }
    n
}

fn check_limit(
    template: &str,
    what: &'static str,
    value: Option<usize>,
    limit: usize,
) -> Result<(), FormatError> {
    match value {
        Some(value) if value > limit => Err(FormatError::TooLarge {
            template: template.to_owned(),
            what,
            value,
            limit,
        }),
        _ => Ok(()),
    }
}

fn render(directive: &Directive, value: &Value) -> Result<String, FormatError> {
    let bad = || FormatError::BadArgument {
        verb: directive.verb,
        found: value.type_name(),
    };

    let (body, numeric) = match (directive.verb, value) {
        ('s' | 'v', Value::Float(f)) => (format_g(*f, None), directive.verb == 'v'),
        ('s' | 'v', Value::Int(i)) => (i.to_string(), directive.verb == 'v'),
        ('s', v) => {
            let s = v.to_string();
            match directive.precision {
                Some(p) => (s.chars().take(p).collect(), false),
                None => (s, false),
            }
        }
        ('v', v) => (v.to_string(), false),
        ('d', Value::Int(i)) => (i.to_string(), true),
        ('d', Value::Float(f)) if f.fract() == 0.0 && f.abs() < 9.2e18 => {
            ((*f as i64).to_string(), true)
        }
        ('f' | 'e' | 'g', v) => {
            let x = match v {
                Value::Int(i) => *i as f64,
                Value::Float(f) => *f,
                _ => return Err(bad()),
            };
            let body = match directive.verb {
                'f' if x.is_finite() => format!("{:.*}", directive.precision.unwrap_or(6), x),
                'e' if x.is_finite() => format_e(x, directive.precision.unwrap_or(6)),
                'f' | 'e' => format_float(x),
                _ => format_g(x, directive.precision),
            };
            (body, true)
        }
        ('t', Value::Bool(b)) => (b.to_string(), false),
        ('q', Value::String(s)) => (format!("{s:?}"), false),
        ('x' | 'X', Value::String(s)) => {
            let hex: String = s.bytes().map(|b| format!("{b:02x}")).collect();
            (hex, false)
        }
        ('x' | 'X', Value::Int(i)) => {
            let hex = if *i < 0 {
                format!("-{:x}", i.unsigned_abs())
            } else {
                format!("{i:x}")
            };
            (hex, true)
        }
        _ => return Err(bad()),
    };

    let body = if directive.verb == 'X' {
        body.to_uppercase()
    } else {
        body
    };
    let body = if numeric { sign(body, directive) } else { body };
    Ok(pad(body, directive, numeric))
}

fn sign(body: String, directive: &Directive) -> String {
    if body.starts_with('-') || body.starts_with('+') {
        body
    } else if directive.plus {
        format!("+{body}")
    } else if directive.space {
        format!(" {body}")
    } else {
        body
    }
}

fn pad(body: String, directive: &Directive, numeric: bool) -> String {
    let Some(width) = directive.width else {
        return body;
    };
    let len = body.chars().count();
    if len >= width {
        return body;
    }
    let fill = width - len;
    if directive.minus {
        format!("{body}{}", " ".repeat(fill))
    } else if directive.zero && numeric {
        let split = usize::from(body.starts_with(|c: char| matches!(c, '+' | '-' | ' ')));
        format!("{}{}{}", &body[..split], "0".repeat(fill), &body[split..])
    } else {
        format!("{}{body}", " ".repeat(fill))
    }
}

/// `%e`: mantissa with `precision` decimals and a signed two-digit exponent.
fn format_e(x: f64, precision: usize) -> String {
    let sci = format!("{:.*e}", precision, x);
    go_exponent(&sci)
}

/// `%g` and `%v` for floats: the shortest representation, switching to
/// exponent form for very large or very small magnitudes.
fn format_g(x: f64, precision: Option<usize>) -> String {
    if !x.is_finite() {
        return format_float(x);
    }
    let sci = match precision {
        Some(p) => format!("{:.*e}", p.max(1) - 1, x),
        None => format!("{x:e}"),
    };
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let mantissa = trim_fraction_zeros(mantissa);

    let nd = mantissa.chars().filter(char::is_ascii_digit).count() as i32;
    let dp = exp + 1;
    let mut eprec = precision.map_or(6, |p| p.max(1) as i32);
    if eprec > nd && nd >= dp {
        eprec = nd;
    }

    if exp < -4 || exp >= eprec {
        go_exponent(&format!("{mantissa}e{exp}"))
    } else {
        let decimals = (nd - dp).max(0) as usize;
        format!("{:.*}", decimals, x)
    }
}

fn trim_fraction_zeros(mantissa: &str) -> &str {
    if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    }
}

/// Rewrite Rust's `1.5e3` exponent suffix as Go's `1.5e+03`.
fn go_exponent(sci: &str) -> String {
    match sci.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
        }
        None => sci.to_owned(),
    }
}
