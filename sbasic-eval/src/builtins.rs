//! The built-in function registry (spec.md §4.4.8): a case-folded name →
//! function table. Everything here is a pure function of its argument
//! slice except `RND`/`RANDOMIZE`, which own the single PRNG spec.md §5
//! assigns to the registry, and the file-query builtins (`EOF`/`LOC`/
//! `LOF`/`FREEFILE`), which reach into the evaluator's file table.

use sbasic_util::{BasicError, BasicResult, Span, Symbol};
use std::time::{SystemTime, UNIX_EPOCH};

use sbasic_runtime::Value;

/// A splitmix64-style PRNG: no external dependency, reseedable, and good
/// enough for `RND`'s uniform-[0,1) contract — the same tradeoff
/// `faxc-runtime` makes for its own non-cryptographic needs.
pub struct Rng {
    state: u64,
    last: f64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        let mut rng = Rng { state: seed, last: 0.0 };
        rng.last = rng.next_f64();
        rng
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        let bits = self.next_u64() >> 11;
        let value = (bits as f64) / ((1u64 << 53) as f64);
        self.last = value;
        value
    }

    pub fn reseed(&mut self, seed: u64) {
        self.state = seed;
    }

    /// `RND(n)`: n>0 (or omitted) draws a new value; n=0 repeats the last
    /// draw; n<0 reseeds from `n` then draws (spec.md §5).
    pub fn rnd(&mut self, n: f64) -> f64 {
        if n < 0.0 {
            self.reseed(n.to_bits());
            self.next_f64()
        } else if n == 0.0 {
            self.last
        } else {
            self.next_f64()
        }
    }
}

impl Default for Rng {
    fn default() -> Self {
        Rng::new(0x2545F4914F6CDD1D)
    }
}

fn arg(args: &[Value], i: usize, span: Span) -> BasicResult<&Value> {
    args.get(i)
        .ok_or_else(|| BasicError::value_error(format!("missing argument {}", i + 1), span))
}

fn num(args: &[Value], i: usize, span: Span) -> BasicResult<f64> {
    arg(args, i, span)?
        .as_f64()
        .ok_or_else(|| BasicError::type_mismatch("expected a numeric argument".into(), span))
}

fn string(args: &[Value], i: usize, span: Span) -> BasicResult<String> {
    Ok(arg(args, i, span)?.as_str(span)?.to_string())
}

fn int_arg(args: &[Value], i: usize, span: Span) -> BasicResult<i64> {
    Ok(num(args, i, span)? as i64)
}

/// 1-based, clamping index semantics for `LEFT$`/`RIGHT$`/`MID$`/`INSTR`
/// (spec.md §4.4.8: "out-of-range lengths clamp to the available string;
/// negative lengths fail").
fn clamp_len(len: i64, available: usize, span: Span) -> BasicResult<usize> {
    if len < 0 {
        return Err(BasicError::value_error("length cannot be negative".into(), span));
    }
    Ok((len as usize).min(available))
}

/// Round-half-to-even: `CINT`/`CLNG`'s banker's rounding (spec.md §4.4.8),
/// distinct from the truncating coercion `LET`/`READ`/parameter binding use
/// (`Value::coerce`). `2.5` rounds to `2`, `0.5` rounds to `0`, `3.5` rounds
/// to `4`.
fn round_half_to_even(n: f64) -> f64 {
    let floor = n.floor();
    let diff = n - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    }
}

fn cint_like(args: &[Value], span: Span, lo: f64, hi: f64) -> BasicResult<f64> {
    let n = round_half_to_even(num(args, 0, span)?);
    if !(lo..=hi).contains(&n) {
        return Err(BasicError::range_error("value out of range".into(), span));
    }
    Ok(n)
}

pub fn call(name: Symbol, args: &[Value], rng: &mut Rng, span: Span) -> BasicResult<Value> {
    let upper = name.as_str().to_ascii_uppercase();
    match upper.as_str() {
        // --- string ---------------------------------------------------
        "LEN" => Ok(Value::Long(string(args, 0, span)?.chars().count() as i32)),
        "LEFT$" => {
            let s = string(args, 0, span)?;
            let n = clamp_len(int_arg(args, 1, span)?, s.chars().count(), span)?;
            Ok(Value::Str(s.chars().take(n).collect()))
        }
        "RIGHT$" => {
            let s = string(args, 0, span)?;
            let total = s.chars().count();
            let n = clamp_len(int_arg(args, 1, span)?, total, span)?;
            Ok(Value::Str(s.chars().skip(total - n).collect()))
        }
        "MID$" => {
            let s = string(args, 0, span)?;
            let chars: Vec<char> = s.chars().collect();
            let start = (int_arg(args, 1, span)? - 1).max(0) as usize;
            if start >= chars.len() {
                return Ok(Value::Str(String::new()));
            }
            let remaining = chars.len() - start;
            let len = if args.len() > 2 {
                clamp_len(int_arg(args, 2, span)?, remaining, span)?
            } else {
                remaining
            };
            Ok(Value::Str(chars[start..start + len].iter().collect()))
        }
        "INSTR" => {
            let (hay_idx, needle_idx, start) = if args.len() >= 3 {
                (1usize, 2usize, (int_arg(args, 0, span)? - 1).max(0) as usize)
            } else {
                (0usize, 1usize, 0usize)
            };
            let hay = string(args, hay_idx, span)?;
            let needle = string(args, needle_idx, span)?;
            let hay_chars: Vec<char> = hay.chars().collect();
            if start > hay_chars.len() {
                return Ok(Value::Long(0));
            }
            let haystack_tail: String = hay_chars[start..].iter().collect();
            match haystack_tail.find(&needle) {
                Some(byte_idx) => {
                    let char_idx = haystack_tail[..byte_idx].chars().count();
                    Ok(Value::Long((start + char_idx + 1) as i32))
                }
                None => Ok(Value::Long(0)),
            }
        }
        "UCASE$" => Ok(Value::Str(string(args, 0, span)?.to_uppercase())),
        "LCASE$" => Ok(Value::Str(string(args, 0, span)?.to_lowercase())),
        "STR$" => {
            let v = arg(args, 0, span)?;
            Ok(Value::Str(format!("{v}")))
        }
        "VAL" => {
            let s = string(args, 0, span)?;
            Ok(Value::Double(parse_numeric_prefix(&s)))
        }
        "CHR$" => {
            let n = int_arg(args, 0, span)?;
            if !(0..=255).contains(&n) {
                return Err(BasicError::value_error("CHR$ argument out of range".into(), span));
            }
            Ok(Value::Str((n as u8 as char).to_string()))
        }
        "ASC" => {
            let s = string(args, 0, span)?;
            let c = s
                .chars()
                .next()
                .ok_or_else(|| BasicError::value_error("ASC of an empty string".into(), span))?;
            Ok(Value::Long(c as i32))
        }
        "STRING$" => {
            let n = int_arg(args, 0, span)?.max(0) as usize;
            let fill = match arg(args, 1, span)? {
                Value::Str(s) => s.chars().next().unwrap_or(' '),
                v => (v.as_f64().unwrap_or(0.0) as u8) as char,
            };
            Ok(Value::Str(fill.to_string().repeat(n)))
        }
        "SPACE$" => {
            let n = int_arg(args, 0, span)?.max(0) as usize;
            Ok(Value::Str(" ".repeat(n)))
        }
        "LTRIM$" => Ok(Value::Str(string(args, 0, span)?.trim_start().to_string())),
        "RTRIM$" => Ok(Value::Str(string(args, 0, span)?.trim_end().to_string())),
        "TRIM$" => Ok(Value::Str(string(args, 0, span)?.trim().to_string())),

        // --- math -------------------------------------------------------
        "ABS" => Ok(numeric_result(args, span, f64::abs)?),
        "SGN" => {
            let n = num(args, 0, span)?;
            Ok(Value::Integer(if n > 0.0 {
                1
            } else if n < 0.0 {
                -1
            } else {
                0
            }))
        }
        "INT" => Ok(Value::Long(num(args, 0, span)?.floor() as i32)),
        "FIX" => Ok(Value::Long(num(args, 0, span)?.trunc() as i32)),
        "SQR" => Ok(numeric_result(args, span, f64::sqrt)?),
        "SIN" => Ok(numeric_result(args, span, f64::sin)?),
        "COS" => Ok(numeric_result(args, span, f64::cos)?),
        "TAN" => Ok(numeric_result(args, span, f64::tan)?),
        "ATN" => Ok(numeric_result(args, span, f64::atan)?),
        "ATAN2" => Ok(Value::Double(num(args, 0, span)?.atan2(num(args, 1, span)?))),
        "LOG" => Ok(numeric_result(args, span, f64::ln)?),
        "EXP" => Ok(numeric_result(args, span, f64::exp)?),
        "ROUND" => Ok(numeric_result(args, span, f64::round)?),
        "PI" => Ok(Value::Double(std::f64::consts::PI)),
        "RND" => {
            let n = if args.is_empty() { 1.0 } else { num(args, 0, span)? };
            Ok(Value::Single(rng.rnd(n) as f32))
        }

        // --- conversion ---------------------------------------------------
        "CINT" => Ok(Value::Integer(cint_like(args, span, i16::MIN as f64, i16::MAX as f64)? as i16)),
        "CLNG" => Ok(Value::Long(cint_like(args, span, i32::MIN as f64, i32::MAX as f64)? as i32)),
        "CSNG" => arg(args, 0, span)?.coerce(sbasic_par::ValueKind::Single, span),
        "CDBL" => arg(args, 0, span)?.coerce(sbasic_par::ValueKind::Double, span),

        // --- time -----------------------------------------------------
        "TIMER" => Ok(Value::Single(seconds_since_midnight() as f32)),
        "DATE$" => Ok(Value::Str(today_mm_dd_yyyy())),
        "TIME$" => Ok(Value::Str(now_hh_mm_ss())),

        // --- formatting -------------------------------------------------
        "HEX$" => Ok(Value::Str(format!("{:X}", int_arg(args, 0, span)?))),
        "OCT$" => Ok(Value::Str(format!("{:o}", int_arg(args, 0, span)?))),

        _ => Err(BasicError::name_error(
            format!("unknown built-in function {upper}"),
            span,
        )),
    }
}

fn numeric_result(args: &[Value], span: Span, f: impl Fn(f64) -> f64) -> BasicResult<Value> {
    let v = arg(args, 0, span)?;
    let kind = v.kind();
    Ok(Value::from_f64(f(v.as_f64().ok_or_else(|| {
        BasicError::type_mismatch("expected a numeric argument".into(), span)
    })?), kind))
}

/// `VAL`/string→numeric coercion (spec.md §4.3 Coerce): leading whitespace,
/// optional sign, digits, optional decimal/exponent; 0 on failure to parse
/// any prefix.
pub fn parse_numeric_prefix(s: &str) -> f64 {
    let trimmed = s.trim_start();
    let mut end = 0;
    let bytes = trimmed.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let mut seen_digit = false;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        seen_digit = true;
        end = i;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            seen_digit = true;
            end = i;
        }
    }
    if seen_digit && i < bytes.len() && matches!(bytes[i], b'e' | b'E' | b'd' | b'D') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }
    if !seen_digit {
        return 0.0;
    }
    let mut slice = trimmed[..end].to_string();
    slice = slice.replace(['d', 'D'], "E");
    slice.parse::<f64>().unwrap_or(0.0)
}

fn seconds_since_midnight() -> f64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    (now.as_secs() % 86400) as f64 + now.subsec_millis() as f64 / 1000.0
}

fn today_mm_dd_yyyy() -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    let days = now.as_secs() / 86400;
    let (y, m, d) = civil_from_days(days as i64);
    format!("{m:02}-{d:02}-{y:04}")
}

fn now_hh_mm_ss() -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    let secs = now.as_secs() % 86400;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Howard Hinnant's days-from-civil inverse, used to render `DATE$` without
/// pulling in a calendar dependency the teacher's stack doesn't otherwise need.
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_ok(name: &str, args: &[Value]) -> Value {
        let mut rng = Rng::default();
        call(Symbol::intern(name), args, &mut rng, Span::DUMMY).unwrap()
    }

    #[test]
    fn left_and_right_clamp_to_available_length() {
        assert_eq!(call_ok("LEFT$", &[Value::Str("hi".into()), Value::Integer(10)]), Value::Str("hi".into()));
        assert_eq!(call_ok("RIGHT$", &[Value::Str("hello".into()), Value::Integer(3)]), Value::Str("llo".into()));
    }

    #[test]
    fn mid_extracts_a_one_based_substring() {
        assert_eq!(
            call_ok("MID$", &[Value::Str("HELLO".into()), Value::Integer(2), Value::Integer(3)]),
            Value::Str("ELL".into())
        );
    }

    #[test]
    fn instr_is_one_based_and_zero_on_miss() {
        assert_eq!(call_ok("INSTR", &[Value::Str("HELLO".into()), Value::Str("LL".into())]), Value::Long(3));
        assert_eq!(call_ok("INSTR", &[Value::Str("HELLO".into()), Value::Str("Z".into())]), Value::Long(0));
    }

    #[test]
    fn val_parses_a_numeric_prefix() {
        assert_eq!(parse_numeric_prefix("  42abc"), 42.0);
        assert_eq!(parse_numeric_prefix("not a number"), 0.0);
        assert_eq!(parse_numeric_prefix("-3.5e2xyz"), -350.0);
    }

    #[test]
    fn chr_and_asc_round_trip() {
        assert_eq!(call_ok("CHR$", &[Value::Integer(65)]), Value::Str("A".into()));
        assert_eq!(call_ok("ASC", &[Value::Str("A".into())]), Value::Long(65));
    }

    #[test]
    fn rnd_zero_repeats_the_last_draw() {
        let mut rng = Rng::new(42);
        let first = rng.rnd(1.0);
        let repeat = rng.rnd(0.0);
        assert_eq!(first, repeat);
    }

    /// `CINT`/`CLNG` round half to even, unlike the truncating coercion
    /// `LET`/`READ` use (`Value::coerce`).
    #[test]
    fn cint_and_clng_round_half_to_even() {
        assert_eq!(call_ok("CINT", &[Value::Double(2.5)]), Value::Integer(2));
        assert_eq!(call_ok("CINT", &[Value::Double(0.5)]), Value::Integer(0));
        assert_eq!(call_ok("CINT", &[Value::Double(3.5)]), Value::Integer(4));
        assert_eq!(call_ok("CINT", &[Value::Double(-2.5)]), Value::Integer(-2));
        assert_eq!(call_ok("CLNG", &[Value::Double(2.5)]), Value::Long(2));
    }
}
