//! Variable-width record unpacking driven by pack-format strings.
//!
//! A pack format is a `/`-separated list of `typeSpec:fieldName` items,
//! for example `T:country_id/M:region_seek/N5:lat/N5:lon/b:name_ru`.
//! Record fields are little-endian, unlike the big-endian indexes and
//! block prefixes around them.
//!
//! | code   | width | decoded as                                   |
//! |--------|-------|----------------------------------------------|
//! | `t`    | 1     | signed 8-bit                                 |
//! | `T`    | 1     | unsigned 8-bit                               |
//! | `s`    | 2     | signed 16-bit                                |
//! | `S`    | 2     | unsigned 16-bit                              |
//! | `m`    | 3     | signed 24-bit, sign-extended                 |
//! | `M`    | 3     | unsigned 24-bit                              |
//! | `i`    | 4     | signed 32-bit                                |
//! | `I`    | 4     | unsigned 32-bit                              |
//! | `f`    | 4     | 32-bit float, widened to 64-bit              |
//! | `d`    | 8     | 64-bit float                                 |
//! | `n<k>` | 2     | signed 16-bit divided by 10^k                |
//! | `N<k>` | 4     | signed 32-bit divided by 10^k                |
//! | `c<n>` | n     | fixed-width string, right-trimmed            |
//! | `b`    | var   | NUL-terminated string, terminator consumed   |

use std::collections::HashMap;

use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::Encoding;

use super::error::{GeoError, Result};

/// A single decoded record field.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
}

/// A decoded record: field name to value.
///
/// Records may be partial: decoding stops silently when the input slice
/// runs out, and the typed accessors report missing fields as zero or
/// empty. This is how databases whose formats omit fields such as `id`
/// stay queryable.
#[derive(Debug, Default)]
pub(crate) struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field as u8; 0 when missing or not losslessly convertible.
    pub fn get_u8(&self, name: &str) -> u8 {
        self.get_uint(name, u64::from(u8::MAX)) as u8
    }

    /// Field as u32; 0 when missing or not losslessly convertible.
    pub fn get_u32(&self, name: &str) -> u32 {
        self.get_uint(name, u64::from(u32::MAX)) as u32
    }

    fn get_uint(&self, name: &str, max: u64) -> u64 {
        match self.fields.get(name) {
            Some(Value::Uint(v)) if *v <= max => *v,
            Some(Value::Int(v)) if *v >= 0 && *v as u64 <= max => *v as u64,
            Some(Value::Float(f)) if *f >= 0.0 && *f <= max as f64 && f.fract() == 0.0 => {
                *f as u64
            }
            _ => 0,
        }
    }

    /// Field as f64; any numeric kind widens, everything else is 0.0.
    pub fn get_f64(&self, name: &str) -> f64 {
        match self.fields.get(name) {
            Some(Value::Float(f)) => *f,
            Some(Value::Int(v)) => *v as f64,
            Some(Value::Uint(v)) => *v as f64,
            _ => 0.0,
        }
    }

    /// Field as string slice; empty when missing or non-string.
    pub fn get_str(&self, name: &str) -> &str {
        match self.fields.get(name) {
            Some(Value::Str(s)) => s,
            _ => "",
        }
    }

    #[cfg(test)]
    fn insert(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }
}

/// Divisors for the scaled-decimal types. The exponent is a single
/// digit in every published database; larger values clamp to the last
/// entry rather than overflow.
const POW10: [f64; 10] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9,
];

fn decimal_scale(arg: &str) -> f64 {
    let exp = arg.parse::<usize>().unwrap_or(0);
    POW10[exp.min(POW10.len() - 1)]
}

fn decode_text(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn fixed(data: &[u8], width: usize, decode: impl Fn(&[u8]) -> Value) -> (Option<Value>, usize) {
    if data.len() < width {
        (None, 0)
    } else {
        (Some(decode(&data[..width])), width)
    }
}

/// Decodes `data` according to `format`.
///
/// Integer and float fields advance the cursor by their fixed width;
/// strings are decoded through `encoding`. Running out of input
/// mid-record yields the fields decoded so far. An unknown type code or
/// a malformed item fails the whole record.
pub(crate) fn unpack(format: &str, data: &[u8], encoding: &'static Encoding) -> Result<Record> {
    let mut record = Record::default();
    if data.is_empty() {
        return Ok(record);
    }
    if format.is_empty() {
        return Err(GeoError::Format("empty pack format".into()));
    }

    let mut offset = 0usize;
    for item in format.split('/') {
        if offset >= data.len() {
            break;
        }
        let (spec, name) = item.split_once(':').ok_or_else(|| {
            GeoError::Format(format!("malformed pack item {item:?} in {format:?}"))
        })?;
        let code = *spec.as_bytes().first().ok_or_else(|| {
            GeoError::Format(format!("malformed pack item {item:?} in {format:?}"))
        })?;
        let arg = spec.get(1..).unwrap_or("");
        let remaining = &data[offset..];

        let (value, consumed) = match code {
            b't' => fixed(remaining, 1, |b| Value::Int(i64::from(b[0] as i8))),
            b'T' => fixed(remaining, 1, |b| Value::Uint(u64::from(b[0]))),
            b's' => fixed(remaining, 2, |b| {
                Value::Int(i64::from(LittleEndian::read_i16(b)))
            }),
            b'S' => fixed(remaining, 2, |b| {
                Value::Uint(u64::from(LittleEndian::read_u16(b)))
            }),
            b'm' => fixed(remaining, 3, |b| {
                Value::Int(i64::from(LittleEndian::read_i24(b)))
            }),
            b'M' => fixed(remaining, 3, |b| {
                Value::Uint(u64::from(LittleEndian::read_u24(b)))
            }),
            b'i' => fixed(remaining, 4, |b| {
                Value::Int(i64::from(LittleEndian::read_i32(b)))
            }),
            b'I' => fixed(remaining, 4, |b| {
                Value::Uint(u64::from(LittleEndian::read_u32(b)))
            }),
            b'f' => fixed(remaining, 4, |b| {
                Value::Float(f64::from(LittleEndian::read_f32(b)))
            }),
            b'd' => fixed(remaining, 8, |b| Value::Float(LittleEndian::read_f64(b))),
            b'n' => {
                let scale = decimal_scale(arg);
                fixed(remaining, 2, |b| {
                    Value::Float(f64::from(LittleEndian::read_i16(b)) / scale)
                })
            }
            b'N' => {
                let scale = decimal_scale(arg);
                fixed(remaining, 4, |b| {
                    Value::Float(f64::from(LittleEndian::read_i32(b)) / scale)
                })
            }
            b'c' => {
                let want = arg.parse::<usize>().map_err(|_| {
                    GeoError::Format(format!("bad width {arg:?} for c field in {format:?}"))
                })?;
                // Truncated input decodes whatever is left.
                let take = want.min(remaining.len());
                let text = decode_text(&remaining[..take], encoding);
                (
                    Some(Value::Str(text.trim_end_matches(['\0', ' ']).to_string())),
                    take,
                )
            }
            b'b' => match remaining.iter().position(|&b| b == 0) {
                Some(end) => (
                    Some(Value::Str(decode_text(&remaining[..end], encoding))),
                    end + 1,
                ),
                None => (
                    Some(Value::Str(decode_text(remaining, encoding))),
                    remaining.len(),
                ),
            },
            other => {
                return Err(GeoError::Format(format!(
                    "unknown pack type {:?} in {format:?}",
                    other as char
                )))
            }
        };

        match value {
            Some(v) => {
                record.fields.insert(name.to_string(), v);
                offset += consumed;
            }
            // A fixed-width field ran past the end of the record.
            None => break,
        }
    }

    Ok(record)
}
