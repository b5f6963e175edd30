//! Canonical serialization of value trees.
use std::fmt::Display;
use std::io::{self, Write};

use crate::value::Value;

/// Write a slice of values in canonical form.
///
/// Atoms are self-delimiting except where two decimal runs would touch: a
/// single space separates an integer from a following integer or netstring.
pub(crate) fn write_values<W: Write>(values: &[Value], writer: &mut W) -> io::Result<()> {
    let mut after_integer = false;
    for value in values {
        match value {
            Value::Symbol(s) => {
                netstring(s.as_bytes(), after_integer, writer)?;
                after_integer = false;
            }
            Value::Bytes(data) => {
                netstring(data, after_integer, writer)?;
                after_integer = false;
            }
            Value::I32(n) => {
                decimal(n, after_integer, writer)?;
                after_integer = true;
            }
            Value::I64(n) => {
                decimal(n, after_integer, writer)?;
                after_integer = true;
            }
            Value::U64(n) => {
                decimal(n, after_integer, writer)?;
                after_integer = true;
            }
            Value::List(values) => {
                writer.write_all(b"(")?;
                write_values(values, writer)?;
                writer.write_all(b")")?;
                after_integer = false;
            }
        }
    }
    Ok(())
}

fn netstring<W: Write>(data: &[u8], space: bool, writer: &mut W) -> io::Result<()> {
    if space {
        writer.write_all(b" ")?;
    }
    write!(writer, "{}:", data.len())?;
    writer.write_all(data)
}

fn decimal<W: Write>(n: impl Display, space: bool, writer: &mut W) -> io::Result<()> {
    if space {
        writer.write_all(b" ")?;
    }
    write!(writer, "{n}")
}

#[cfg(test)]
mod test {
    use crate::format::SX;
    use crate::value::Value;
    use rstest::rstest;

    #[rstest]
    #[case(vec![Value::I32(42), Value::I32(105), Value::I32(-12)], b"42 105 -12" as &[u8])]
    #[case(vec![Value::I32(1), Value::Symbol("a".into())], b"1 1:a")]
    #[case(vec![Value::I32(1), Value::Bytes(vec![0])], b"1 1:\x00")]
    #[case(vec![Value::Symbol("a".into()), Value::I32(1)], b"1:a1")]
    #[case(vec![Value::I32(1), Value::List(vec![]), Value::I32(2)], b"1()2")]
    #[case(vec![Value::List(vec![Value::I32(1)]), Value::I32(2)], b"(1)2")]
    #[case(vec![Value::U64(u64::MAX), Value::I64(i64::MIN)], b"18446744073709551615 -9223372036854775808")]
    #[case(vec![Value::Bytes(vec![]), Value::Symbol("".into())], b"0:0:")]
    fn separates_adjacent_decimal_runs(#[case] values: Vec<Value>, #[case] expected: &[u8]) {
        assert_eq!(SX.serialize(&values), expected);
    }

    #[test]
    fn spacing_state_is_per_list_level() {
        let values = vec![
            Value::I32(1),
            Value::List(vec![Value::Symbol("a".into()), Value::I32(2)]),
        ];
        assert_eq!(SX.serialize(&values), b"1(1:a2)");
    }
}
