//! Format descriptors and the parse/serialize entry points.
use std::io::{self, BufWriter, Write};

use crate::parser::{Parser, Result};
use crate::printer;
use crate::value::Value;

/// An s-expression format: a record of the syntactic elements a parser will
/// accept.
///
/// There is no constructor; use one of the provided instances, [`CSEXP`] or
/// [`SX`].
#[derive(Debug, Clone, Copy)]
pub struct Format {
    /// Quoted strings with escape sequences: `"foo"`.
    pub(crate) quoted_strings: bool,
    /// Integers: `42`, `-12`.
    pub(crate) integers: bool,
    /// Lists: `(foo bar)`.
    pub(crate) lists: bool,
    /// Length-prefixed verbatim byte strings: `4:blah`.
    pub(crate) verbatim_byte_strings: bool,
    /// Base64 atoms: `|YXBw|`.
    pub(crate) base64_strings: bool,
    /// Base64 envelopes holding further source: `{MzphYmM=}`.
    pub(crate) verbatim_base64: bool,
    /// Hex atoms: `#01020304feff#`.
    pub(crate) hex_strings: bool,
    /// Bare tokens: `rsa-with-md5`.
    pub(crate) tokens: bool,
    /// List nesting above this fails the parse.
    pub(crate) max_depth: u32,
    /// Decode input as UTF-8 rather than raw octets.
    pub(crate) unicode_stream: bool,
}

/// The strict canonical format. Every input octet is one character.
pub const CSEXP: Format = Format {
    quoted_strings: true,
    integers: true,
    lists: true,
    verbatim_byte_strings: true,
    base64_strings: true,
    verbatim_base64: true,
    hex_strings: true,
    tokens: true,
    max_depth: 255,
    unicode_stream: false,
};

/// The advanced format. Accepts the same elements as [`CSEXP`] but decodes
/// the input stream as UTF-8.
pub const SX: Format = Format {
    unicode_stream: true,
    ..CSEXP
};

impl Format {
    /// Create a fresh incremental parser for this format.
    pub fn parser(&self) -> Parser {
        Parser::new(*self)
    }

    /// Parse a complete input and return the top-level values.
    pub fn parse(&self, input: &[u8]) -> Result<Vec<Value>> {
        let mut parser = self.parser();
        parser.write(input)?;
        parser.close()
    }

    /// Serialize values in canonical form.
    pub fn serialize(&self, values: &[Value]) -> Vec<u8> {
        let mut out = Vec::new();
        let _ = printer::write_values(values, &mut out);
        out
    }

    /// Serialize values in canonical form to a writer.
    pub fn write<W: Write>(&self, values: &[Value], writer: W) -> io::Result<()> {
        let mut writer = BufWriter::new(writer);
        printer::write_values(values, &mut writer)?;
        writer.flush()
    }
}

#[cfg(test)]
mod test {
    use super::{CSEXP, SX};
    use rstest::rstest;

    // The Rivest certificate sample in its three surface forms. All
    // canonicalize to the same bytes.
    const RIVEST_CANONICAL: &[u8] = b"(11:certificate(6:issuer(4:name(10:public-key12:rsa-with-md5(1:e15:4Q\xaa\xfcM\xf0\x87\xd7\xf8\xac\x92\x10UxR)(1:n44:w\xbd\xfc\xff\x88!?\xda\xc5gH\x00!\x86y\xab\xdc\xba\x8a\xc9\x03'\x00\x12\x8b\x9a\xc4B\x91\x10\xab\xc6r1\x97\x88g2\x00Gb9\x88a))13:aid-committee))(7:subject(3:ref(10:public-key12:rsa-with-md5(1:e15:4Q\xaa\xfcM\xf0\x87\xd7\xf8\xac\x92\x10UxR)(1:n44:w\xbd\xfc\xff\x88!?\xda\xc5gH\x00!\x86y\xab\xdc\xba\x8a\xc9\x03'\x00\x12\x8b\x9a\xc4B\x91\x10\xab\xc6r1\x97\x88g2\x00Gb9\x88a))3:tom6:mother))(10:not-before19:1997-01-01_09:00:00)(9:not-after19:1998-01-01_09:00:00)(3:tag(5:spend(7:account8:12345678)(1:*7:numeric5:range1:14:1000))))";

    const RIVEST_ADVANCED: &[u8] = b"(certificate
 (issuer
  (name
   (public-key
    rsa-with-md5
    (e |NFGq/E3wh9f4rJIQVXhS|)
    (n |d738/4ghP9rFZ0gAIYZ5q9y6iskDJwASi5rEQpEQq8ZyMZeIZzIAR2I5iGE=|))
   aid-committee))
 (subject
  (ref
   (public-key
    rsa-with-md5
    (e |NFGq/E3wh9f4rJIQVXhS|)
    (n |d738/4ghP9rFZ0gAIYZ5q9y6iskDJwASi5rEQpEQq8ZyMZeIZzIAR2I5iGE=|))
   tom
   mother))
 (not-before \"1997-01-01_09:00:00\")
 (not-after \"1998-01-01_09:00:00\")
 (tag
  (spend (account \"12345678\") (* numeric range \"1\" \"1000\"))))";

    const RIVEST_TRANSPORT: &[u8] = b"{KDExOmNlcnRpZmljYXRlKDY6aXNzdWVyKDQ6bmFtZSgxMDpwdWJsaWMta2V5MTI6cnNhLXdpdGgtbWQ1KDE6ZTE1OjRRqvxN8IfX+KySEFV4UikoMTpuNDQ6d738/4ghP9rFZ0gAIYZ5q9y6iskDJwASi5rEQpEQq8ZyMZeIZzIAR2I5iGEpKTEzOmFpZC1jb21taXR0ZWUpKSg3OnN1YmplY3QoMzpyZWYoMTA6cHVibGljLWtleTEyOnJzYS13aXRoLW1kNSgxOmUxNTo0Uar8TfCH1/iskhBVeFIpKDE6bjQ0One9/P+IIT/axWdIACGGeavcuorJAycAEouaxEKREKvGcjGXiGcyAEdiOYhhKSkzOnRvbTY6bW90aGVyKSkoMTA6bm90LWJlZm9yZTE5OjE5OTctMDEtMDFfMDk6MDA6MDApKDk6bm90LWFmdGVyMTk6MTk5OC0wMS0wMV8wOTowMDowMCkoMzp0YWcoNTpzcGVuZCg3OmFjY291bnQ4OjEyMzQ1Njc4KSgxOio3Om51bWVyaWM1OnJhbmdlMToxNDoxMDAwKSkpKQ==
}";

    #[rstest]
    #[case(b"()" as &[u8], b"()" as &[u8])]
    #[case(b"(())", b"(())")]
    #[case(b"(()())", b"(()())")]
    #[case(b"((()))", b"((()))")]
    #[case(b"(((())))", b"(((())))")]
    #[case(b"0", b"0")]
    #[case(b"1", b"1")]
    #[case(b"42", b"42")]
    #[case(b"123", b"123")]
    #[case(b"1234", b"1234")]
    #[case(b"4294967296", b"4294967296")]
    #[case(b"9999999999", b"9999999999")]
    #[case(b"-1", b"-1")]
    #[case(b"-2", b"-2")]
    #[case(b"-42", b"-42")]
    #[case(b"-9999999999", b"-9999999999")]
    #[case(b"(42)", b"(42)")]
    #[case(b"(42 105)", b"(42 105)")]
    #[case(b"(42 105 -12)", b"(42 105 -12)")]
    #[case(b"(-10 92 -108)", b"(-10 92 -108)")]
    #[case(b"5:hello", b"5:hello")]
    #[case(b"5:h\x00\xffBo", b"5:h\x00\xffBo")]
    #[case(b"(1:a2:oh3:abc(4:open5:apple42 91))", b"(1:a2:oh3:abc(4:open5:apple42 91))")]
    #[case(b"||", b"0:")]
    #[case(b"|YQ==|", b"1:a")]
    #[case(b"|YXA=|", b"2:ap")]
    #[case(b"|YXBw|", b"3:app")]
    #[case(b"|YXBwbA==|", b"4:appl")]
    #[case(b"|YXB \r\t\nwbGU=|", b"5:apple")]
    #[case(b"{MDo=}", b"0:")]
    #[case(b"{MTph}", b"1:a")]
    #[case(b"{MjphYg==}", b"2:ab")]
    #[case(b"{MzphYmM=}", b"3:abc")]
    #[case(b"{NDphYmNk}", b"4:abcd")]
    #[case(b"{NTpoZ\n \t\rWxsbyAoNTp0aGVyZSk=}", b"5:hello(5:there)")]
    #[case(b"the elves", b"3:the5:elves")]
    #[case(b"-token", b"6:-token")]
    #[case(b"#00010203af#", b"5:\x00\x01\x02\x03\xaf")]
    #[case(b"5#00010203af#", b"5:\x00\x01\x02\x03\xaf")]
    #[case(b"#00 01\t02\r03\naf#", b"5:\x00\x01\x02\x03\xaf")]
    #[case(b"\"apple\"", b"5:apple")]
    #[case(b"\"app\\tfoo\"", b"7:app\tfoo")]
    #[case(b"\"app\\x61ae\"", b"6:appaae")]
    #[case(b"\"app\\xeeae\"", b"6:app\xeeae")]
    #[case(b"\"app\\377ae\"", b"6:app\xffae")]
    #[case(RIVEST_CANONICAL, RIVEST_CANONICAL)]
    #[case(RIVEST_ADVANCED, RIVEST_CANONICAL)]
    #[case(RIVEST_TRANSPORT, RIVEST_CANONICAL)]
    fn canonicalizes(#[case] input: &[u8], #[case] expected: &[u8]) {
        let values = SX.parse(input).unwrap();
        assert_eq!(SX.serialize(&values), expected);
    }

    #[rstest]
    #[case(b"(5:h\x00\xffBo|YXBw|#00ff#)" as &[u8], b"(5:h\x00\xffBo3:app2:\x00\xff)" as &[u8])]
    #[case(b"(42 -1 the)", b"(42 -1 3:the)")]
    fn csexp_canonicalizes(#[case] input: &[u8], #[case] expected: &[u8]) {
        let values = CSEXP.parse(input).unwrap();
        assert_eq!(CSEXP.serialize(&values), expected);
    }

    #[test]
    fn canonical_output_reparses_to_itself() {
        for input in [RIVEST_CANONICAL, RIVEST_ADVANCED, RIVEST_TRANSPORT] {
            let out = SX.serialize(&SX.parse(input).unwrap());
            let again = SX.serialize(&SX.parse(&out).unwrap());
            assert_eq!(out, again);
        }
    }

    #[test]
    fn write_matches_serialize() {
        let values = SX.parse(RIVEST_ADVANCED).unwrap();
        let mut out = Vec::new();
        SX.write(&values, &mut out).unwrap();
        assert_eq!(out, SX.serialize(&values));
    }
}
