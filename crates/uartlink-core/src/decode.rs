//! Percent-encoding decoder for the bridge's control surface.
//!
//! This reproduces the nginx `ngx_unescape_uri` dialect byte-for-byte,
//! including its tolerant handling of malformed escapes. Parameter parsing
//! downstream depends on that exact tolerance, so none of the quirks here
//! should be cleaned up:
//!
//! - A `%` followed by a non-hex byte is dropped; the offending byte is
//!   emitted verbatim.
//! - A `%` plus one hex digit followed by a non-hex byte is dropped entirely.
//! - A literal `?` (or a decoded `%3F`) terminates scanning; the remainder
//!   of the input is ignored. Pre-split query values never contain one, but
//!   the rule is part of the dialect.
//!
//! Decoding is pure and infallible; output length never exceeds input length
//! plus nothing (each escape shrinks or round-trips).

/// Decoding variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Decode every well-formed escape.
    Plain,
    /// Refuse to decode control and high-range bytes: a decoded byte outside
    /// `(0x25, 0x7F)` is re-emitted as its original three source bytes.
    RedirectAware,
}

/// Scanner state. One escape consumes at most two bytes of lookahead.
#[derive(Clone, Copy)]
enum State {
    Usual,
    Quoted,
    QuotedSecond {
        /// High nibble already decoded.
        high: u8,
        /// The first hex digit as it appeared in the input, kept so
        /// `RedirectAware` can re-emit the escape unchanged.
        first: u8,
    },
}

/// Map an ASCII hex digit to its value, case-insensitive.
fn hex_value(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        _ => {
            let c = ch | 0x20;
            if (b'a'..=b'f').contains(&c) {
                Some(c - b'a' + 10)
            } else {
                None
            }
        }
    }
}

/// Decode `input` according to `mode`.
///
/// Never fails; malformed escapes are absorbed per the dialect rules above.
pub fn decode(input: &[u8], mode: Mode) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut state = State::Usual;

    for &ch in input {
        match state {
            State::Usual => {
                if ch == b'?' {
                    out.push(ch);
                    return out;
                }
                if ch == b'%' {
                    state = State::Quoted;
                } else {
                    out.push(ch);
                }
            }
            State::Quoted => match hex_value(ch) {
                Some(high) => {
                    state = State::QuotedSecond { high, first: ch };
                }
                None => {
                    // Invalid escape: the leading '%' is silently dropped.
                    out.push(ch);
                    state = State::Usual;
                }
            },
            State::QuotedSecond { high, first } => {
                state = State::Usual;
                match hex_value(ch) {
                    Some(low) => {
                        let decoded = (high << 4) | low;
                        match mode {
                            Mode::Plain => {
                                out.push(decoded);
                                if decoded == b'?' {
                                    return out;
                                }
                            }
                            Mode::RedirectAware => {
                                if decoded == b'?' {
                                    out.push(decoded);
                                    return out;
                                }
                                if decoded > b'%' && decoded < 0x7f {
                                    out.push(decoded);
                                } else {
                                    // Control/high byte: keep the original
                                    // escape untouched.
                                    out.push(b'%');
                                    out.push(first);
                                    out.push(ch);
                                }
                            }
                        }
                    }
                    // Invalid second digit: the whole escape vanishes.
                    None => {}
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(input: &str) -> Vec<u8> {
        decode(input.as_bytes(), Mode::Plain)
    }

    fn redirect(input: &str) -> Vec<u8> {
        decode(input.as_bytes(), Mode::RedirectAware)
    }

    #[test]
    fn passthrough_without_escapes() {
        for s in ["", "hello", "speed=9600", "a b c", "UPPER_lower-123"] {
            assert_eq!(plain(s), s.as_bytes());
            assert_eq!(redirect(s), s.as_bytes());
        }
    }

    #[test]
    fn decodes_basic_escapes() {
        assert_eq!(plain("a%20b"), b"a b");
        assert_eq!(plain("a%2b"), b"a+");
        assert_eq!(plain("a%2B"), b"a+");
        assert_eq!(plain("%41%42%43"), b"ABC");
    }

    #[test]
    fn decodes_raw_utf8_bytes() {
        // The decoder is byte-level; multibyte sequences come out raw.
        assert_eq!(plain("%E4%B8%AD"), &[0xe4, 0xb8, 0xad]);
    }

    #[test]
    fn invalid_first_digit_drops_percent() {
        // '%' is dropped, the offender is emitted verbatim.
        assert_eq!(plain("a%zb"), b"azb");
        assert_eq!(plain("a%zzb"), b"azzb");
        assert_eq!(plain("100%"), b"100");
    }

    #[test]
    fn invalid_second_digit_drops_whole_escape() {
        assert_eq!(plain("a%2xb"), b"ab");
        assert_eq!(plain("%f"), b"");
    }

    #[test]
    fn literal_question_mark_terminates() {
        assert_eq!(plain("ab?cd"), b"ab?");
        assert_eq!(redirect("ab?cd"), b"ab?");
    }

    #[test]
    fn decoded_question_mark_terminates() {
        assert_eq!(plain("a%3Fb"), b"a?");
        assert_eq!(redirect("a%3fb"), b"a?");
    }

    #[test]
    fn redirect_preserves_high_and_control_bytes() {
        // 0x7F is not strictly below 0x7F, so the escape survives untouched.
        assert_eq!(redirect("abc%7f"), b"abc%7f");
        assert_eq!(redirect("abc%7F"), b"abc%7F");
        assert_eq!(redirect("%00"), b"%00");
        assert_eq!(redirect("%E4%B8%AD"), b"%E4%B8%AD");
        // '%' itself (0x25) is on the closed boundary and is preserved too.
        assert_eq!(redirect("%25"), b"%25");
    }

    #[test]
    fn redirect_decodes_printable_range() {
        assert_eq!(redirect("a%2bb"), b"a+b");
        assert_eq!(redirect("%41"), b"A");
        assert_eq!(redirect("%7e"), b"~");
    }

    #[test]
    fn output_never_longer_than_input() {
        for s in ["%%%%", "%z%z", "a%2", "%E4%B8%AD", "plain", "%3F%3F"] {
            assert!(plain(s).len() <= s.len());
            assert!(redirect(s).len() <= s.len());
        }
    }
}
