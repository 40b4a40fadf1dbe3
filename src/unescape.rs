/*!
Best-effort string unescaping, in place.

The decoder rewrites a raw JSON string body (no surrounding quotes) into
its logical content inside the same buffer. Every escape it recognizes is
at least as many bytes encoded as decoded (`\n` is two bytes for one,
`\uXXXX` is six bytes for at most three, a surrogate pair is twelve bytes
for four), so the write cursor can never overtake the read cursor and the
output is a prefix of the buffer. Any escape added here in the future must
preserve that property or move to separate scratch space.

Malformed input is kept, not rejected. An unknown escape like `\q` and a
`\u` that isn't followed by four hex digits are emitted verbatim, backslash
included, and scanning continues; only a dangling `\` at the very end of
the input is dropped.
*/

use memchr::memchr;

/**
Decode the escapes in `buf`, writing over it, and return the decoded
length. The decoded content is `buf[..len]`.
*/
pub(crate) fn unescape_in_place(buf: &mut [u8]) -> usize {
    // everything before the first escape is already in place
    let mut write = match memchr(b'\\', buf) {
        Some(backslash) => backslash,
        None => return buf.len(),
    };

    // the byte after the `\`
    let mut read = write + 1;

    while read < buf.len() {
        let escape = buf[read];
        read += 1;

        match escape {
            b'"' | b'\\' | b'/' => {
                buf[write] = escape;
                write += 1;
            }
            b'b' => {
                buf[write] = 0x08;
                write += 1;
            }
            b'f' => {
                buf[write] = 0x0c;
                write += 1;
            }
            b'n' => {
                buf[write] = b'\n';
                write += 1;
            }
            b'r' => {
                buf[write] = b'\r';
                write += 1;
            }
            b't' => {
                buf[write] = b'\t';
                write += 1;
            }
            b'u' => match hex4(&buf[read..]) {
                Some(code) => {
                    read += 4;

                    match char::from_u32(code as u32) {
                        // a BMP scalar; surrogate halves fall through
                        Some(decoded) => {
                            write += decoded.encode_utf8(&mut buf[write..]).len();
                        }
                        None => {
                            let low = if buf.len() - read >= 6
                                && buf[read] == b'\\'
                                && buf[read + 1] == b'u'
                            {
                                hex4(&buf[read + 2..])
                            } else {
                                None
                            };

                            match low {
                                Some(low) => {
                                    read += 6;

                                    let decoded = surrogate_pair(code, low).unwrap_or('\u{fffd}');
                                    write += decoded.encode_utf8(&mut buf[write..]).len();
                                }
                                // an unpaired surrogate keeps its escape as
                                // it appeared
                                None => {
                                    buf[write] = b'\\';
                                    buf[write + 1] = b'u';
                                    buf.copy_within(read - 4..read, write + 2);
                                    write += 6;
                                }
                            }
                        }
                    }
                }
                // not four hex digits: keep the `\u` and rescan the rest
                None => {
                    buf[write] = b'\\';
                    buf[write + 1] = b'u';
                    write += 2;
                }
            },
            // unknown escape, kept verbatim
            _ => {
                buf[write] = b'\\';
                buf[write + 1] = escape;
                write += 2;
            }
        }

        // shift the literal run up to the next escape
        match memchr(b'\\', &buf[read..]) {
            Some(run) => {
                buf.copy_within(read..read + run, write);
                write += run;
                read += run + 1;
            }
            None => {
                let run = buf.len() - read;
                buf.copy_within(read.., write);

                return write + run;
            }
        }
    }

    write
}

#[inline]
fn hex4(buf: &[u8]) -> Option<u16> {
    if buf.len() < 4 {
        return None;
    }

    let mut code = 0u16;

    for &digit in &buf[..4] {
        let nibble = match digit {
            b'0'..=b'9' => digit - b'0',
            b'a'..=b'f' => digit - b'a' + 10,
            b'A'..=b'F' => digit - b'A' + 10,
            _ => return None,
        };

        code = (code << 4) | nibble as u16;
    }

    Some(code)
}

/// Combine a UTF-16 surrogate pair into the scalar value it encodes.
#[inline]
fn surrogate_pair(high: u16, low: u16) -> Option<char> {
    if !(0xd800..0xdc00).contains(&high) || !(0xdc00..0xe000).contains(&low) {
        return None;
    }

    let code = 0x10000 + (((high as u32 - 0xd800) << 10) | (low as u32 - 0xdc00));

    char::from_u32(code)
}
