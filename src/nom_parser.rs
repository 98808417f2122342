use nom::bytes::streaming::{tag, take};
use nom::combinator::verify;
use nom::number::streaming::u8;
use nom::Err::Incomplete;
use nom::IResult;

use crate::packet::{checksum, Packet, Parsed, SYNC};

type Buf = [u8];

pub(crate) fn parse_packet(buf: &Buf) -> Parsed<'_> {
    match packet(buf) {
        Ok((remaining, packet)) => Parsed::Complete {
            consumed: buf.len() - remaining.len(),
            packet,
        },
        Err(Incomplete(_)) => Parsed::Incomplete,
        Err(_) => Parsed::Invalid,
    }
}

fn packet(buf: &Buf) -> IResult<&Buf, Packet<'_>> {
    let (buf, _sync) = tag(&SYNC[..])(buf)?;
    let (buf, id) = u8(buf)?;
    // length covers the code and checksum bytes, so it's never below two
    let (buf, length) = verify(u8, |length: &u8| *length >= 2)(buf)?;
    let (buf, code) = u8(buf)?;
    let (buf, parameters) = take(usize::from(length) - 2)(buf)?;
    let (buf, _checksum) = verify(u8, |received: &u8| {
        *received == checksum(id, length, code, parameters)
    })(buf)?;
    Ok((
        buf,
        Packet {
            id,
            code,
            parameters,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        let buf = [0xFF, 0xFF, 0x01, 0x03, 0x00, 0x20, 0xDB, 0xAA];
        assert_eq!(
            parse_packet(&buf),
            Parsed::Complete {
                consumed: 7,
                packet: Packet {
                    id: 1,
                    code: 0,
                    parameters: &[0x20]
                }
            }
        );
    }

    #[test]
    fn test_incomplete() {
        let buf = [0xFF, 0xFF, 0x01, 0x03, 0x00, 0x20, 0xDB];
        for end in 0..buf.len() {
            assert_eq!(parse_packet(&buf[..end]), Parsed::Incomplete, "{}", end);
        }
    }

    #[test]
    fn test_invalid() {
        // no sync marker
        assert_eq!(parse_packet(&[0x00, 0xFF, 0xFF]), Parsed::Invalid);
        assert_eq!(parse_packet(&[0xFF, 0x01]), Parsed::Invalid);
        // bad checksum
        assert_eq!(
            parse_packet(&[0xFF, 0xFF, 0x01, 0x02, 0x01, 0xFA]),
            Parsed::Invalid
        );
        // length too small to hold the code and checksum
        assert_eq!(
            parse_packet(&[0xFF, 0xFF, 0x01, 0x01, 0x01, 0xFB]),
            Parsed::Invalid
        );
    }
}
