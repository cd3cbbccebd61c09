//! Wire codec for the haptic device protocol.
//!
//! Every payload is a short ASCII line in a single UDP datagram:
//!
//! - Device → client telemetry: `<angle>,<velocity>` — two decimal floats
//!   (radians, radians/sec), trailing whitespace tolerated.
//! - Client → device command: `STEPS:<0|1>` — disable/enable stepping mode.
//! - Client → device handshake/probe: the [`HANDSHAKE`] token, which
//!   registers the sender as the telemetry receiver.
//!
//! The codec is pure transformation: no I/O, no shared state. Anything that
//! is not a telemetry frame decodes to [`ParseError::Malformed`] and the
//! caller drops it — the device may emit arbitrary junk and the client must
//! never wedge on it.

use crate::error::ParseError;
use crate::types::Command;

/// Handshake and keepalive probe payload.
///
/// The device treats any inbound packet as "a receiver is here", but strict
/// firmware builds filter on this exact token, so it is used for both the
/// initial handshake and silence-recovery probes.
pub const HANDSHAKE: &[u8] = b"HELLO";

/// Largest datagram the device emits. Telemetry lines are far shorter; the
/// extra room keeps oversized junk from being truncated into a frame that
/// might accidentally parse.
pub const MAX_DATAGRAM: usize = 1024;

/// Decodes a telemetry frame of the form `<angle>,<velocity>`.
///
/// The input must be UTF-8, contain at least one comma, and its first two
/// comma-separated fields must each parse as a finite float. Extra fields
/// are tolerated and ignored. Any violation yields
/// [`ParseError::Malformed`] with no partial result.
///
/// # Example
///
/// ```
/// use haptic_link::protocol::decode_telemetry;
///
/// let (angle, velocity) = decode_telemetry(b"1.5708,2.0\n").unwrap();
/// assert_eq!(angle, 1.5708);
/// assert_eq!(velocity, 2.0);
/// assert!(decode_telemetry(b"INVALID_JUNK_DATA").is_err());
/// ```
pub fn decode_telemetry(raw: &[u8]) -> Result<(f64, f64), ParseError> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| ParseError::malformed("not UTF-8"))?
        .trim();

    if !text.contains(',') {
        return Err(ParseError::malformed("no field separator"));
    }

    let mut fields = text.split(',');
    let angle = parse_field(fields.next(), "angle")?;
    let velocity = parse_field(fields.next(), "velocity")?;
    Ok((angle, velocity))
}

fn parse_field(field: Option<&str>, name: &'static str) -> Result<f64, ParseError> {
    let value: f64 = field
        .map(str::trim)
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| ParseError::malformed(name))?;

    if !value.is_finite() {
        return Err(ParseError::malformed(name));
    }
    Ok(value)
}

/// Encodes a command into its wire payload.
///
/// Deterministic and side-effect free: encoding the same command twice
/// produces identical bytes.
pub fn encode_command(command: &Command) -> Vec<u8> {
    match command {
        Command::SetSteppingMode(enabled) => {
            format!("STEPS:{}", u8::from(*enabled)).into_bytes()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_telemetry_frame() {
        let (angle, velocity) = decode_telemetry(b"1.5708,2.0\n").unwrap();
        assert_eq!(angle, 1.5708);
        assert_eq!(velocity, 2.0);
    }

    #[test]
    fn test_decode_tolerates_whitespace_and_extra_fields() {
        let (angle, velocity) = decode_telemetry(b"  -0.5 , 3.25 , 1\r\n").unwrap();
        assert_eq!(angle, -0.5);
        assert_eq!(velocity, 3.25);
    }

    #[test]
    fn test_decode_round_trip() {
        for (angle, velocity) in [(0.0, 0.0), (3.14159, -12.5), (-100.25, 0.001)] {
            let line = format!("{},{}", angle, velocity);
            let (a, v) = decode_telemetry(line.as_bytes()).unwrap();
            assert!((a - angle).abs() < 1e-12);
            assert!((v - velocity).abs() < 1e-12);
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let cases: &[&[u8]] = &[
            b"INVALID_JUNK_DATA",
            b"",
            b"\n",
            b"1.5708",
            b"abc,def",
            b"1.0,",
            b",2.0",
            b"nan,2.0",
            b"1.0,inf",
            b"\xff\xfe,1.0",
        ];
        for raw in cases {
            let err = decode_telemetry(raw).unwrap_err();
            assert!(matches!(err, ParseError::Malformed { .. }), "{:?}", raw);
        }
    }

    #[test]
    fn test_encode_stepping_mode() {
        assert_eq!(
            encode_command(&Command::SetSteppingMode(true)),
            b"STEPS:1".to_vec()
        );
        assert_eq!(
            encode_command(&Command::SetSteppingMode(false)),
            b"STEPS:0".to_vec()
        );
    }

    #[test]
    fn test_encode_is_deterministic() {
        let first = encode_command(&Command::SetSteppingMode(true));
        let second = encode_command(&Command::SetSteppingMode(true));
        assert_eq!(first, second);
    }
}
