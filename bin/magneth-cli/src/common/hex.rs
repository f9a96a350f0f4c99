//! Hex and salt parsing utilities for the magneth CLI

use std::{fs, io::Read};

use alloy_primitives::{hex, Bytes, B256, U256};
use magneth::{salt_from_be_slice, salt_from_u256};

use super::{CliError, Result};

/// Load hex-encoded bytes from an argument or a file. If the file is a dash (-), read from stdin.
/// Priority: arg > file. Returns `None` if neither is provided.
pub fn load_hex(arg: Option<&str>, file: Option<&str>) -> Result<Option<Bytes>> {
    let hex_string = if let Some(arg) = arg {
        arg.to_owned()
    } else if let Some(file) = file {
        read_input(file)?
    } else {
        return Ok(None);
    };

    decode_hex(&hex_string).map(|bytes| Some(Bytes::from(bytes)))
}

/// Read a file to a string. A dash (-) reads from stdin.
pub fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(file)?)
    }
}

/// Decode hex string, handling optional 0x prefix
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();

    if s.is_empty() {
        return Ok(Vec::new());
    }

    let hex_str = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);

    if hex_str.len() % 2 != 0 {
        return Err(CliError::InvalidInput(format!(
            "Invalid hex string length: {} (must be even)",
            hex_str.len()
        )));
    }

    Ok(hex::decode(hex_str)?)
}

/// Parse a CREATE2 salt. Hex input (0x-prefixed) is a big-endian byte string of at most 32 bytes,
/// left-padded with zeros; anything else is read as a decimal integer.
pub fn parse_salt(s: &str) -> Result<B256> {
    let s = s.trim();
    if s.starts_with("0x") || s.starts_with("0X") {
        return Ok(salt_from_be_slice(&decode_hex(s)?)?);
    }
    let value = s
        .parse::<U256>()
        .map_err(|err| CliError::InvalidInput(format!("Invalid salt {s:?}: {err}")))?;
    Ok(salt_from_u256(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;
    use magneth::SaltError;
    use rstest::rstest;

    #[rstest]
    #[case("", &[])]
    #[case("0x", &[])]
    #[case("0xdeadBEEF", &[0xde, 0xad, 0xbe, 0xef])]
    #[case("  0X0102\n", &[0x01, 0x02])]
    #[case("00ff", &[0x00, 0xff])]
    fn test_decode_hex(#[case] input: &str, #[case] expected: &[u8]) {
        assert_eq!(decode_hex(input).unwrap(), expected);
    }

    #[test]
    fn test_decode_hex_odd_length() {
        assert!(matches!(decode_hex("0xabc"), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_load_hex_prefers_argument() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("code.hex");
        fs::write(&path, "0x02").unwrap();
        let file = path.to_str();

        assert_eq!(load_hex(Some("0x01"), file).unwrap(), Some(Bytes::from(vec![1])));
        assert_eq!(load_hex(None, file).unwrap(), Some(Bytes::from(vec![2])));
        assert_eq!(load_hex(None, None).unwrap(), None);
    }

    #[rstest]
    #[case("1", b256!("0x0000000000000000000000000000000000000000000000000000000000000001"))]
    #[case("0x01", b256!("0x0000000000000000000000000000000000000000000000000000000000000001"))]
    #[case("0x0100", b256!("0x0000000000000000000000000000000000000000000000000000000000000100"))]
    #[case("256", b256!("0x0000000000000000000000000000000000000000000000000000000000000100"))]
    fn test_parse_salt(#[case] input: &str, #[case] expected: B256) {
        assert_eq!(parse_salt(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_salt_too_long() {
        let input = format!("0x{}", "11".repeat(33));
        assert!(matches!(parse_salt(&input), Err(CliError::Salt(SaltError::TooLong(33)))));
        assert!(matches!(parse_salt("salt"), Err(CliError::InvalidInput(_))));
    }
}
