use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use num_bigint::BigUint;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid address format: {0}")]
    InvalidAddressFormat(String),
    #[error("invalid shard id: {0}")]
    InvalidShard(String),
    #[error("invalid base64: {0}")]
    InvalidBase64(String),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

// upstream hashes come both padded and unpadded
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent)
);

pub const MASTERCHAIN_SHARD_HEX: &str = "8000000000000000";

/// Interprets a 16 digit hex shard id as an unsigned 64-bit integer and returns
/// its two's-complement signed decimal form, `"8000000000000000"` becomes
/// `"-9223372036854775808"`.
pub fn hex_shard_to_signed_decimal(hex_shard: &str) -> Result<String, CodecError> {
    let digits = hex_shard.strip_prefix("0x").unwrap_or(hex_shard);
    let unsigned = u64::from_str_radix(digits, 16)
        .map_err(|_| CodecError::InvalidShard(hex_shard.to_owned()))?;

    Ok((unsigned as i64).to_string())
}

/// `"0:ab"` becomes `171`: everything after the last colon is read as hex.
pub fn raw_address_to_decimal(address: &str) -> Result<BigUint, CodecError> {
    let Some((_, body)) = address.rsplit_once(':') else {
        return Err(CodecError::InvalidAddressFormat(address.to_owned()));
    };

    BigUint::parse_bytes(body.as_bytes(), 16)
        .ok_or_else(|| CodecError::InvalidAddressFormat(address.to_owned()))
}

pub fn base64_to_byte_array(s: &str) -> Result<Vec<u8>, CodecError> {
    let standard = s
        .replace('-', "+")
        .replace('_', "/");

    LENIENT.decode(standard)
        .map_err(|e| CodecError::InvalidBase64(format!("{}: {}", s, e)))
}

pub fn base64_to_decimal(s: &str) -> Result<BigUint, CodecError> {
    let bytes = base64_to_byte_array(s)?;

    Ok(BigUint::from_bytes_be(&bytes))
}

/// Inverse of [`base64_to_decimal`] for fixed width hashes.
pub fn decimal_to_base64(n: &BigUint, width: usize) -> String {
    let bytes = n.to_bytes_be();
    let mut buf = vec![0u8; width.saturating_sub(bytes.len())];
    buf.extend_from_slice(&bytes);

    base64::engine::general_purpose::STANDARD.encode(buf)
}

pub fn to_url_safe_base64(s: &str) -> String {
    s.replace('/', "_")
        .replace('+', "-")
        .trim_end_matches('=')
        .to_owned()
}

pub fn parse_coins(s: &str) -> Result<BigUint, CodecError> {
    s.parse::<BigUint>()
        .map_err(|_| CodecError::InvalidNumber(s.to_owned()))
}

pub fn parse_u64(s: &str) -> Result<u64, CodecError> {
    s.parse::<u64>()
        .map_err(|_| CodecError::InvalidNumber(s.to_owned()))
}

pub fn is_decimal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);

    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;
    use crate::codec::*;

    #[test]
    fn hex_shard_masterchain() {
        assert_eq!(hex_shard_to_signed_decimal("8000000000000000").unwrap(), "-9223372036854775808");
    }

    #[test]
    fn hex_shard_edges() {
        assert_eq!(hex_shard_to_signed_decimal("0000000000000000").unwrap(), "0");
        assert_eq!(hex_shard_to_signed_decimal("0000000000000001").unwrap(), "1");
        assert_eq!(hex_shard_to_signed_decimal("ffffffffffffffff").unwrap(), "-1");
        assert_eq!(hex_shard_to_signed_decimal("7fffffffffffffff").unwrap(), "9223372036854775807");
    }

    #[test]
    fn hex_shard_is_congruent_modulo_two_pow_64() {
        let modulus = BigUint::from(1u8) << 64;
        for hex in ["a000000000000000", "6000000000000000", "e000000000000000", "c800000000000000", "0000000080000000"] {
            let unsigned = u64::from_str_radix(hex, 16).unwrap();
            let signed: i128 = hex_shard_to_signed_decimal(hex).unwrap().parse().unwrap();

            assert!(signed >= i64::MIN as i128 && signed <= i64::MAX as i128);
            let wrapped = (signed + (1i128 << 64)) as u128 % (1u128 << 64);
            assert_eq!(BigUint::from(wrapped) % &modulus, BigUint::from(unsigned));
        }
    }

    #[test]
    fn hex_shard_rejects_garbage() {
        assert!(hex_shard_to_signed_decimal("zz").is_err());
        assert!(hex_shard_to_signed_decimal("").is_err());
        assert!(hex_shard_to_signed_decimal("10000000000000000").is_err());
    }

    #[test]
    fn hex_shard_is_never_read_as_decimal() {
        assert_eq!(hex_shard_to_signed_decimal("1000000000000000").unwrap(), "1152921504606846976");
        assert!(hex_shard_to_signed_decimal("-9223372036854775808").is_err());
    }

    #[test]
    fn raw_address_to_decimal_reads_hex_body() {
        assert_eq!(raw_address_to_decimal("0:ab").unwrap(), BigUint::from(171u32));
        assert_eq!(raw_address_to_decimal("-1:FF").unwrap(), BigUint::from(255u32));
    }

    #[test]
    fn raw_address_to_decimal_requires_colon() {
        assert_eq!(
            raw_address_to_decimal("badaddress"),
            Err(CodecError::InvalidAddressFormat("badaddress".to_owned()))
        );
    }

    #[test]
    fn base64_decoding() {
        assert_eq!(base64_to_byte_array("AQID").unwrap(), vec![1, 2, 3]);
        assert_eq!(base64_to_decimal("AQI=").unwrap(), BigUint::from(258u32));
        assert_eq!(base64_to_byte_array("-_8=").unwrap(), base64_to_byte_array("+/8").unwrap());
        assert!(base64_to_byte_array("***").is_err());
    }

    #[test]
    fn decimal_to_base64_pads_to_width() {
        let hash = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAQI=";

        assert_eq!(decimal_to_base64(&base64_to_decimal(hash).unwrap(), 32), hash);
    }

    #[test]
    fn url_safe_alphabet() {
        assert_eq!(to_url_safe_base64("a+b/c=="), "a-b_c");
        assert_eq!(to_url_safe_base64("abcd"), "abcd");
    }

    #[test]
    fn decimal_strings() {
        assert!(is_decimal("0"));
        assert!(is_decimal("-12"));
        assert!(!is_decimal(""));
        assert!(!is_decimal("1e3"));
        assert!(!is_decimal("-"));
    }
}
