use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use bytes::BufMut;
use crc::{Crc, CRC_16_XMODEM};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use crate::codec::{base64_to_byte_array, CodecError};

const CHECKSUM: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Tag byte, account id and checksum of the user-friendly form.
const FRIENDLY_LEN: usize = 1 + 1 + 32 + 2;

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TESTNET: u8 = 0x80;

/// How an address was written, kept so it prints back the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Form {
    #[default]
    Raw,
    Friendly { bounceable: bool, testnet: bool }
}

impl Form {
    fn from_tag(tag: u8) -> Option<Self> {
        let testnet = tag & TAG_TESTNET != 0;
        match tag & !TAG_TESTNET {
            TAG_BOUNCEABLE => Some(Form::Friendly { bounceable: true, testnet }),
            TAG_NON_BOUNCEABLE => Some(Form::Friendly { bounceable: false, testnet }),
            _ => None
        }
    }

    fn tag(self) -> u8 {
        let (bounceable, testnet) = match self {
            Form::Raw => (true, false),
            Form::Friendly { bounceable, testnet } => (bounceable, testnet)
        };

        let tag = if bounceable { TAG_BOUNCEABLE } else { TAG_NON_BOUNCEABLE };
        if testnet { tag | TAG_TESTNET } else { tag }
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub workchain: i32,
    pub account_id: [u8; 32],
    pub form: Form
}

impl Address {
    pub fn new(workchain: i32, account_id: [u8; 32]) -> Self {
        Self { workchain, account_id, form: Form::Raw }
    }

    /// Empty strings stand for a missing address in upstream payloads.
    pub fn parse_optional(s: Option<&str>) -> Result<Option<Self>, CodecError> {
        match s {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some)
        }
    }

    fn with_bounce(&self, bounceable: bool) -> Self {
        let testnet = matches!(self.form, Form::Friendly { testnet: true, .. });

        Self { form: Form::Friendly { bounceable, testnet }, ..self.clone() }
    }

    pub fn bounceable(&self) -> Self {
        self.with_bounce(true)
    }

    pub fn non_bounceable(&self) -> Self {
        self.with_bounce(false)
    }

    pub fn to_raw_string(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.account_id))
    }

    /// Raw addresses print as bounceable mainnet ones.
    pub fn to_friendly_string(&self) -> String {
        let mut data = Vec::with_capacity(FRIENDLY_LEN);
        data.put_u8(self.form.tag());
        data.put_i8(self.workchain as i8);
        data.put_slice(&self.account_id);
        let checksum = CHECKSUM.checksum(&data);
        data.put_u16(checksum);

        URL_SAFE.encode(data)
    }

    fn parse_raw(workchain: &str, account_id: &str) -> Option<Self> {
        let workchain = workchain.parse().ok()?;
        let mut id = [0u8; 32];
        hex::decode_to_slice(account_id, &mut id).ok()?;

        Some(Self::new(workchain, id))
    }

    fn parse_friendly(s: &str) -> Option<Self> {
        let data: [u8; FRIENDLY_LEN] = base64_to_byte_array(s).ok()?.try_into().ok()?;
        let (body, checksum) = data.split_at(FRIENDLY_LEN - 2);
        if CHECKSUM.checksum(body) != u16::from_be_bytes([checksum[0], checksum[1]]) {
            return None;
        }

        let form = Form::from_tag(body[0])?;
        let mut account_id = [0u8; 32];
        account_id.copy_from_slice(&body[2..]);

        Some(Self { workchain: body[1] as i8 as i32, account_id, form })
    }
}

impl FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.split_once(':') {
            Some((workchain, account_id)) => Self::parse_raw(workchain, account_id),
            None => Self::parse_friendly(s)
        };

        parsed.ok_or_else(|| CodecError::InvalidAddressFormat(s.to_owned()))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.form {
            Form::Raw => f.write_str(&self.to_raw_string()),
            Form::Friendly { .. } => f.write_str(&self.to_friendly_string())
        }
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_raw_string())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use crate::address::{Address, Form};

    #[test]
    fn address_friendly_correct() {
        assert!(Address::from_str("EQBO_mAVkaHxt6Ibz7wqIJ_UIDmxZBFcgkk7fvIzkh7l42wO").is_ok())
    }

    #[test]
    fn address_base64_fail() {
        assert!(Address::from_str("YXNkcXdl").is_err());
        assert!(Address::from_str("badaddress").is_err());
    }

    #[test]
    fn address_checksum_mismatch() {
        assert!(Address::from_str("EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GEMT").is_err());
    }

    #[test]
    fn address_raw() {
        let address = Address::from_str("-1:a3935861f79daf59a13d6d182e1640210c02f98e3df18fda74b8f5ab141abf18").unwrap();
        assert_eq!(address.workchain, -1);

        let address = Address::from_str("0:A3935861F79DAF59A13D6D182E1640210C02F98E3DF18FDA74B8F5AB141ABF18").unwrap();
        assert_eq!(address.to_raw_string(), "0:a3935861f79daf59a13d6d182e1640210c02f98e3df18fda74b8f5ab141abf18");

        assert!(Address::from_str("-1:0:a3935861f79daf59a13d6d182e1640210c02f98e3df18fda74b8f5ab141abf18").is_err());
    }

    #[test]
    fn address_friendly_roundtrip() {
        assert_eq!(Address::from_str("EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GEMS").unwrap().bounceable().to_friendly_string(), "EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GEMS");
        assert_eq!(Address::from_str("EQB5HQfjevz9su4ZQGcDT_4IB0IUGh5PM2vAXPU2e4O6_d2j").unwrap().bounceable().to_friendly_string(), "EQB5HQfjevz9su4ZQGcDT_4IB0IUGh5PM2vAXPU2e4O6_d2j")
    }

    #[test]
    fn address_non_bounceable() {
        assert_eq!(Address::from_str("EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GEMS").unwrap().non_bounceable().to_friendly_string(), "UQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GB7X");
    }

    #[test]
    fn address_keeps_testnet_and_unknown_tags_fail() {
        let testnet = Address::from_str("kQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GPiY").unwrap();

        assert_eq!(testnet.form, Form::Friendly { bounceable: true, testnet: true });
        assert_eq!(testnet.to_string(), "kQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GPiY");
        assert_eq!(testnet.workchain, 0);

        let mut data = base64::Engine::decode(&base64::engine::general_purpose::URL_SAFE, "EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GEMS").unwrap();
        data[0] = 0x22;
        let crc = crc::Crc::<u16>::new(&crc::CRC_16_XMODEM).checksum(&data[..34]);
        data[34..].copy_from_slice(&crc.to_be_bytes());
        let unknown = base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE, data);

        assert!(Address::from_str(&unknown).is_err());
    }

    #[test]
    fn address_optional() {
        assert_eq!(Address::parse_optional(None).unwrap(), None);
        assert_eq!(Address::parse_optional(Some("")).unwrap(), None);
        assert!(Address::parse_optional(Some("EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GEMS")).unwrap().is_some());
    }
}
