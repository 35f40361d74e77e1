//! "Looks-real" replacement policy: semantically plausible values instead of
//! arbitrary random bytes.

use fake::faker::address::en::CountryName;
use fake::faker::internet::en::{FreeEmail, IPv4, IPv6, MACAddress, UserAgent};
use fake::faker::name::en::Name;
use fake::faker::name::zh_cn::Name as ChineseName;
use fake::Fake;
use rand::Rng;
use uuid::Uuid;

use crate::replacer::document::{random_json, random_xml, DocumentOpts};
use crate::replacer::gauss::simple_gaussian;
use crate::replacer::ReplacerError;

/// Semantic-data kinds. The method is kept as a free-form string so that an
/// unrecognized kind surfaces at render time as
/// [`ReplacerError::UnknownMethod`], which callers log and skip.
pub const IPV4: &str = "ipv4";
pub const IPV4_CHINA: &str = "ipv4-china";
pub const IPV6: &str = "ipv6";
pub const MAC: &str = "mac";
pub const USER_AGENT: &str = "user-agent";
pub const COUNTRY: &str = "country";
pub const EMAIL: &str = "email";
pub const NAME: &str = "name";
pub const NAME_CN: &str = "name-cn";
pub const CELLPHONE_CN: &str = "cellphone-cn";
pub const UUID_V4: &str = "uuid";
pub const XML: &str = "xml";
pub const JSON: &str = "json";

/// IPv4 ranges allocated to Chinese carriers, as `[first, last]` pairs of
/// big-endian address values.
const CHINA_IPV4_BLOCKS: [[u32; 2]; 10] = [
    [0x24380000, 0x243FFFFF], // 36.56.0.0   - 36.63.255.255
    [0x3DE80000, 0x3DEDFFFF], // 61.232.0.0  - 61.237.255.255
    [0x6A500000, 0x6A5FFFFF], // 106.80.0.0  - 106.95.255.255
    [0x794C0000, 0x794DFFFF], // 121.76.0.0  - 121.77.255.255
    [0x7BE80000, 0x7BEBFFFF], // 123.232.0.0 - 123.235.255.255
    [0x8BC40000, 0x8BD7FFFF], // 139.196.0.0 - 139.215.255.255
    [0xAB080000, 0xAB0FFFFF], // 171.8.0.0   - 171.15.255.255
    [0xB6500000, 0xB65CFFFF], // 182.80.0.0  - 182.92.255.255
    [0xD2190000, 0xD22FFFFF], // 210.25.0.0  - 210.47.255.255
    [0xDE100000, 0xDE5FFFFF], // 222.16.0.0  - 222.95.255.255
];

/// Chinese mobile number prefixes.
const CHINA_CELL_PREFIXES: [&str; 41] = [
    "130", "131", "132", "133", "134", "135", "136", "137", "138", "139", "141", "145", "146",
    "147", "148", "149", "150", "151", "152", "153", "155", "156", "157", "158", "159", "166",
    "173", "174", "175", "176", "177", "178", "180", "181", "182", "183", "184", "185", "186",
    "187", "188",
];

/// Dispatches on a semantic kind to produce a plausible value.
#[derive(Debug, Clone)]
pub struct LooksRealReplacer {
    method: String,
    // Only consulted by the xml/json kinds.
    opts: DocumentOpts,
}

impl LooksRealReplacer {
    pub fn new(method: &str, opts: DocumentOpts) -> Self {
        Self {
            method: method.to_string(),
            opts,
        }
    }

    pub fn render<R: Rng>(&mut self, rng: &mut R) -> Result<String, ReplacerError> {
        let value = match self.method.as_str() {
            IPV4 => IPv4().fake_with_rng(rng),
            IPV4_CHINA => random_china_ip(rng),
            IPV6 => IPv6().fake_with_rng(rng),
            MAC => MACAddress().fake_with_rng(rng),
            USER_AGENT => UserAgent().fake_with_rng(rng),
            COUNTRY => CountryName().fake_with_rng(rng),
            EMAIL => FreeEmail().fake_with_rng(rng),
            NAME => Name().fake_with_rng(rng),
            NAME_CN => ChineseName().fake_with_rng(rng),
            CELLPHONE_CN => random_china_cellphone(rng),
            UUID_V4 => Uuid::new_v4().to_string(),
            XML => random_xml(rng, &self.opts),
            JSON => random_json(rng, &self.opts),
            other => return Err(ReplacerError::UnknownMethod(other.to_string())),
        };
        Ok(value)
    }
}

/// Pick a random address from the Chinese carrier blocks.
fn random_china_ip<R: Rng>(rng: &mut R) -> String {
    let block = CHINA_IPV4_BLOCKS[simple_gaussian(rng, CHINA_IPV4_BLOCKS.len())];
    let offset = simple_gaussian(rng, (block[1] - block[0]) as usize) as u32;
    let n = block[0] + offset;
    format!(
        "{}.{}.{}.{}",
        (n >> 24) & 0xff,
        (n >> 16) & 0xff,
        (n >> 8) & 0xff,
        n & 0xff
    )
}

/// A Chinese mobile number: carrier prefix plus eight digits.
fn random_china_cellphone<R: Rng>(rng: &mut R) -> String {
    let prefix = CHINA_CELL_PREFIXES[simple_gaussian(rng, CHINA_CELL_PREFIXES.len())];
    format!("{prefix}{:08}", rng.gen_range(0..100_000_000u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn render(method: &str) -> Result<String, ReplacerError> {
        let mut rng = StdRng::seed_from_u64(42);
        LooksRealReplacer::new(method, DocumentOpts::default()).render(&mut rng)
    }

    fn is_dotted_quad(s: &str) -> bool {
        let octets: Vec<&str> = s.split('.').collect();
        octets.len() == 4 && octets.iter().all(|o| o.parse::<u8>().is_ok())
    }

    #[test]
    fn test_ipv4_is_a_dotted_quad() {
        assert!(is_dotted_quad(&render(IPV4).unwrap()));
    }

    #[test]
    fn test_china_ipv4_is_in_a_seeded_block() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let s = random_china_ip(&mut rng);
            assert!(is_dotted_quad(&s), "{s} is not an IPv4 address");

            let n = s
                .split('.')
                .map(|o| o.parse::<u32>().unwrap())
                .fold(0u32, |acc, o| (acc << 8) | o);
            assert!(
                CHINA_IPV4_BLOCKS
                    .iter()
                    .any(|b| (b[0]..=b[1]).contains(&n)),
                "{s} is not inside any seeded block"
            );
        }
    }

    #[test]
    fn test_china_cellphone_shape() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let s = random_china_cellphone(&mut rng);
            assert_eq!(s.len(), 11);
            assert!(s.chars().all(|c| c.is_ascii_digit()));
            assert!(CHINA_CELL_PREFIXES.contains(&&s[..3]));
        }
    }

    #[test]
    fn test_uuid_parses() {
        let s = render(UUID_V4).unwrap();
        assert!(Uuid::parse_str(&s).is_ok());
    }

    #[test]
    fn test_mac_shape() {
        let s = render(MAC).unwrap();
        assert_eq!(s.split(':').count(), 6);
    }

    #[test]
    fn test_unknown_method_is_an_error() {
        let err = render("quantum-flux").unwrap_err();
        assert!(matches!(err, ReplacerError::UnknownMethod(m) if m == "quantum-flux"));
    }
}
