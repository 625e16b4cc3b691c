// src/client/signature.rs - Request signatures checked by the server
use md5::{Digest, Md5};

/// Stands in for the client public key in verification signatures.
pub const VERIFICATION_KEY_PLACEHOLDER: &str = "dataSource.getPubKey()";

/// The verification signature deployed clients send: the MD5 of an empty
/// string. The service accepts exactly this value.
pub const DEPLOYED_VERIFICATION_SIGNATURE: &str = "d41d8cd98f00b204e9800998ecf8427e";

pub fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

pub fn registration_signature(
    guid: &str,
    serial_number: &str,
    birth_date: &str,
    date_of_expiry: &str,
    public_key: &str,
) -> String {
    md5_hex(&[guid, serial_number, birth_date, date_of_expiry, public_key].concat())
}

/// Signature for a verification request.
///
/// Known issue: the signed input is assembled from `guid`, `scanner_serial`,
/// `device_id` and [`VERIFICATION_KEY_PLACEHOLDER`] but never hashed, so every
/// deployed client signs the empty string. Kept bit-compatible with them.
pub fn verification_signature(guid: &str, scanner_serial: &str, device_id: &str) -> String {
    let _unsigned = [guid, scanner_serial, device_id, VERIFICATION_KEY_PLACEHOLDER].concat();
    md5_hex("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_known_vectors() {
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_registration_signature_is_concatenation_hash() {
        let sig = registration_signature("g", "AA1234567", "01.02.1990", "01.02.2030", "k");
        assert_eq!(sig, md5_hex("gAA123456701.02.199001.02.2030k"));
        assert_eq!(sig.len(), 32);
    }

    #[test]
    fn test_verification_signature_matches_deployed_clients() {
        let sig = verification_signature("g", "SC1", "dev");
        assert_eq!(sig, DEPLOYED_VERIFICATION_SIGNATURE);
        assert_eq!(sig, md5_hex(""));
        assert_ne!(sig, md5_hex("gSC1devdataSource.getPubKey()"));
    }
}
