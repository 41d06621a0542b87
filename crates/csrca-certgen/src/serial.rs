//! Certificate serial numbers.

use rcgen::SerialNumber;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::CertgenError;

/// Width of a generated serial number in bytes (128 bits).
pub const SERIAL_LEN: usize = 16;

/// Draw a fresh 128-bit serial number from the system CSPRNG.
pub fn random_serial() -> Result<SerialNumber, CertgenError> {
    let mut bytes = [0u8; SERIAL_LEN];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| CertgenError::IssuanceFailed("random source unavailable".to_string()))?;
    Ok(SerialNumber::from_slice(&bytes))
}
