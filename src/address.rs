//! Backpack address discovery.
//!
//! PCF8574 backpacks ship at `0x27` (PCF8574T) or `0x3F` (PCF8574AT), with
//! solder jumpers moving them within their 8-address block. When no
//! address is configured the bus is scanned and the common defaults win.

use embedded_hal_async::i2c::I2c;
use heapless::Vec;

use crate::commands::PREFERRED_ADDRESSES;
use crate::error::LcdError;

/// First non-reserved 7-bit address.
const FIRST_ADDRESS: u8 = 0x08;

/// Last non-reserved 7-bit address.
const LAST_ADDRESS: u8 = 0x77;

/// Number of addresses a scan can report.
pub const SCAN_CAPACITY: usize = (LAST_ADDRESS - FIRST_ADDRESS + 1) as usize;

/// Addresses that acknowledged a probe, in ascending order.
pub type ScanResult = Vec<u8, SCAN_CAPACITY>;

/// Probe every non-reserved address with a zero-length write.
///
/// An ACK means a device is present. Probe failures are the expected
/// answer for empty addresses and are not reported.
pub async fn scan<I2C: I2c>(i2c: &mut I2C) -> ScanResult {
    let mut found = ScanResult::new();
    for address in FIRST_ADDRESS..=LAST_ADDRESS {
        if i2c.write(address, &[]).await.is_ok() {
            // Capacity covers the whole probed range.
            let _ = found.push(address);
        }
    }
    found
}

/// Pick the backpack address.
///
/// An explicit `candidate` is used as-is. Otherwise the first of
/// [`PREFERRED_ADDRESSES`] present in `found` wins, then the first
/// address found.
///
/// # Errors
/// [`LcdError::DeviceNotFound`] if no candidate was given and `found` is
/// empty.
pub fn resolve<E>(candidate: Option<u8>, found: &[u8]) -> Result<u8, LcdError<E>> {
    if let Some(address) = candidate {
        return Ok(address);
    }
    if found.is_empty() {
        return Err(LcdError::DeviceNotFound);
    }

    let address = PREFERRED_ADDRESSES
        .iter()
        .copied()
        .find(|preferred| found.contains(preferred))
        .unwrap_or(found[0]);
    Ok(address)
}

/// Resolve the address, scanning the bus only when no candidate is given.
pub async fn detect<I2C: I2c>(
    i2c: &mut I2C,
    candidate: Option<u8>,
) -> Result<u8, LcdError<I2C::Error>> {
    if candidate.is_some() {
        return resolve(candidate, &[]);
    }

    let found = scan(i2c).await;

    #[cfg(feature = "defmt")]
    defmt::debug!("I2C scan found {} device(s)", found.len());

    resolve(None, &found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{scan_sequence, I2cMock};
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::ErrorKind;

    fn pick(candidate: Option<u8>, found: &[u8]) -> Result<u8, LcdError<ErrorKind>> {
        resolve(candidate, found)
    }

    #[test]
    fn explicit_candidate_wins_without_scan_results() {
        assert_eq!(pick(Some(0x20), &[]).unwrap(), 0x20);
        assert_eq!(pick(Some(0x20), &[0x27]).unwrap(), 0x20);
    }

    #[test]
    fn empty_scan_is_device_not_found() {
        assert!(matches!(pick(None, &[]), Err(LcdError::DeviceNotFound)));
    }

    #[test]
    fn preference_order_is_0x27_then_0x3f_then_first() {
        assert_eq!(pick(None, &[0x10, 0x3F, 0x27]).unwrap(), 0x27);
        assert_eq!(pick(None, &[0x10, 0x3F]).unwrap(), 0x3F);
        assert_eq!(pick(None, &[0x21, 0x50]).unwrap(), 0x21);
    }

    #[test]
    fn scan_reports_acking_addresses_in_order() {
        let mut i2c = I2cMock::new(&scan_sequence(&[0x3F, 0x3C, 0x27]));
        let found = block_on(scan(&mut i2c));
        assert_eq!(found.as_slice(), &[0x27, 0x3C, 0x3F]);
        i2c.done();
    }

    #[test]
    fn detect_with_candidate_does_not_touch_the_bus() {
        let mut i2c = I2cMock::new(&[]);
        let address = block_on(detect(&mut i2c, Some(0x3F))).unwrap();
        assert_eq!(address, 0x3F);
        i2c.done();
    }

    #[test]
    fn detect_scans_when_no_candidate() {
        let mut i2c = I2cMock::new(&scan_sequence(&[0x3F]));
        assert_eq!(block_on(detect(&mut i2c, None)).unwrap(), 0x3F);
        i2c.done();

        let mut empty = I2cMock::new(&scan_sequence(&[]));
        assert!(matches!(
            block_on(detect(&mut empty, None)),
            Err(LcdError::DeviceNotFound)
        ));
        empty.done();
    }
}
