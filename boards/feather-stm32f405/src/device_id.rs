#![deny(unsafe_code)]
//! Device identity derived from the STM32F405 96-bit unique ID
//!
//! The UID is factory-programmed and stable across reboots, so the MAC
//! address and network stack seed built from it are stable too.

/// Raw 12-byte unique device ID
pub fn uid() -> &'static [u8; 12] {
    embassy_stm32::uid::uid()
}

/// UID as a 24-character hex string
pub fn uid_hex() -> &'static str {
    embassy_stm32::uid::uid_hex()
}

/// Locally administered unicast MAC for this chip
pub fn mac_address() -> [u8; 6] {
    mac_from_uid(uid())
}

/// Seed for the network stack's port and sequence randomisation
pub fn stack_seed() -> u64 {
    let uid = uid();
    let mut lo = [0u8; 8];
    lo.copy_from_slice(&uid[..8]);
    let mut hi = [0u8; 4];
    hi.copy_from_slice(&uid[8..]);
    u64::from_le_bytes(lo) ^ (u64::from(u32::from_le_bytes(hi)) << 17)
}

/// Fold a UID into a MAC address
///
/// The first octet is fixed at 0x02 (locally administered, unicast); the
/// other five are the UID folded by XOR.
pub fn mac_from_uid(uid: &[u8; 12]) -> [u8; 6] {
    let mut mac = [0x02, 0, 0, 0, 0, 0];
    for (i, byte) in uid.iter().enumerate() {
        mac[1 + i % 5] ^= byte;
    }
    mac
}
