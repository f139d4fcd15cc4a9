//! # Row Serialization
//!
//! Maps a `Row` to and from its fixed 293-byte slot inside a leaf cell:
//!
//! ```text
//! Offset  Size  Field
//! 0       4     id (u32, little-endian)
//! 4       33    username (NUL-padded)
//! 37      256   email (NUL-padded)
//! ```
//!
//! Both string slots are written in full, trailing bytes zeroed, so
//! serializing the same row always produces the same bytes and a persisted
//! page is byte-identical to a freshly written one. Length limits are
//! enforced upstream by the statement parser; `serialize` only ever sees
//! rows that fit.

use eyre::{ensure, Result};

use crate::config::{
    EMAIL_MAX_LEN, EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ROW_SIZE, USERNAME_MAX_LEN,
    USERNAME_OFFSET, USERNAME_SIZE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    pub fn new(id: u32, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    /// Writes the row into a leaf cell's value slot.
    pub fn serialize(&self, dest: &mut [u8]) -> Result<()> {
        ensure!(
            dest.len() == ROW_SIZE,
            "row slot has wrong size: {} != {}",
            dest.len(),
            ROW_SIZE
        );
        ensure!(
            self.username.len() <= USERNAME_MAX_LEN,
            "username exceeds {} bytes",
            USERNAME_MAX_LEN
        );
        ensure!(
            self.email.len() <= EMAIL_MAX_LEN,
            "email exceeds {} bytes",
            EMAIL_MAX_LEN
        );

        dest[ID_OFFSET..ID_OFFSET + 4].copy_from_slice(&self.id.to_le_bytes());
        write_padded(
            &mut dest[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE],
            self.username.as_bytes(),
        );
        write_padded(
            &mut dest[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE],
            self.email.as_bytes(),
        );

        Ok(())
    }

    /// Reads a row back out of a leaf cell's value slot.
    pub fn deserialize(src: &[u8]) -> Result<Self> {
        ensure!(
            src.len() == ROW_SIZE,
            "row slot has wrong size: {} != {}",
            src.len(),
            ROW_SIZE
        );

        let mut id_bytes = [0u8; 4];
        id_bytes.copy_from_slice(&src[ID_OFFSET..ID_OFFSET + 4]);

        Ok(Self {
            id: u32::from_le_bytes(id_bytes),
            username: read_padded(&src[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]),
            email: read_padded(&src[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]),
        })
    }
}

fn write_padded(slot: &mut [u8], value: &[u8]) {
    slot[..value.len()].copy_from_slice(value);
    slot[value.len()..].fill(0);
}

fn read_padded(slot: &[u8]) -> String {
    let len = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    String::from_utf8_lossy(&slot[..len]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let row = Row::new(42, "alice", "alice@example.com");
        let mut slot = [0u8; ROW_SIZE];

        row.serialize(&mut slot).unwrap();
        let back = Row::deserialize(&slot).unwrap();

        assert_eq!(back, row);
    }

    #[test]
    fn serialization_is_deterministic() {
        let row = Row::new(7, "bob", "b@x");
        let mut a = [0xFFu8; ROW_SIZE];
        let mut b = [0u8; ROW_SIZE];

        row.serialize(&mut a).unwrap();
        row.serialize(&mut b).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn fixed_offsets() {
        let row = Row::new(0x01020304, "u", "e");
        let mut slot = [0u8; ROW_SIZE];
        row.serialize(&mut slot).unwrap();

        assert_eq!(&slot[..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(slot[USERNAME_OFFSET], b'u');
        assert_eq!(slot[USERNAME_OFFSET + 1], 0);
        assert_eq!(slot[EMAIL_OFFSET], b'e');
        assert_eq!(slot[EMAIL_OFFSET + 1], 0);
    }

    #[test]
    fn maximum_length_strings_fit() {
        let row = Row::new(1, "a".repeat(32), "b".repeat(255));
        let mut slot = [0u8; ROW_SIZE];

        row.serialize(&mut slot).unwrap();
        let back = Row::deserialize(&slot).unwrap();

        assert_eq!(back.username.len(), 32);
        assert_eq!(back.email.len(), 255);
        assert_eq!(back, row);
    }

    #[test]
    fn oversized_strings_rejected() {
        let mut slot = [0u8; ROW_SIZE];

        let row = Row::new(1, "a".repeat(33), "b@x");
        assert!(row.serialize(&mut slot).is_err());

        let row = Row::new(1, "a", "b".repeat(256));
        assert!(row.serialize(&mut slot).is_err());
    }

    #[test]
    fn wrong_slot_size_rejected() {
        let row = Row::new(1, "a", "b");
        let mut short = [0u8; ROW_SIZE - 1];

        assert!(row.serialize(&mut short).is_err());
        assert!(Row::deserialize(&short).is_err());
    }
}
