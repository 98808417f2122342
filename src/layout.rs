//! Control table layouts.
//!
//! A [`TableLayout`] says which contiguous register window of a device
//! class is mirrored in memory, and where named fields sit inside it.
//! Register numbers are control table addresses; mirror offsets are
//! computed from them here and nowhere else.

use core::ops::Range;

/// Width of a control table field. Words are little endian.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Width {
    Byte,
    Word,
}

impl Width {
    pub const fn len(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
        }
    }
}

/// A named register, or register pair, in a control table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub address: u8,
    pub width: Width,
}

impl Field {
    pub const fn byte(name: &'static str, address: u8) -> Self {
        Self {
            name,
            address,
            width: Width::Byte,
        }
    }

    pub const fn word(name: &'static str, address: u8) -> Self {
        Self {
            name,
            address,
            width: Width::Word,
        }
    }

    /// Address of the last register covered by the field, `None` for a
    /// word that would run past register 0xFF.
    pub const fn last(&self) -> Option<u8> {
        self.address.checked_add(self.width.len() as u8 - 1)
    }
}

/// Register window and fields tracked for one device class.
#[derive(Debug, PartialEq, Eq)]
pub struct TableLayout {
    pub name: &'static str,
    /// Expected content of the model number register.
    pub model_number: u16,
    /// First mirrored register.
    pub first: u8,
    /// Last mirrored register, inclusive.
    pub last: u8,
    pub fields: &'static [Field],
}

/// Largest register window a layout may track.
pub const MAX_SPAN: usize = 64;

impl TableLayout {
    /// Bytes in the mirror. Zero if `last` is below `first`.
    pub const fn span(&self) -> usize {
        (self.last as usize + 1).saturating_sub(self.first as usize)
    }

    /// Mirror offset of `register`, if it is tracked.
    pub fn offset_of(&self, register: u8) -> Option<usize> {
        if (self.first..=self.last).contains(&register) {
            Some(usize::from(register - self.first))
        } else {
            None
        }
    }

    /// Mirror byte range for the registers `first..=last`.
    pub fn window(&self, first: u8, last: u8) -> Option<Range<usize>> {
        if first > last {
            return None;
        }
        let start = self.offset_of(first)?;
        let end = self.offset_of(last)? + 1;
        Some(start..end)
    }

    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: [Field; 2] = [Field::byte("led", 0x19), Field::word("goal", 0x1E)];

    const LAYOUT: TableLayout = TableLayout {
        name: "test",
        model_number: 0x0C,
        first: 0x18,
        last: 0x29,
        fields: &FIELDS,
    };

    #[test]
    fn test_offsets() {
        assert_eq!(LAYOUT.span(), 18);
        assert_eq!(LAYOUT.offset_of(0x18), Some(0));
        assert_eq!(LAYOUT.offset_of(0x29), Some(17));
        assert_eq!(LAYOUT.offset_of(0x17), None);
        assert_eq!(LAYOUT.offset_of(0x2A), None);
    }

    #[test]
    fn test_window() {
        assert_eq!(LAYOUT.window(0x1E, 0x1F), Some(6..8));
        assert_eq!(LAYOUT.window(0x18, 0x29), Some(0..18));
        assert_eq!(LAYOUT.window(0x1F, 0x1E), None);
        assert_eq!(LAYOUT.window(0x10, 0x1E), None);
        assert_eq!(LAYOUT.window(0x1E, 0x30), None);
    }

    #[test]
    fn test_fields() {
        let goal = LAYOUT.field("goal").unwrap();
        assert_eq!(goal.address, 0x1E);
        assert_eq!(goal.last(), Some(0x1F));
        assert_eq!(LAYOUT.field("led").unwrap().last(), Some(0x19));
        assert!(LAYOUT.field("nope").is_none());
    }

    #[test]
    fn test_edges_of_the_register_space() {
        assert_eq!(Field::word("top", 0xFF).last(), None);
        assert_eq!(Field::byte("top", 0xFF).last(), Some(0xFF));
        assert_eq!(Field::word("top", 0xFE).last(), Some(0xFF));

        let inverted = TableLayout {
            name: "inverted",
            model_number: 0,
            first: 0x20,
            last: 0x10,
            fields: &[],
        };
        assert_eq!(inverted.span(), 0);
        assert_eq!(inverted.offset_of(0x18), None);
        assert_eq!(inverted.window(0x10, 0x20), None);

        let whole = TableLayout {
            name: "whole",
            model_number: 0,
            first: 0x00,
            last: 0xFF,
            fields: &[],
        };
        assert_eq!(whole.span(), 256);
    }
}
