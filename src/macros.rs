//! # Internal Macros
//!
//! Boilerplate reduction for the on-disk header structs.
//!
//! ## zerocopy_accessors!
//!
//! Generates getter and setter methods for zerocopy struct fields. Multi-byte
//! fields use the little-endian wrapper types (`U32`), single-byte fields are
//! plain `u8`.
//!
//! ### Usage
//!
//! ```ignore
//! use zerocopy::little_endian::U32;
//!
//! #[repr(C)]
//! struct Header {
//!     node_type: u8,
//!     parent: U32,
//! }
//!
//! impl Header {
//!     zerocopy_accessors! {
//!         node_type: u8,
//!         parent: u32,
//!     }
//! }
//!
//! // Generates:
//! // pub fn node_type(&self) -> u8 { self.node_type }
//! // pub fn set_node_type(&mut self, val: u8) { self.node_type = val; }
//! // pub fn parent(&self) -> u32 { self.parent.get() }
//! // pub fn set_parent(&mut self, val: u32) { self.parent = U32::new(val); }
//! ```

/// Generates getter and setter methods for on-disk header fields.
#[macro_export]
macro_rules! zerocopy_accessors {
    (@impl $field:ident, u8) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> u8 {
                self.$field
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: u8) {
                self.$field = val;
            }
        }
    };
    (@impl $field:ident, u32) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> u32 {
                self.$field.get()
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: u32) {
                self.$field = ::zerocopy::little_endian::U32::new(val);
            }
        }
    };
    ($($field:ident : $ty:tt),* $(,)?) => {
        $(
            $crate::zerocopy_accessors!(@impl $field, $ty);
        )*
    };
}
