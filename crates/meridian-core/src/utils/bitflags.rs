// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Declares small, `Copy` flag sets over an unsigned integer.
//!
//! Only the operations the runtime needs are generated: no iteration and no
//! parsing. Bits outside the declared flags can be kept with
//! `from_bits_retain` and show up as `UNKNOWN(..)` when debug-printed.

#[macro_export]
#[doc(hidden)]
macro_rules! meridian_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $name($ty);

        impl $name {
            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self($flag_value);
            )*

            /// No flag set.
            pub const EMPTY: Self = Self(0);

            /// Every declared flag.
            pub const ALL: Self = Self(0 $(| $flag_value)*);

            /// Keeps the declared flags of `bits` and drops the rest.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self(bits & Self::ALL.0)
            }

            /// Takes `bits` as is, undeclared bits included.
            pub const fn from_bits_retain(bits: $ty) -> Self {
                Self(bits)
            }

            /// The underlying integer.
            pub const fn bits(&self) -> $ty {
                self.0
            }

            /// `true` when no bit is set.
            pub const fn is_empty(&self) -> bool {
                self.0 == 0
            }

            /// `true` when every bit of `other` is set in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// `true` when `self` and `other` share a bit.
            pub const fn intersects(&self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            /// Sets the bits of `other`.
            pub fn insert(&mut self, other: Self) {
                *self |= other;
            }

            /// Clears the bits of `other`.
            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut names: ::std::vec::Vec<::std::string::String> = ::std::vec::Vec::new();
                let mut rest = self.0;
                $(
                    if $flag_value != 0 && self.0 & $flag_value == $flag_value {
                        names.push(stringify!($flag_name).into());
                        rest &= !$flag_value;
                    }
                )*
                if rest != 0 {
                    names.push(format!("UNKNOWN({:#x})", rest));
                }
                if names.is_empty() {
                    names.push("EMPTY".into());
                }
                write!(f, "{} {{ {} }}", stringify!($name), names.join(" | "))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::meridian_bitflags;

    meridian_bitflags! {
        /// Flags used only to exercise the macro.
        pub struct IdleFlags: u8 {
            const SPIN = 1 << 0;
            const PARK = 1 << 1;
            const STEAL = 1 << 2;
        }
    }

    #[test]
    fn test_empty_debug_output() {
        assert_eq!(format!("{:?}", IdleFlags::EMPTY), "IdleFlags { EMPTY }");
        assert!(IdleFlags::EMPTY.is_empty());
    }

    #[test]
    fn test_insert_remove_contains() {
        let mut flags = IdleFlags::SPIN;
        flags.insert(IdleFlags::STEAL);
        assert!(flags.contains(IdleFlags::SPIN | IdleFlags::STEAL));
        assert!(!flags.contains(IdleFlags::PARK));

        flags.remove(IdleFlags::SPIN);
        assert_eq!(flags, IdleFlags::STEAL);
        assert!(flags.intersects(IdleFlags::STEAL | IdleFlags::PARK));
    }

    #[test]
    fn test_truncate_drops_undeclared_bits() {
        let flags = IdleFlags::from_bits_truncate(0xF2);
        assert_eq!(flags, IdleFlags::PARK);
        assert_eq!(IdleFlags::ALL.bits(), 0x07);
    }

    #[test]
    fn test_retained_unknown_bits_are_reported() {
        let flags = IdleFlags::PARK | IdleFlags::from_bits_retain(0x40);
        assert_eq!(flags.bits(), 0x42);
        assert_eq!(format!("{:?}", flags), "IdleFlags { PARK | UNKNOWN(0x40) }");
    }
}
