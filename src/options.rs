use std::ops::{BitOr, BitOrAssign};

macro_rules! option_set {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(u32);

        impl $name {
            pub const NONE: Self = Self(0);

            pub const fn from_bits(bits: u32) -> Self {
                Self(bits)
            }

            pub const fn bits(self) -> u32 {
                self.0
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            pub fn set(&mut self, other: Self, enabled: bool) {
                if enabled {
                    self.0 |= other.0;
                } else {
                    self.0 &= !other.0;
                }
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

option_set!(
    /// Strictness of the DOM builder.
    ParseOptions
);

impl ParseOptions {
    pub const SKIP_INVALID_ATTRIBUTES: Self = Self(1);
    pub const SKIP_INVALID_ELEMENTS: Self = Self(2);
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::SKIP_INVALID_ELEMENTS
    }
}

option_set!(
    /// Flags consumed by the command generator.
    ///
    /// Bits 8..=15 are reserved for backend-specific toggles; `COMMAND_LINE`
    /// is the first of them and only changes diagnostic hint text.
    RenderOptions
);

impl RenderOptions {
    pub const HIDE_UNSUPPORTED_FILTERS: Self = Self(1 << 0);
    pub const DISABLE_TRANSPARENCY_LAYERS: Self = Self(1 << 1);
    pub const RESERVED: Self = Self(0xFF00);
    pub const COMMAND_LINE: Self = Self(1 << 8);

    const KNOWN: u32 = Self::HIDE_UNSUPPORTED_FILTERS.0 | Self::DISABLE_TRANSPARENCY_LAYERS.0;

    /// A backend-private bit inside the reserved range; `index` 1..=7 maps to bits 9..=15.
    pub const fn backend(index: u8) -> Option<Self> {
        if index == 0 || index > 7 {
            return None;
        }
        Some(Self(1 << (8 + index as u32)))
    }

    /// Bits that are neither defined flags nor in the reserved range.
    pub const fn unknown_bits(self) -> u32 {
        self.0 & !(Self::KNOWN | Self::RESERVED.0)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::NONE
    }
}

option_set!(
    /// Passes run by the command optimizer.
    OptimizerOptions
);

impl OptimizerOptions {
    pub const SKIP_REDUNDANT_STATE: Self = Self(1);
    pub const SKIP_INITIAL_SAVE_STATE: Self = Self(2);
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self::SKIP_REDUNDANT_STATE
    }
}
