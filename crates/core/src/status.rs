//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table, and each variant's
//! name string matches the seeded `name` column used in API payloads.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $str:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Return the seeded status name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $str ),+
                }
            }

            /// Look up a variant by its database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Parse a status name as it appears in API payloads.
            pub fn parse(name: &str) -> Option<Self> {
                match name {
                    $( $str => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Calendar slot availability status.
    ///
    /// `SwapPending` is never set directly by users; only the swap engine
    /// moves slots in and out of it.
    SlotStatus {
        Busy = 1 => "BUSY",
        Swappable = 2 => "SWAPPABLE",
        SwapPending = 3 => "SWAP_PENDING",
    }
}

define_status_enum! {
    /// Swap request lifecycle status. `Accepted` and `Rejected` are terminal.
    SwapRequestStatus {
        Pending = 1 => "PENDING",
        Accepted = 2 => "ACCEPTED",
        Rejected = 3 => "REJECTED",
    }
}
