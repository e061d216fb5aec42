//! Primary-key newtypes.
//!
//! Cart lines are keyed by the catalog's integer primary key. Wrapping it keeps
//! a product key from being confused with a quantity or any other integer
//! passing through the cart API.

/// Define an `i32` primary-key newtype.
///
/// The generated type serializes as a bare integer, so it can sit directly in
/// a stored line key (`{"_pk": 7}`), and parses from its decimal text so it can
/// be taken as a command-line argument. It is ordered, which lets a set of
/// keys be queried in a stable order.
///
/// # Example
///
/// ```rust
/// # use carton_core::define_id;
/// define_id!(VariantId);
///
/// let id: VariantId = " 7 ".parse().unwrap();
/// assert_eq!(id, VariantId::new(7));
/// assert_eq!(serde_json::to_string(&id).unwrap(), "7");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw primary key.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw primary key.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Primary key of a catalog product.
define_id!(ProductId);
