//! Macros for defining kind enums.

/// Defines a fieldless enum stored as a `SMALLINT` and spelled in
/// `SCREAMING_SNAKE_CASE` when displayed, parsed or serialized.
///
/// # Example
///
/// ```rust
/// # use common::define_kind;
///
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube = 1,
///
///         #[doc = "A sphere"]
///         Sphere = 2,
///     }
/// }
///
/// assert_eq!(Kind::ALL, [Kind::Cube, Kind::Sphere]);
/// assert_eq!(Kind::try_from(2), Ok(Kind::Sphere));
/// assert_eq!(Kind::Sphere.to_string(), "SPHERE");
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            PartialEq,
        )]
        #[cfg_attr(
            feature = "serde",
            derive(
                $crate::private::serde::Deserialize,
                $crate::private::serde::Serialize,
            ),
            serde(rename_all = "SCREAMING_SNAKE_CASE"),
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                #[doc = $variant_doc]
                $variant = $value,
            )*
        }

        impl $name {
            /// All the variants, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Returns the stored representation of this variant.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }
        }

        impl ::core::convert::TryFrom<u8> for $name {
            type Error = u8;

            fn try_from(v: u8) -> ::core::result::Result<Self, u8> {
                Self::ALL.iter().copied().find(|k| k.u8() == v).ok_or(v)
            }
        }

        #[cfg(feature = "postgres")]
        const _: () = {
            use ::std::{boxed::Box, error::Error};

            use $crate::private::postgres_types::{
                accepts, private::BytesMut, to_sql_checked, FromSql, IsNull,
                ToSql, Type,
            };

            type BoxError = Box<dyn Error + Send + Sync>;

            impl<'a> FromSql<'a> for $name {
                accepts!(INT2);

                fn from_sql(
                    ty: &Type,
                    raw: &[u8],
                ) -> ::core::result::Result<Self, BoxError> {
                    let v = u8::try_from(i16::from_sql(ty, raw)?)?;
                    Self::try_from(v).map_err(|v| {
                        ::std::format!(
                            "unknown `{}` value: {v}",
                            ::core::stringify!($name),
                        )
                        .into()
                    })
                }
            }

            impl ToSql for $name {
                accepts!(INT2);
                to_sql_checked!();

                fn to_sql(
                    &self,
                    ty: &Type,
                    w: &mut BytesMut,
                ) -> ::core::result::Result<IsNull, BoxError> {
                    i16::from(self.u8()).to_sql(ty, w)
                }
            }
        };
    };
}
