//! Declarative [`Reflect`](crate::Reflect) implementations for plain types.

/// Implement [`Reflect`](crate::Reflect) for a struct whose fields are all
/// readable and writable members, created through the implicit
/// parameterless constructor.
///
/// ```ignore
/// reflect_object!(Animal as "Animal" {
///     name: String => "Name",
///     age: i32 => "Age",
/// });
/// ```
#[macro_export]
macro_rules! reflect_object {
    ($ty:ty as $name:literal { $($field:ident : $fty:ty => $member:literal),* $(,)? }) => {
        impl $crate::Reflect for $ty {
            fn ty() -> $crate::Ty {
                $crate::Ty::object($name)
            }

            fn describe(catalog: &mut $crate::Catalog) {
                if catalog.contains($name) {
                    return;
                }
                catalog.insert(
                    $crate::ObjectDesc::new($name)
                        $(.member($crate::MemberDesc::new(
                            $member,
                            <$fty as $crate::Reflect>::ty(),
                        )))*,
                );
                $(<$fty as $crate::Reflect>::describe(catalog);)*
            }

            fn to_value(&self) -> $crate::Value {
                $crate::ObjectValue::new($name)
                    $(.with($member, $crate::Reflect::to_value(&self.$field)))*
                    .into()
            }

            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::ValueError> {
                #[allow(unused_mut, unused_variables)]
                let mut object = value.into_object()?;
                Ok(Self {
                    $($field: object.take::<$fty>($member)?,)*
                })
            }
        }
    };
}

/// Implement [`Reflect`](crate::Reflect) for a fieldless enum with explicit
/// discriminants.
///
/// ```ignore
/// reflect_enum!(Genre as "Genre" { Unknown = 0, Novel = 1 });
/// ```
#[macro_export]
macro_rules! reflect_enum {
    ($ty:ty as $name:literal { $($variant:ident = $disc:literal),* $(,)? }) => {
        impl $crate::Reflect for $ty {
            fn ty() -> $crate::Ty {
                $crate::Ty::enumeration($name)
            }

            fn describe(catalog: &mut $crate::Catalog) {
                if catalog.contains($name) {
                    return;
                }
                catalog.insert(
                    $crate::EnumDesc::new($name)
                        $(.variant(stringify!($variant), $disc))*,
                );
            }

            fn to_value(&self) -> $crate::Value {
                let (name, discriminant): (&str, i64) = match self {
                    $(Self::$variant => (stringify!($variant), $disc),)*
                };
                $crate::Value::Enum($crate::EnumValue {
                    name: name.to_string(),
                    discriminant,
                })
            }

            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::ValueError> {
                let discriminant: i64 = match value {
                    $crate::Value::Enum(e) => e.discriminant,
                    $crate::Value::Int(i) => i,
                    other => return Err($crate::ValueError::shape($name, other.kind_name())),
                };
                match discriminant {
                    $($disc => Ok(Self::$variant),)*
                    other => Err($crate::ValueError::OutOfRange {
                        value: other.to_string(),
                        target: $name.to_string(),
                    }),
                }
            }
        }
    };
}
