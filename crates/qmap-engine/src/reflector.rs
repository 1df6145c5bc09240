//! Member and constructor discovery over a [`Catalog`].

use qmap_model::{Catalog, ConstructorDesc, EnumDesc, MemberDesc, ObjectDesc, Ty, TypeName};

use crate::ConfigError;

/// Read-only view answering "what members and constructors does this shape
/// have". Non-object types have no members.
#[derive(Debug, Clone, Copy)]
pub struct MemberReflector<'c> {
    catalog: &'c Catalog,
}

impl<'c> MemberReflector<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Every member of a shape in declaration order; empty for non-objects.
    pub fn describe(&self, ty: &Ty) -> &'c [MemberDesc] {
        match ty {
            Ty::Object(name) => self
                .catalog
                .object(name)
                .map_or(&[][..], |desc| desc.members.as_slice()),
            _ => &[],
        }
    }

    pub fn readable_members(&self, ty: &Ty) -> impl Iterator<Item = &'c MemberDesc> + use<'c> {
        self.describe(ty).iter().filter(|m| m.readable)
    }

    pub fn writable_members(&self, ty: &Ty) -> impl Iterator<Item = &'c MemberDesc> + use<'c> {
        self.describe(ty).iter().filter(|m| m.writable)
    }

    /// Case-insensitive lookup of a readable member.
    pub fn find_readable(&self, ty: &Ty, name: &str) -> Option<&'c MemberDesc> {
        self.describe(ty)
            .iter()
            .find(|m| m.readable && m.matches(name))
    }

    /// Object descriptor by name.
    ///
    /// # Errors
    ///
    /// Fails when the name is unregistered or names an enum.
    pub fn object(&self, name: &TypeName) -> Result<&'c ObjectDesc, ConfigError> {
        self.catalog.object(name).ok_or_else(|| {
            if self.catalog.get(name).is_some() {
                ConfigError::NotAnObject {
                    type_name: name.to_string(),
                }
            } else {
                ConfigError::unknown_type(name)
            }
        })
    }

    pub fn enumeration(&self, name: &TypeName) -> Result<&'c EnumDesc, ConfigError> {
        self.catalog
            .enumeration(name)
            .ok_or_else(|| ConfigError::unknown_type(name))
    }

    pub fn constructors(&self, name: &TypeName) -> Result<&'c [ConstructorDesc], ConfigError> {
        self.object(name).map(|desc| desc.constructors.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use qmap_model::{EnumDesc, MemberDesc, ObjectDesc};

    use super::*;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .register_object(
                ObjectDesc::new("Person")
                    .member(MemberDesc::new("Firstname", Ty::text()))
                    .member(MemberDesc::write_only("Secret", Ty::text()))
                    .member(MemberDesc::read_only("Id", Ty::i64())),
            )
            .unwrap();
        catalog
            .register_enum(EnumDesc::new("Genre").variant("Novel", 1))
            .unwrap();
        catalog
    }

    #[test]
    fn filters_by_access() {
        let catalog = catalog();
        let reflector = MemberReflector::new(&catalog);
        let person = Ty::object("Person");
        let readable: Vec<&str> = reflector
            .readable_members(&person)
            .map(|m| m.name.as_str())
            .collect();
        let writable: Vec<&str> = reflector
            .writable_members(&person)
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(readable, vec!["Firstname", "Id"]);
        assert_eq!(writable, vec!["Firstname", "Secret"]);
        assert!(reflector.find_readable(&person, "firstNAME").is_some());
        assert!(reflector.find_readable(&person, "secret").is_none());
    }

    #[test]
    fn non_objects_have_no_members() {
        let catalog = catalog();
        let reflector = MemberReflector::new(&catalog);
        assert!(reflector.describe(&Ty::text()).is_empty());
        assert!(reflector.describe(&Ty::object("Missing")).is_empty());
        assert!(matches!(
            reflector.object(&"Genre".into()),
            Err(ConfigError::NotAnObject { .. })
        ));
        assert!(matches!(
            reflector.object(&"Missing".into()),
            Err(ConfigError::UnknownType { .. })
        ));
    }
}
