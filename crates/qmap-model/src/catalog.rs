//! Registry of shape descriptors.

use std::collections::BTreeMap;

use crate::{
    EnumDesc, LazySeq, ModelError, ObjectDesc, ObjectValue, Reflect, ScalarKind, SeqShape, Ty,
    TypeDesc, TypeName, Value,
};

/// All shapes known to a mapper, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    types: BTreeMap<TypeName, TypeDesc>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any previous one with the same name.
    ///
    /// # Errors
    ///
    /// Rejects empty type names and objects declaring a member twice.
    pub fn register(&mut self, desc: impl Into<TypeDesc>) -> Result<(), ModelError> {
        let desc = desc.into();
        if desc.name().is_empty() {
            return Err(ModelError::InvalidTypeName(desc.name().to_string()));
        }
        if let TypeDesc::Object(object) = &desc {
            for (idx, member) in object.members.iter().enumerate() {
                if object.members[..idx].iter().any(|m| m.matches(&member.name)) {
                    return Err(ModelError::DuplicateMember {
                        type_name: object.name.to_string(),
                        member: member.name.clone(),
                    });
                }
            }
        }
        self.types.insert(desc.name().clone(), desc);
        Ok(())
    }

    pub fn register_object(&mut self, desc: ObjectDesc) -> Result<(), ModelError> {
        self.register(desc)
    }

    pub fn register_enum(&mut self, desc: EnumDesc) -> Result<(), ModelError> {
        self.register(desc)
    }

    /// Unchecked insert for [`Reflect::describe`] implementations, whose
    /// descriptors are fixed at compile time.
    pub fn insert(&mut self, desc: impl Into<TypeDesc>) {
        let desc = desc.into();
        self.types.insert(desc.name().clone(), desc);
    }

    /// Register `T` and every shape reachable from its members.
    pub fn register_type<T: Reflect>(&mut self) {
        T::describe(self);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(&TypeName::new(name))
    }

    pub fn get(&self, name: &TypeName) -> Option<&TypeDesc> {
        self.types.get(name)
    }

    pub fn object(&self, name: &TypeName) -> Option<&ObjectDesc> {
        match self.types.get(name) {
            Some(TypeDesc::Object(desc)) => Some(desc),
            _ => None,
        }
    }

    pub fn enumeration(&self, name: &TypeName) -> Option<&EnumDesc> {
        match self.types.get(name) {
            Some(TypeDesc::Enum(desc)) => Some(desc),
            _ => None,
        }
    }

    pub fn type_names(&self) -> impl Iterator<Item = &TypeName> {
        self.types.keys()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Zero value of a type: what a member holds when nothing binds it.
    pub fn default_value(&self, ty: &Ty) -> Value {
        match ty {
            Ty::Scalar(kind) => match kind {
                ScalarKind::Bool => Value::Bool(false),
                ScalarKind::I32 | ScalarKind::I64 => Value::Int(0),
                ScalarKind::F32 | ScalarKind::F64 => Value::Float(0.0),
                ScalarKind::Text => Value::Text(String::new()),
            },
            Ty::Enum(name) => Value::Enum(
                self.enumeration(name)
                    .map_or_else(|| EnumDesc::new(name.clone()).default_value(), EnumDesc::default_value),
            ),
            Ty::Sequence {
                shape: SeqShape::Lazy,
                ..
            } => Value::Lazy(LazySeq::empty()),
            Ty::Sequence { .. } => Value::Seq(Vec::new()),
            Ty::Optional(_) | Ty::Object(_) | Ty::Opaque(_) => Value::Null,
        }
    }

    /// A fresh instance with every member at its default value.
    pub fn blank_object(&self, desc: &ObjectDesc) -> ObjectValue {
        desc.members
            .iter()
            .fold(ObjectValue::new(desc.name.clone()), |obj, member| {
                obj.with(member.name.clone(), self.default_value(&member.ty))
            })
    }
}
