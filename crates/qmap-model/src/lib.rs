//! Shape vocabulary for the qmap object mapper.
//!
//! Rust has no runtime reflection, so every shape the mapper works with is
//! described explicitly:
//!
//! - **Types** ([`Ty`]): scalars, enums, optionals, sequences, objects
//! - **Descriptors** ([`ObjectDesc`], [`EnumDesc`]): members and constructors
//! - **Catalog** ([`Catalog`]): registered descriptors keyed by [`TypeName`]
//! - **Values** ([`Value`]): the dynamic instance model the engine reads and builds
//! - **Bridge** ([`Reflect`]): converts concrete Rust types to and from values
//!
//! # Example
//!
//! ```ignore
//! use qmap_model::{Catalog, MemberDesc, ObjectDesc, Ty};
//!
//! let mut catalog = Catalog::new();
//! catalog.register_object(
//!     ObjectDesc::new("Animal")
//!         .member(MemberDesc::new("Name", Ty::text()))
//!         .member(MemberDesc::new("Age", Ty::i32())),
//! )?;
//! ```

#![deny(unsafe_code)]

mod catalog;
mod desc;
mod error;
mod ids;
mod lazy;
mod macros;
mod reflect;
mod ty;
mod value;

pub use catalog::Catalog;
pub use desc::{
    ConstructorDesc, EnumDesc, Initializer, MemberDesc, ObjectDesc, ParamDesc, TypeDesc,
    Visibility,
};
pub use error::{ModelError, ValueError};
pub use ids::TypeName;
pub use lazy::{Lazy, LazySeq, LazyStep};
pub use reflect::Reflect;
pub use ty::{ScalarKind, SeqShape, Ty};
pub use value::{EnumValue, ObjectValue, Value};
