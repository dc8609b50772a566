pub mod composition;
pub mod constraints;
pub mod discriminator;
pub mod member;
pub mod name;
pub mod pojo;
pub mod types;
pub mod unresolved;

pub use composition::{
    AllOfComposition, AnyOfComposition, CompositionKind, OneOfComposition, UnionComposition,
};
pub use constraints::{Constraints, DecimalBound, PropertyCount, Size};
pub use discriminator::{Discriminator, DiscriminatorMapping, DiscriminatorMismatch};
pub use member::{MemberState, Necessity, Nullability, PojoMember};
pub use name::{Name, PojoName};
pub use pojo::{
    AdditionalProperties, AliasPojo, ArrayPojo, ComposedPojo, EnumPojo, FreeFormPojo, ObjectPojo,
    ObjectPojoBuilder, Pojo,
};
pub use types::{
    ClassOverride, EnumMember, EnumType, IntegerFormat, NumberFormat, StringFormat, Type, TypeKind,
};
