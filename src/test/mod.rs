//! Builders for expected [`TypeNode`] trees used across the unit tests.

use crate::encoding::{Aggregate, PrimitiveKind, TypeNode};

pub fn prim(kind: PrimitiveKind) -> TypeNode {
    TypeNode::Primitive(kind)
}

pub fn ptr(target: TypeNode) -> TypeNode {
    TypeNode::Pointer(Box::new(target))
}

pub fn array(count: u64, element: TypeNode) -> TypeNode {
    TypeNode::ArrayOf(count, Box::new(element))
}

pub fn strukt(tag: Option<&str>, fields: Vec<TypeNode>) -> TypeNode {
    TypeNode::Struct(Aggregate::new(tag.map(str::to_string), fields))
}

pub fn union(tag: Option<&str>, fields: Vec<TypeNode>) -> TypeNode {
    TypeNode::Union(Aggregate::new(tag.map(str::to_string), fields))
}
