//! `Reflect` for standard library types.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::Hash;

use crate::shape::{ARRAY, LIST, MAP, SEQUENCE};
use crate::{
    Instance, MapOps, Reflect, ScalarKind, SequenceOps, TypeInfo, TypeKind, TypeRef, WrapperInfo,
};

macro_rules! reflect_scalars {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(impl Reflect for $ty {
            fn type_info() -> TypeInfo {
                TypeInfo::new(TypeKind::Scalar(ScalarKind::$kind))
            }
        })*
    };
}

reflect_scalars! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
}

// === Wrappers ===

fn option_unwrap<T: Reflect>(any: &dyn Any) -> Option<&dyn Any> {
    any.downcast_ref::<Option<T>>()?
        .as_ref()
        .map(|v| v as &dyn Any)
}

fn option_wrap<T: Reflect>(inner: Option<Instance>) -> Option<Instance> {
    match inner {
        None => Some(Box::new(None::<T>)),
        Some(value) => {
            let value = value.downcast::<T>().ok()?;
            Some(Box::new(Some(*value)))
        }
    }
}

fn box_unwrap<T: Reflect>(any: &dyn Any) -> Option<&dyn Any> {
    any.downcast_ref::<Box<T>>().map(|v| &**v as &dyn Any)
}

fn box_wrap<T: Reflect>(inner: Option<Instance>) -> Option<Instance> {
    let value = inner?.downcast::<T>().ok()?;
    Some(Box::new(value))
}

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Wrapper(WrapperInfo {
            inner: TypeRef::of::<T>(),
            nullable: true,
            unwrap: option_unwrap::<T>,
            wrap: option_wrap::<T>,
        }))
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Wrapper(WrapperInfo {
            inner: TypeRef::of::<T>(),
            nullable: false,
            unwrap: box_unwrap::<T>,
            wrap: box_wrap::<T>,
        }))
    }
}

// === Sequences ===

fn sequence_iter<C, T>(any: &dyn Any) -> Option<Vec<&dyn Any>>
where
    C: 'static,
    T: 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    let collection = any.downcast_ref::<C>()?;
    Some(collection.into_iter().map(|v| v as &dyn Any).collect())
}

fn sequence_collect<C, T>(items: Vec<Instance>) -> Option<Instance>
where
    C: FromIterator<T> + 'static,
    T: 'static,
{
    let collection: C = items
        .into_iter()
        .map(|item| item.downcast::<T>().ok().map(|v| *v))
        .collect::<Option<Vec<T>>>()?
        .into_iter()
        .collect();
    Some(Box::new(collection))
}

fn array_collect<T: 'static, const N: usize>(items: Vec<Instance>) -> Option<Instance> {
    let items = items
        .into_iter()
        .map(|item| item.downcast::<T>().ok().map(|v| *v))
        .collect::<Option<Vec<T>>>()?;
    let array: [T; N] = items.try_into().ok()?;
    Some(Box::new(array))
}

fn sequence_info<C, T>(shape: crate::OpenShape) -> TypeInfo
where
    C: FromIterator<T> + 'static,
    T: Reflect,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    TypeInfo::new(TypeKind::Sequence(SequenceOps {
        iter: sequence_iter::<C, T>,
        collect: sequence_collect::<C, T>,
    }))
    .implements(shape.close(vec![TypeRef::of::<T>()]))
    .implements(SEQUENCE.close(vec![TypeRef::of::<T>()]))
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_info() -> TypeInfo {
        TypeInfo::new(TypeKind::Sequence(SequenceOps {
            iter: sequence_iter::<[T; N], T>,
            collect: array_collect::<T, N>,
        }))
        .implements(ARRAY.close(vec![TypeRef::of::<T>()]))
        .implements(SEQUENCE.close(vec![TypeRef::of::<T>()]))
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_info() -> TypeInfo {
        sequence_info::<Vec<T>, T>(LIST)
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn type_info() -> TypeInfo {
        sequence_info::<VecDeque<T>, T>(LIST)
    }
}

impl<T: Reflect> Reflect for LinkedList<T> {
    fn type_info() -> TypeInfo {
        sequence_info::<LinkedList<T>, T>(LIST)
    }
}

impl<T: Reflect + Eq + Hash> Reflect for HashSet<T> {
    fn type_info() -> TypeInfo {
        sequence_info::<HashSet<T>, T>(SEQUENCE)
    }
}

impl<T: Reflect + Ord> Reflect for BTreeSet<T> {
    fn type_info() -> TypeInfo {
        sequence_info::<BTreeSet<T>, T>(SEQUENCE)
    }
}

// === Maps ===

fn map_entries<M, K, V>(any: &dyn Any) -> Option<Vec<(&dyn Any, &dyn Any)>>
where
    M: 'static,
    K: 'static,
    V: 'static,
    for<'a> &'a M: IntoIterator<Item = (&'a K, &'a V)>,
{
    let map = any.downcast_ref::<M>()?;
    Some(
        map.into_iter()
            .map(|(k, v)| (k as &dyn Any, v as &dyn Any))
            .collect(),
    )
}

fn map_collect<M, K, V>(entries: Vec<(Instance, Instance)>) -> Option<Instance>
where
    M: FromIterator<(K, V)> + 'static,
    K: 'static,
    V: 'static,
{
    let pairs = entries
        .into_iter()
        .map(|(k, v)| Some((*k.downcast::<K>().ok()?, *v.downcast::<V>().ok()?)))
        .collect::<Option<Vec<(K, V)>>>()?;
    Some(Box::new(pairs.into_iter().collect::<M>()))
}

fn map_info<M, K, V>() -> TypeInfo
where
    M: FromIterator<(K, V)> + 'static,
    K: Reflect,
    V: Reflect,
    for<'a> &'a M: IntoIterator<Item = (&'a K, &'a V)>,
{
    TypeInfo::new(TypeKind::Map(MapOps {
        entries: map_entries::<M, K, V>,
        collect: map_collect::<M, K, V>,
    }))
    .implements(MAP.close(vec![TypeRef::of::<K>(), TypeRef::of::<V>()]))
}

impl<K: Reflect + Eq + Hash, V: Reflect> Reflect for HashMap<K, V> {
    fn type_info() -> TypeInfo {
        map_info::<HashMap<K, V>, K, V>()
    }
}

impl<K: Reflect + Ord, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        map_info::<BTreeMap<K, V>, K, V>()
    }
}
