// This file is part of hoard.
// Copyright (C) 2025 Hoard Contributors
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ordered sequences of objects, in immutable and mutable flavors.
//!
//! Both flavors share one payload shape and one child group, `"objects"`.
//! The immutable flavor only accepts immutable elements, so its memoized
//! hash can never drift underneath it. Read accessors ([`get`], [`len`],
//! [`objects`]) work on either flavor; the mutators in [`mutable`] require
//! the mutable descriptor's payload but are otherwise the same shape.

use crate::descriptor::{ChildWalker, SerializationFormat, TypeDescriptor, all_immutable};
use crate::error::{Error, Result};
use crate::object::{Object, Payload};
use std::cmp::Ordering;

/// Element buffers start at this capacity and grow geometrically.
const INITIAL_CAPACITY: usize = 10;

#[derive(Debug, Default)]
struct ArrayData {
    objects: Vec<Object>,
}

/// Descriptor for ordered sequences; one instance per mutability flavor.
#[derive(Debug)]
pub struct ArrayType {
    mutable: bool,
}

/// The immutable sequence descriptor.
pub static ARRAY: ArrayType = ArrayType { mutable: false };

/// The mutable sequence descriptor.
pub static MUTABLE_ARRAY: ArrayType = ArrayType { mutable: true };

impl TypeDescriptor for ArrayType {
    fn name(&self) -> &str {
        if self.mutable { "MutableArray" } else { "Array" }
    }

    fn immutable(&self) -> bool {
        !self.mutable
    }

    fn serialization_format(&self) -> SerializationFormat {
        SerializationFormat::Structured
    }

    fn init_data(&self) -> Result<Payload> {
        Ok(Box::new(ArrayData::default()))
    }

    fn has_comparator(&self) -> bool {
        true
    }

    /// Sequences order by their first elements; when either side is empty,
    /// by length.
    fn compare(&self, a: &Object, b: &Object) -> Result<Ordering> {
        let (first_a, len_a) = {
            let data = a.data::<ArrayData>()?;
            (data.objects.first().cloned(), data.objects.len())
        };
        let (first_b, len_b) = {
            let data = b.data::<ArrayData>()?;
            (data.objects.first().cloned(), data.objects.len())
        };
        match (first_a, first_b) {
            (Some(x), Some(y)) => x.compare(&y),
            _ => Ok(len_a.cmp(&len_b)),
        }
    }

    fn walk_children(&self, object: &Object, emit: &mut ChildWalker<'_>) -> Result<()> {
        let children = object.data::<ArrayData>()?.objects.clone();
        emit("objects", &children, false)
    }

    fn store_children(&self, object: &Object, key: &str, children: Vec<Object>) -> Result<()> {
        if key != "objects" {
            return Err(Error::corrupt(format!(
                "sequence has no child group `{key}`"
            )));
        }
        object.data::<ArrayData>()?.objects = children;
        Ok(())
    }
}

fn with_elements(ty: &'static ArrayType, objects: Vec<Object>) -> Object {
    Object::new(ty, Box::new(ArrayData { objects }))
}

/// Author an immutable sequence. Every element must be of an immutable type.
pub fn create(objects: &[Object]) -> Result<Object> {
    if !all_immutable(objects) {
        return Err(Error::ImmutabilityViolated(ARRAY.name().to_owned()));
    }
    Ok(with_elements(&ARRAY, objects.to_vec()))
}

/// A new immutable sequence with `object` appended.
pub fn create_appending(array: &Object, object: &Object) -> Result<Object> {
    create_appending_all(array, std::slice::from_ref(object))
}

/// A new immutable sequence with `objects` appended.
pub fn create_appending_all(array: &Object, appended: &[Object]) -> Result<Object> {
    if !all_immutable(appended) {
        return Err(Error::ImmutabilityViolated(ARRAY.name().to_owned()));
    }
    let mut combined = objects(array)?;
    combined.extend_from_slice(appended);
    Ok(with_elements(&ARRAY, combined))
}

/// A new immutable sequence concatenating `arrays` in order.
pub fn concat(arrays: &[Object]) -> Result<Object> {
    let mut combined = Vec::new();
    for array in arrays {
        combined.extend(objects(array)?);
    }
    create(&combined)
}

/// Handles to all elements, in order.
pub fn objects(array: &Object) -> Result<Vec<Object>> {
    Ok(array.data::<ArrayData>()?.objects.clone())
}

/// The element at `index`, or `None` past the end.
pub fn get(array: &Object, index: usize) -> Result<Option<Object>> {
    Ok(array.data::<ArrayData>()?.objects.get(index).cloned())
}

/// Number of elements.
pub fn len(array: &Object) -> Result<usize> {
    Ok(array.data::<ArrayData>()?.objects.len())
}

/// Whether the sequence has no elements.
pub fn is_empty(array: &Object) -> Result<bool> {
    Ok(array.data::<ArrayData>()?.objects.is_empty())
}

/// An immutable sub-sequence of `length` elements starting at `start`.
/// `None` takes everything to the end; a start past the end yields an empty
/// sequence.
pub fn sub_array(array: &Object, start: usize, length: Option<usize>) -> Result<Object> {
    let elements = objects(array)?;
    if start >= elements.len() {
        return create(&[]);
    }
    let rest = &elements[start..];
    let take = length.unwrap_or(rest.len()).min(rest.len());
    create(&rest[..take])
}

/// A new immutable sequence built by evaluating `each` per element.
pub fn map(
    array: &Object,
    mut each: impl FnMut(usize, &Object) -> Result<Object>,
) -> Result<Object> {
    let elements = objects(array)?;
    let mut mapped = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        mapped.push(each(index, element)?);
    }
    create(&mapped)
}

/// Mutators and constructors for the mutable flavor.
pub mod mutable {
    use super::*;
    use crate::object;

    /// Author a mutable sequence. Elements of any mutability are accepted.
    pub fn create(objects: &[Object]) -> Object {
        let mut buffer = Vec::with_capacity(objects.len().max(INITIAL_CAPACITY));
        buffer.extend_from_slice(objects);
        with_elements(&MUTABLE_ARRAY, buffer)
    }

    /// A mutable copy of any sequence.
    pub fn from_array(array: &Object) -> Result<Object> {
        Ok(create(&objects(array)?))
    }

    /// An independent mutable copy.
    pub fn copy(array: &Object) -> Result<Object> {
        from_array(array)
    }

    /// Freeze into an immutable sequence. Fails if any element is mutable.
    pub fn to_array(array: &Object) -> Result<Object> {
        super::create(&objects(array)?)
    }

    /// Append one element.
    pub fn push(array: &Object, object: &Object) -> Result<()> {
        array.data::<ArrayData>()?.objects.push(object.clone());
        Ok(())
    }

    /// Append many elements.
    pub fn extend(array: &Object, appended: &[Object]) -> Result<()> {
        array
            .data::<ArrayData>()?
            .objects
            .extend_from_slice(appended);
        Ok(())
    }

    /// Remove the element at `index`; `false` when out of bounds.
    pub fn remove_index(array: &Object, index: usize) -> Result<bool> {
        let mut data = array.data::<ArrayData>()?;
        if index >= data.objects.len() {
            return Ok(false);
        }
        data.objects.remove(index);
        Ok(true)
    }

    /// Remove the first element that is the same object (handle identity,
    /// not structural equality); `false` when absent.
    pub fn remove_object(array: &Object, object: &Object) -> Result<bool> {
        let mut data = array.data::<ArrayData>()?;
        let found = data.objects.iter().position(|o| o.ptr_eq(object));
        match found {
            Some(index) => {
                data.objects.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Stable in-place sort by the polymorphic comparator.
    pub fn sort(array: &Object) -> Result<()> {
        let mut elements = objects(array)?;
        object::sort(&mut elements)?;
        array.data::<ArrayData>()?.objects = elements;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::string;

    fn strings(texts: &[&str]) -> Vec<Object> {
        texts.iter().map(|t| string::create(*t)).collect()
    }

    #[test]
    fn rejects_mutable_elements() {
        let inner = mutable::create(&[]);
        assert!(matches!(
            create(&[inner]),
            Err(Error::ImmutabilityViolated(_))
        ));
    }

    #[test]
    fn indexed_access() {
        let array = create(&strings(&["a", "b", "c"])).unwrap();
        assert_eq!(len(&array).unwrap(), 3);
        assert_eq!(string::value(&get(&array, 1).unwrap().unwrap()).unwrap(), "b");
        assert!(get(&array, 3).unwrap().is_none());
    }

    #[test]
    fn sub_array_edges() {
        let array = create(&strings(&["a", "b", "c"])).unwrap();
        let tail = sub_array(&array, 1, None).unwrap();
        assert_eq!(len(&tail).unwrap(), 2);
        let clipped = sub_array(&array, 1, Some(10)).unwrap();
        assert_eq!(len(&clipped).unwrap(), 2);
        let past = sub_array(&array, 5, Some(1)).unwrap();
        assert!(is_empty(&past).unwrap());
    }

    #[test]
    fn map_builds_a_new_sequence() {
        let array = create(&strings(&["a", "b"])).unwrap();
        let shouted = map(&array, |_, element| {
            Ok(string::create(string::value(element)?.to_uppercase()))
        })
        .unwrap();
        assert_eq!(string::value(&get(&shouted, 0).unwrap().unwrap()).unwrap(), "A");
        assert_eq!(len(&array).unwrap(), 2);
    }

    #[test]
    fn concat_preserves_order() {
        let left = create(&strings(&["a"])).unwrap();
        let right = create(&strings(&["b", "c"])).unwrap();
        let joined = concat(&[left, right]).unwrap();
        assert_eq!(len(&joined).unwrap(), 3);
        assert_eq!(string::value(&get(&joined, 2).unwrap().unwrap()).unwrap(), "c");
    }

    #[test]
    fn first_element_comparator() {
        let a = create(&strings(&["a", "z"])).unwrap();
        let b = create(&strings(&["b"])).unwrap();
        assert_eq!(a.compare(&b).unwrap(), Ordering::Less);
        let empty = create(&[]).unwrap();
        assert_eq!(empty.compare(&a).unwrap(), Ordering::Less);
        assert_eq!(empty.compare(&create(&[]).unwrap()).unwrap(), Ordering::Equal);
    }

    #[test]
    fn mutable_push_and_remove() {
        let array = mutable::create(&[]);
        let b = string::create("b");
        mutable::push(&array, &string::create("a")).unwrap();
        mutable::push(&array, &b).unwrap();
        mutable::push(&array, &string::create("c")).unwrap();
        assert_eq!(len(&array).unwrap(), 3);

        // Identity, not equality: a fresh "b" is not the same object.
        assert!(!mutable::remove_object(&array, &string::create("b")).unwrap());
        assert!(mutable::remove_object(&array, &b).unwrap());
        assert_eq!(len(&array).unwrap(), 2);

        assert!(mutable::remove_index(&array, 1).unwrap());
        assert!(!mutable::remove_index(&array, 5).unwrap());
        assert_eq!(len(&array).unwrap(), 1);
    }

    #[test]
    fn removing_releases_the_handle() {
        let array = mutable::create(&[]);
        let element = string::create("x");
        mutable::push(&array, &element).unwrap();
        assert_eq!(element.ref_count(), 2);
        assert!(mutable::remove_object(&array, &element).unwrap());
        assert_eq!(element.ref_count(), 1);
    }

    #[test]
    fn sort_uses_the_comparator() {
        let array = mutable::create(&strings(&["pear", "apple", "plum", "fig"]));
        mutable::sort(&array).unwrap();
        let sorted: Vec<String> = objects(&array)
            .unwrap()
            .iter()
            .map(|o| string::value(o).unwrap())
            .collect();
        assert_eq!(sorted, ["apple", "fig", "pear", "plum"]);
    }

    #[test]
    fn freeze_and_thaw() {
        let array = mutable::create(&strings(&["a", "b"]));
        let frozen = mutable::to_array(&array).unwrap();
        assert!(frozen.is_immutable());
        let thawed = mutable::from_array(&frozen).unwrap();
        mutable::push(&thawed, &string::create("c")).unwrap();
        assert_eq!(len(&thawed).unwrap(), 3);
        assert_eq!(len(&frozen).unwrap(), 2);
    }

    #[cfg(feature = "proptest")]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hash_is_stable_across_reserialization(
                texts in proptest::collection::vec(".*", 0..8)
            ) {
                let elements: Vec<Object> =
                    texts.iter().map(|t| string::create(t.clone())).collect();
                let a = create(&elements).unwrap();
                let b = create(&elements).unwrap();
                prop_assert_eq!(a.hash().unwrap(), b.hash().unwrap());
            }
        }
    }
}
