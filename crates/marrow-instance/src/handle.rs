//! Packed generational handles, phantom-typed per owning registry.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Number of low bits holding the slot index.
pub const INDEX_BITS: u32 = 24;

/// Number of high bits holding the generation counter.
pub const GENERATION_BITS: u32 = 8;

/// Largest addressable slot index (index 0 is the null sentinel).
pub const MAX_INDEX: u32 = (1 << INDEX_BITS) - 1;

/// Generation values wrap modulo this.
pub const GENERATION_WRAP: u32 = 1 << GENERATION_BITS;

const INDEX_MASK: u32 = MAX_INDEX;

/// Marker trait tying handles to their owning registry's instance kind.
///
/// Implement on a zero-sized type per manager:
///
/// ```
/// use marrow_instance::InstanceKind;
///
/// struct RigidBody;
/// impl InstanceKind for RigidBody {}
/// ```
pub trait InstanceKind: 'static {}

/// A packed `(generation, index)` handle to one slot in one registry.
///
/// Plain 32-bit value semantics; the phantom parameter exists purely to
/// keep handles from different managers type-distinct. Raw value 0 is
/// the null sentinel — never minted for a live instance.
pub struct Handle<K: InstanceKind> {
    raw: u32,
    _kind: PhantomData<K>,
}

// Manual impls: derives would demand `K: Clone` etc. on a phantom.
impl<K: InstanceKind> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<K: InstanceKind> Copy for Handle<K> {}
impl<K: InstanceKind> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
impl<K: InstanceKind> Eq for Handle<K> {}
impl<K: InstanceKind> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<K: InstanceKind> Handle<K> {
    /// The null sentinel: "no instance".
    pub const NULL: Handle<K> = Handle {
        raw: 0,
        _kind: PhantomData,
    };

    /// Pack an index and generation into a handle.
    ///
    /// Bounds are a precondition (registry-internal call path), checked
    /// in debug builds only.
    pub(crate) fn pack(index: u32, generation: u32) -> Handle<K> {
        debug_assert!(index <= MAX_INDEX, "index {index} exceeds {INDEX_BITS} bits");
        debug_assert!(
            generation < GENERATION_WRAP,
            "generation {generation} exceeds {GENERATION_BITS} bits"
        );
        Handle {
            raw: (generation << INDEX_BITS) | (index & INDEX_MASK),
            _kind: PhantomData,
        }
    }

    /// The slot index encoded in this handle.
    pub fn index(self) -> u32 {
        self.raw & INDEX_MASK
    }

    /// The generation encoded in this handle.
    pub fn generation(self) -> u32 {
        self.raw >> INDEX_BITS
    }

    /// Whether this is the null sentinel.
    pub fn is_null(self) -> bool {
        self.raw == 0
    }

    /// The packed 32-bit value, for serialization or FFI surfaces.
    pub fn raw(self) -> u32 {
        self.raw
    }

    /// Rebuild a handle from a previously obtained [`Handle::raw`] value.
    ///
    /// The value is taken on trust; an arbitrary integer simply produces
    /// a handle that fails the registry's liveness check.
    pub fn from_raw(raw: u32) -> Handle<K> {
        Handle {
            raw,
            _kind: PhantomData,
        }
    }
}

impl<K: InstanceKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Handle(null)")
        } else {
            write!(f, "Handle(index={}, gen={})", self.index(), self.generation())
        }
    }
}

impl<K: InstanceKind> fmt::Display for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
