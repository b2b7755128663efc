//! Heap objects: interned strings, functions, and native functions.
//!
//! Every heap object is variant-tagged by [`Object`] and owned by the
//! [`Heap`]'s object list, which is the only thing that keeps an object
//! alive once nothing else references it and is walked at VM shutdown —
//! there is no garbage collector in this revision (spec.md §1 Non-goals).

#[cfg(test)]
mod object_test;

use std::fmt;
use std::rc::Rc;

use crate::chunk::Chunk;
use crate::table::Table;
use crate::value::Value;

/// FNV-1a 32-bit hash, matching the reference implementation's string hash.
#[must_use]
pub fn fnv1a_hash(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 2_166_136_261;
    for &b in bytes {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(16_777_619);
    }
    hash
}

/// An immutable, interned byte string.
///
/// All `ObjString`s reachable from a live `Value` are interned: two
/// strings with equal content are always the same object (same `Rc`).
#[derive(Debug)]
pub struct ObjString {
    pub chars: Box<str>,
    pub hash: u32,
}

/// A compiled function: arity, its own chunk, and an optional name.
///
/// The top-level script has `name: None`.
#[derive(Debug)]
pub struct ObjFunction {
    pub arity: u8,
    pub chunk: Chunk,
    pub name: Option<Rc<Object>>,
}

impl ObjFunction {
    #[must_use]
    pub fn new(name: Option<Rc<Object>>) -> Self {
        Self {
            arity: 0,
            chunk: Chunk::new(),
            name,
        }
    }

    /// The printable name of this function, or `"script"` for the
    /// nameless top-level function.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(obj) => obj.as_string().map_or("?", |s| &s.chars),
            None => "script",
        }
    }
}

/// A native (Rust-implemented) function callable from Ember source.
pub struct NativeFn {
    pub name: &'static str,
    pub arity: u8,
    pub function: fn(&[Value]) -> Value,
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").field("name", &self.name).finish()
    }
}

/// A heap-allocated, variant-tagged object.
#[derive(Debug)]
pub enum Object {
    String(ObjString),
    Function(ObjFunction),
    Native(NativeFn),
}

impl Object {
    #[must_use]
    pub fn as_string(&self) -> Option<&ObjString> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_function(&self) -> Option<&ObjFunction> {
        match self {
            Self::Function(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_native(&self) -> Option<&NativeFn> {
        match self {
            Self::Native(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Function(_) => "function",
            Self::Native(_) => "native function",
        }
    }
}

/// Owner of every heap object and the string intern table.
///
/// The VM and the compiler both borrow a single `Heap` for the lifetime
/// of the process, so that identical string literals compiled in separate
/// `Interpret` calls still intern to the same object (spec.md §5: "compile
/// and run share its intern table, globals, and object list").
///
/// `objects` stands in for the spec's intrusive linked list (spec.md §9
/// design note: "map to any ownership-disciplined scheme"): every
/// allocation is pushed here, and dropping the `Heap` drops every object
/// it still owns, which is the shutdown-time sweep.
pub struct Heap {
    objects: Vec<Rc<Object>>,
    strings: Table<()>,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            strings: Table::new(),
        }
    }

    fn track(&mut self, object: Object) -> Rc<Object> {
        let rc = Rc::new(object);
        self.objects.push(Rc::clone(&rc));
        rc
    }

    /// Intern a string the heap does not yet own a copy of (`copy_string`
    /// in spec.md §4.2): the string is copied into a fresh `Box<str>`
    /// unless an equal-content string is already interned.
    pub fn copy_string(&mut self, chars: &str) -> Rc<Object> {
        let hash = fnv1a_hash(chars.as_bytes());
        if let Some(existing) = self.strings.find_string(chars, hash) {
            return existing;
        }
        let interned = self.track(Object::String(ObjString {
            chars: chars.into(),
            hash,
        }));
        self.strings.set(Rc::clone(&interned), ());
        interned
    }

    /// Intern a string the caller already owns (`take_string` in spec.md
    /// §4.2): if an equal-content string is already interned, the owned
    /// buffer is simply dropped and the existing object is returned.
    pub fn take_string(&mut self, owned: String) -> Rc<Object> {
        let hash = fnv1a_hash(owned.as_bytes());
        if let Some(existing) = self.strings.find_string(&owned, hash) {
            return existing;
        }
        let interned = self.track(Object::String(ObjString {
            chars: owned.into_boxed_str(),
            hash,
        }));
        self.strings.set(Rc::clone(&interned), ());
        interned
    }

    pub fn alloc_function(&mut self, function: ObjFunction) -> Rc<Object> {
        self.track(Object::Function(function))
    }

    pub fn alloc_native(&mut self, native: NativeFn) -> Rc<Object> {
        self.track(Object::Native(native))
    }

    /// Number of heap objects currently tracked (for diagnostics/logging).
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}
