use alloc::string::String;
use alloc::string::ToString;

/// A value stored in a [`BucketTable`](crate::BucketTable), tagged with who
/// owns it.
///
/// `Borrowed` values belong to the caller; the table only holds the
/// reference and never drops what it points to. `Owned` values belong to the
/// table and are dropped exactly once: when overwritten or removed they are
/// handed back to the caller, and when the table is cleared or dropped they
/// are dropped in place.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a, V> {
    /// A reference to a caller-owned value.
    Borrowed(&'a V),
    /// A value owned by the table.
    Owned(V),
}

impl<'a, V> Value<'a, V> {
    /// Returns a shared reference to the value regardless of ownership.
    #[inline]
    pub fn get(&self) -> &V {
        match self {
            Value::Borrowed(value) => value,
            Value::Owned(value) => value,
        }
    }

    /// Returns a mutable reference if the table owns the value.
    ///
    /// Borrowed values cannot be mutated through the table.
    #[inline]
    pub fn as_mut(&mut self) -> Option<&mut V> {
        match self {
            Value::Borrowed(_) => None,
            Value::Owned(value) => Some(value),
        }
    }

    /// Returns `true` if the table owns the value.
    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self, Value::Owned(_))
    }

    /// Consumes the value, returning the owned payload if there is one.
    pub fn into_owned(self) -> Option<V> {
        match self {
            Value::Borrowed(_) => None,
            Value::Owned(value) => Some(value),
        }
    }
}

/// A boxed primitive, for tables that mix the value kinds the convenience
/// setters produce.
///
/// # Examples
///
/// ```rust
/// use bucket_table::BucketTable;
/// use bucket_table::Primitive;
///
/// let mut table: BucketTable<'_, Primitive> = BucketTable::new();
/// table.set_int("answer", 42).unwrap();
/// table.set_string("greeting", "hello").unwrap();
///
/// assert_eq!(table.get("answer").and_then(Primitive::as_int), Some(42));
/// assert_eq!(table.get("greeting").and_then(Primitive::as_str), Some("hello"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A 32-bit integer.
    Int(i32),
    /// A 64-bit integer.
    Long(i64),
    /// A single-precision float.
    Float(f32),
    /// A double-precision float.
    Double(f64),
    /// An owned string.
    Str(String),
}

impl Primitive {
    /// Returns the integer if this is an `Int`.
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Primitive::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the integer if this is a `Long`.
    pub fn as_long(&self) -> Option<i64> {
        match *self {
            Primitive::Long(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the float if this is a `Float`.
    pub fn as_float(&self) -> Option<f32> {
        match *self {
            Primitive::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the float if this is a `Double`.
    pub fn as_double(&self) -> Option<f64> {
        match *self {
            Primitive::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the string if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i32> for Primitive {
    fn from(value: i32) -> Self {
        Primitive::Int(value)
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Primitive::Long(value)
    }
}

impl From<f32> for Primitive {
    fn from(value: f32) -> Self {
        Primitive::Float(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Primitive::Double(value)
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::Str(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_access_by_ownership() {
        let caller = 5u32;
        let mut borrowed = Value::Borrowed(&caller);
        let mut owned: Value<'_, u32> = Value::Owned(7);

        assert_eq!(*borrowed.get(), 5);
        assert_eq!(*owned.get(), 7);
        assert!(borrowed.as_mut().is_none());

        *owned.as_mut().unwrap() += 1;
        assert_eq!(owned.into_owned(), Some(8));
        assert!(!borrowed.is_owned());
    }

    #[test]
    fn primitive_accessors_match_variant() {
        assert_eq!(Primitive::from(3i32).as_int(), Some(3));
        assert_eq!(Primitive::from(3i64).as_long(), Some(3));
        assert_eq!(Primitive::from(1.5f32).as_float(), Some(1.5));
        assert_eq!(Primitive::from(2.5f64).as_double(), Some(2.5));
        assert_eq!(Primitive::from("x").as_str(), Some("x"));
        assert_eq!(Primitive::from(3i32).as_long(), None);
        assert_eq!(Primitive::from("x").as_int(), None);
    }
}
