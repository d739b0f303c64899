//! Argument Stringification Module
//!
//! Every argument that takes part in a cache key is rendered to text first.
//! Rendering never fails.
//!
//! Limitation: values with no textual form of their own (slices, vectors,
//! anything wrapped in [`Opaque`]) render as their type name only, so two
//! different values of the same type produce the same text and share a
//! cache entry.

use std::any::type_name;
use std::borrow::Cow;

// == Key Arg ==
/// Textual form of a value used when building a cache key.
pub trait KeyArg {
    fn key_text(&self) -> Cow<'_, str>;
}

macro_rules! impl_key_arg_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KeyArg for $ty {
                fn key_text(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }
        )*
    };
}

impl_key_arg_display!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
);

impl KeyArg for str {
    fn key_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl KeyArg for String {
    fn key_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<T: KeyArg + ?Sized> KeyArg for &T {
    fn key_text(&self) -> Cow<'_, str> {
        (**self).key_text()
    }
}

/// Absent values render as the empty string.
impl<T: KeyArg> KeyArg for Option<T> {
    fn key_text(&self) -> Cow<'_, str> {
        match self {
            Some(value) => value.key_text(),
            None => Cow::Borrowed(""),
        }
    }
}

impl KeyArg for () {
    fn key_text(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

impl<T> KeyArg for [T] {
    fn key_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(type_name::<[T]>())
    }
}

impl<T> KeyArg for Vec<T> {
    fn key_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(type_name::<Vec<T>>())
    }
}

// == Opaque ==
/// Wraps a value that has no textual form; it renders as its type name.
pub struct Opaque<'a, T: ?Sized>(pub &'a T);

impl<T: ?Sized> KeyArg for Opaque<'_, T> {
    fn key_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(type_name::<T>())
    }
}

/// Builds a `&[&dyn KeyArg]` argument list.
///
/// ```ignore
/// let key = derive_key(&id, key_args![a, b], HashAlgorithm::Sha256);
/// ```
#[macro_export]
macro_rules! key_args {
    () => {
        &[] as &[&dyn $crate::key::KeyArg]
    };
    ($($arg:expr),+ $(,)?) => {
        &[$(&$arg as &dyn $crate::key::KeyArg),+] as &[&dyn $crate::key::KeyArg]
    };
}
