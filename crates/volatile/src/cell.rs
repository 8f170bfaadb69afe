/// A volatile cell holding a value of type `T`.
///
/// This can be used as a volatile reference as well as a volatile mutable reference.
#[repr(transparent)]
#[derive(Debug)]
pub struct VolatileCell<T: Copy>(T);

impl<T> VolatileCell<T>
where
    T: Copy,
{
    /// Creates a `&VolatileCell<T>` from a reference to a value of type `T`.
    pub fn from_ref(t: &T) -> &Self {
        // SAFETY: `VolatileCell<T>` is `repr(transparent)` over `T`
        unsafe { &*(t as *const T as *const Self) }
    }

    /// Creates a `&mut VolatileCell<T>` from a mutable reference to a value of type `T`.
    pub fn from_mut(t: &mut T) -> &mut Self {
        // SAFETY: `VolatileCell<T>` is `repr(transparent)` over `T`
        unsafe { &mut *(t as *mut T as *mut Self) }
    }

    /// Volatile reads the value.
    pub fn get(&self) -> T {
        // SAFETY: The reference is valid and aligned
        unsafe { core::ptr::read_volatile(&self.0) }
    }

    /// Volatile writes the value.
    pub fn set(&mut self, value: T) {
        // SAFETY: The reference is valid and aligned
        unsafe { core::ptr::write_volatile(&mut self.0, value) }
    }
}
