use crate::Reflect;

// -----------------------------------------------------------------------------
// Optional

/// Access to a nullable value (`Option<T>`).
///
/// On the wire an optional is a boolean presence token followed by the inner
/// value. The inner type is recorded in the type's
/// [`OptionInfo`](crate::info::OptionInfo); the read side activates a default
/// inner instance through the registry before filling it.
pub trait Optional: Reflect {
    /// Returns the inner value, if present.
    fn value(&self) -> Option<&dyn Reflect>;

    /// Returns the inner value mutably, if present.
    fn value_mut(&mut self) -> Option<&mut dyn Reflect>;

    /// Replaces the content with `Some(value)`. Returns the input unchanged
    /// if its type is incompatible with the inner type.
    fn set_value(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>>;

    /// Replaces the content with `None`.
    fn clear(&mut self);

    /// Whether a value is present.
    #[inline]
    fn is_some(&self) -> bool {
        self.value().is_some()
    }
}
