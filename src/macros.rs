/// Implements [`Event`](crate::event::Event) for one or more types.
///
/// # Syntax
///
/// ```rust,ignore
/// impl_event!(UserCreated, OrderShipped);
/// ```
///
/// # Example
///
/// ```rust
/// use redbus::impl_event;
/// use redbus::event::Event;
///
/// struct UserCreated {
///     pub id: u64,
/// }
///
/// impl_event!(UserCreated);
///
/// let event = UserCreated { id: 1 };
/// assert!(event.event_name().ends_with("UserCreated"));
/// ```
#[macro_export]
macro_rules! impl_event {
    ($($name:ty),+ $(,)?) => {
        $(
            impl $crate::event::Event for $name {
                fn as_any(&self) -> &dyn ::std::any::Any {
                    self
                }
            }
        )+
    };
}
