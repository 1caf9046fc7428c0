//! Macros for ergonomic machine declaration.

/// Declare a machine's states and events, producing a `MachineBuilder`.
///
/// Hooks and storage are added to the returned builder before `.build()`.
///
/// # Example
///
/// ```
/// use statu::machine;
///
/// struct Robot;
///
/// let robot = machine! {
///     Robot {
///         initial: sleeping,
///         states: [running, cleaning],
///         events: {
///             run: [sleeping] => running,
///             cleanup: [running] => cleaning,
///             sleep: [running, cleaning] => sleeping,
///         }
///     }
/// }
/// .build()
/// .unwrap();
///
/// assert_eq!(robot.descriptor().initial_state().name(), "sleeping");
/// ```
#[macro_export]
macro_rules! machine {
    (
        $ty:ident {
            initial: $initial:ident,
            states: [$($state:ident),* $(,)?],
            events: {
                $(
                    $event:ident: [$($from:ident),+ $(,)?] => $to:ident
                ),* $(,)?
            } $(,)?
        }
    ) => {
        $crate::builder::MachineBuilder::<$ty>::new(stringify!($ty))
            .state($crate::core::State::initial(stringify!($initial)))
            $(.state($crate::core::State::new(stringify!($state))))*
            $(
                .event(
                    $crate::core::EventSpec::new(stringify!($event))
                        $(.from(stringify!($from)))+
                        .to(stringify!($to))
                )
            )*
    };
}
