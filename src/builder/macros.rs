//! Macros for ergonomic state model construction.

/// Generate a state enum and its `State` implementation.
///
/// Variants are named after themselves unless given an explicit label, which
/// is what timeout keys are built from.
///
/// # Example
///
/// ```
/// use partition_transit::core::State;
/// use partition_transit::state_enum;
///
/// state_enum! {
///     pub enum OnlineOffline {
///         Offline = "OFFLINE",
///         Online = "ONLINE",
///         Error = "ERROR",
///         Dropped = "DROPPED",
///     }
///     final: [Dropped]
///     error: [Error]
/// }
///
/// assert_eq!(OnlineOffline::Online.name(), "ONLINE");
/// assert!(OnlineOffline::Dropped.is_final());
/// ```
#[macro_export]
macro_rules! state_enum {
    (@name $variant:ident) => {
        stringify!($variant)
    };
    (@name $variant:ident $label:literal) => {
        $label
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(= $label:literal)?
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
        $(error: [$($error:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $crate::state_enum!(@name $variant $($label)?)),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    _ => false,
                }
            }

            fn is_error(&self) -> bool {
                match self {
                    $($(Self::$error => true,)*)?
                    _ => false,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::State;

    state_enum! {
        enum TestState {
            Initial,
            Processing,
            Complete,
            Failed,
        }
        final: [Complete]
        error: [Failed]
    }

    #[test]
    fn state_enum_macro_generates_trait() {
        let state = TestState::Initial;
        assert_eq!(state.name(), "Initial");
        assert!(!state.is_final());
        assert!(!state.is_error());

        assert!(TestState::Complete.is_final());
        assert!(TestState::Failed.is_error());
        assert!(!TestState::Failed.is_final());
    }

    #[test]
    fn state_enum_supports_labels() {
        state_enum! {
            pub enum Labelled {
                Leader = "LEADER",
                Standby,
            }
        }

        assert_eq!(Labelled::Leader.name(), "LEADER");
        assert_eq!(Labelled::Standby.name(), "Standby");
    }

    #[test]
    fn state_enum_works_without_final_error() {
        state_enum! {
            enum MinimalState {
                One,
                Two,
            }
        }

        let state = MinimalState::One;
        assert!(!state.is_final());
        assert!(!state.is_error());
        assert_ne!(MinimalState::One, MinimalState::Two);
    }
}
