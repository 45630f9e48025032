/// Whether the presentation layer should currently animate theme changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionState {
    #[default]
    Idle,
    Transitioning,
}
