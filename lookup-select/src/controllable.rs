//! State that may be owned by the host or by the component.

/// A value read from the host when the host controls it, and from an
/// internal fallback otherwise.
///
/// Writes always go to the fallback and are reported back to the caller so
/// controlled and uncontrolled hosts share one notification path: the host
/// is told about every requested change, and only an uncontrolled instance
/// actually applies it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Controllable<V> {
    controlled: Option<V>,
    internal: V,
}

impl<V> Controllable<V> {
    /// Uncontrolled, starting at `initial`.
    pub fn new(initial: V) -> Self {
        Self {
            controlled: None,
            internal: initial,
        }
    }

    /// Current value: the host's if controlled, the fallback otherwise.
    pub fn get(&self) -> &V {
        self.controlled.as_ref().unwrap_or(&self.internal)
    }

    pub fn is_controlled(&self) -> bool {
        self.controlled.is_some()
    }

    /// Hands ownership to the host (`Some`) or takes it back (`None`).
    pub fn set_controlled(&mut self, value: Option<V>) {
        self.controlled = value;
    }

    /// Overwrites the fallback without change detection.
    pub fn set_fallback(&mut self, value: V) {
        self.internal = value;
    }

    /// Records a requested change in the fallback.
    ///
    /// Returns `true` if the visible value changed, which only happens for
    /// uncontrolled instances.
    pub fn request(&mut self, value: V) -> bool
    where
        V: PartialEq,
    {
        let changed = !self.is_controlled() && self.internal != value;
        self.internal = value;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncontrolled_applies_requests() {
        let mut open = Controllable::new(false);
        assert!(open.request(true));
        assert!(*open.get());
        assert!(!open.request(true));
    }

    #[test]
    fn test_controlled_ignores_requests_for_reads() {
        let mut open = Controllable::new(false);
        open.set_controlled(Some(false));

        assert!(!open.request(true));
        assert!(!*open.get());

        open.set_controlled(None);
        // Fallback mirrored the write.
        assert!(*open.get());
    }
}
