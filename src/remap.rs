//! Key-translation rules for call/return boundaries.

/// One key-translation rule applied by `remap_ml`.
///
/// `from` is in scope on the source side of the boundary, `to` on the map's
/// own side. A missing `to` means the location has no meaning across the
/// boundary and its binding is dropped.
#[derive(Debug, Clone)]
pub struct RemapRule<K> {
    pub from: K,
    pub to: Option<K>,
    /// Replace the `from` binding (`true`) or keep it alongside the new
    /// `to` binding (`false`).
    pub replace: bool,
}

impl<K> RemapRule<K> {
    /// Move the binding of `from` over to `to`.
    pub fn rename(from: K, to: K) -> Self {
        Self {
            from,
            to: Some(to),
            replace: true,
        }
    }

    /// Drop the binding of `from`; it does not survive the boundary.
    pub fn drop(from: K) -> Self {
        Self {
            from,
            to: None,
            replace: true,
        }
    }

    /// Bind `to` to `from`'s value while keeping the `from` binding.
    pub fn duplicate(from: K, to: K) -> Self {
        Self {
            from,
            to: Some(to),
            replace: false,
        }
    }
}
