//! Default key derivation.
//!
//! A unit submitted without a key is serialized under the key derived from its
//! action's identity: the identity parts joined by a single space. Two invocations
//! with the same derived key are the same logical unit of work for serialization
//! purposes, even when their actions differ in ways the identity does not capture
//! (working directory, environment, stdio). That coalescing is intentional.

/// Derives the serialization key from identity parts.
///
/// # Example
/// ```
/// use keyvisor::derive_key;
///
/// assert_eq!(derive_key(&["ls", "-la", "/tmp"]), "ls -la /tmp");
/// ```
pub fn derive_key<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_with_single_space() {
        assert_eq!(derive_key(&["rsync", "-a", "src/", "dst/"]), "rsync -a src/ dst/");
    }

    #[test]
    fn test_empty_identity_gives_empty_key() {
        let parts: [&str; 0] = [];
        assert_eq!(derive_key(&parts), "");
    }

    #[test]
    fn test_single_part_and_empty_parts() {
        assert_eq!(derive_key(&["make"]), "make");
        assert_eq!(derive_key(&["echo", "", "x"]), "echo  x");
        assert_eq!(derive_key(&[String::from("a"), String::from("b")]), "a b");
    }

    #[test]
    fn test_different_splits_collide() {
        // "a b" + "c" and "a" + "b c" render the same key and are coalesced.
        assert_eq!(derive_key(&["a b", "c"]), derive_key(&["a", "b c"]));
    }
}
