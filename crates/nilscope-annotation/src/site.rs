//! Primitive annotation sites.

use serde::{Deserialize, Serialize};

use crate::keys::AnnotationKey;
use crate::pos::Pos;

/// Stable, flattened identity of one annotatable location.
///
/// Typed keys reference declarations that only exist while the defining
/// package is being analyzed; sites flatten them into plain strings so they
/// can be used as map keys and shipped between package passes byte-for-byte.
/// Two sites are equal iff the identity, the `deep` bit, and the `exported`
/// bit all agree.
///
/// `deep` distinguishes the nilability of the outer container from that of
/// its element type: `param 0 of Dial` with `deep = false` is the slice
/// itself, with `deep = true` its elements.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrimitiveSite {
    /// Path of the defining package.
    pub pkg_path: String,
    /// Human-readable location identity, unique within the package.
    pub repr: String,
    /// Element-type nilability rather than the container's.
    pub deep: bool,
    /// Visibility of the underlying entity outside its package.
    pub exported: bool,
    /// Declaration position, carried for diagnostics only.
    #[serde(default)]
    pub pos: Option<Pos>,
}

impl PrimitiveSite {
    /// Flatten an annotation key into its shallow or deep site.
    pub fn new(key: &AnnotationKey, deep: bool) -> Self {
        Self {
            pkg_path: key.pkg_path().to_string(),
            repr: key.to_string(),
            deep,
            exported: key.is_exported(),
            pos: key.pos().cloned(),
        }
    }
}

impl std::fmt::Display for PrimitiveSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.deep {
            write!(f, "deep {} ({})", self.repr, self.pkg_path)
        } else {
            write!(f, "{} ({})", self.repr, self.pkg_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{FuncDecl, TypeDecl};

    fn conn_type() -> AnnotationKey {
        AnnotationKey::TypeName(TypeDecl {
            pkg_path: "example.com/net".into(),
            name: "Conn".into(),
            is_exported: true,
            pos: Some(Pos::new("net/conn.go", 10, 6)),
        })
    }

    #[test]
    fn test_shallow_and_deep_are_distinct() {
        let key = conn_type();
        let shallow = PrimitiveSite::new(&key, false);
        let deep = PrimitiveSite::new(&key, true);
        assert_ne!(shallow, deep);
        assert_eq!(shallow.repr, deep.repr);
    }

    #[test]
    fn test_site_carries_visibility() {
        let key = AnnotationKey::Param {
            func: FuncDecl {
                pkg_path: "example.com/net".into(),
                name: "dialLocked".into(),
                is_exported: false,
                pos: None,
            },
            index: 1,
        };
        let site = PrimitiveSite::new(&key, false);
        assert!(!site.exported);
        assert_eq!(site.repr, "param 1 of dialLocked");
    }

    #[test]
    fn test_same_key_same_site() {
        let a = PrimitiveSite::new(&conn_type(), true);
        let b = PrimitiveSite::new(&conn_type(), true);
        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_display_marks_deep() {
        let key = conn_type();
        assert_eq!(
            PrimitiveSite::new(&key, true).to_string(),
            "deep type Conn (example.com/net)"
        );
    }
}
