//! Typed annotation keys.
//!
//! The syntax front end resolves declarations into these lightweight,
//! string-identified decls (entities are identified by package path plus
//! name, the same way the bridge IR identifies functions and variables) and
//! wraps them in an [`AnnotationKey`] naming one annotatable location.

use serde::{Deserialize, Serialize};

use crate::pos::Pos;

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FuncDecl {
    pub pkg_path: String,
    /// Name as written, including the receiver for methods (e.g. `Conn.Close`).
    pub name: String,
    pub is_exported: bool,
    #[serde(default)]
    pub pos: Option<Pos>,
}

/// A struct field declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldDecl {
    pub pkg_path: String,
    pub struct_name: String,
    pub field_name: String,
    pub is_exported: bool,
    #[serde(default)]
    pub pos: Option<Pos>,
}

/// A named type declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeDecl {
    pub pkg_path: String,
    pub name: String,
    pub is_exported: bool,
    #[serde(default)]
    pub pos: Option<Pos>,
}

/// A package-level variable declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarDecl {
    pub pkg_path: String,
    pub name: String,
    pub is_exported: bool,
    #[serde(default)]
    pub pos: Option<Pos>,
}

/// One annotatable program location.
///
/// Each variant corresponds to a location that can legitimately carry a
/// nilability annotation: a struct field, a positional function parameter or
/// return, a method receiver, a named type, or a global variable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnnotationKey {
    Field(FieldDecl),
    Param { func: FuncDecl, index: u32 },
    Return { func: FuncDecl, index: u32 },
    Receiver(FuncDecl),
    TypeName(TypeDecl),
    GlobalVar(VarDecl),
}

impl AnnotationKey {
    /// Path of the package defining the underlying entity.
    pub fn pkg_path(&self) -> &str {
        match self {
            Self::Field(f) => &f.pkg_path,
            Self::Param { func, .. } | Self::Return { func, .. } | Self::Receiver(func) => {
                &func.pkg_path
            }
            Self::TypeName(t) => &t.pkg_path,
            Self::GlobalVar(v) => &v.pkg_path,
        }
    }

    /// Whether the underlying entity is visible outside its defining package.
    ///
    /// Parameter, return, and receiver locations inherit the visibility of
    /// their function.
    pub fn is_exported(&self) -> bool {
        match self {
            Self::Field(f) => f.is_exported,
            Self::Param { func, .. } | Self::Return { func, .. } | Self::Receiver(func) => {
                func.is_exported
            }
            Self::TypeName(t) => t.is_exported,
            Self::GlobalVar(v) => v.is_exported,
        }
    }

    /// Declaration position of the underlying entity, when the front end
    /// resolved one.
    pub fn pos(&self) -> Option<&Pos> {
        match self {
            Self::Field(f) => f.pos.as_ref(),
            Self::Param { func, .. } | Self::Return { func, .. } | Self::Receiver(func) => {
                func.pos.as_ref()
            }
            Self::TypeName(t) => t.pos.as_ref(),
            Self::GlobalVar(v) => v.pos.as_ref(),
        }
    }
}

impl std::fmt::Display for AnnotationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(fd) => write!(f, "field {}.{}", fd.struct_name, fd.field_name),
            Self::Param { func, index } => write!(f, "param {} of {}", index, func.name),
            Self::Return { func, index } => write!(f, "result {} of {}", index, func.name),
            Self::Receiver(func) => write!(f, "receiver of {}", func.name),
            Self::TypeName(t) => write!(f, "type {}", t.name),
            Self::GlobalVar(v) => write!(f, "global {}", v.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dial() -> FuncDecl {
        FuncDecl {
            pkg_path: "example.com/net".into(),
            name: "Dial".into(),
            is_exported: true,
            pos: None,
        }
    }

    #[test]
    fn test_key_repr() {
        let key = AnnotationKey::Param {
            func: dial(),
            index: 0,
        };
        assert_eq!(key.to_string(), "param 0 of Dial");

        let key = AnnotationKey::Return {
            func: dial(),
            index: 1,
        };
        assert_eq!(key.to_string(), "result 1 of Dial");
    }

    #[test]
    fn test_param_inherits_function_visibility() {
        let mut func = dial();
        func.is_exported = false;
        let key = AnnotationKey::Param { func, index: 0 };
        assert!(!key.is_exported());

        let key = AnnotationKey::Receiver(dial());
        assert!(key.is_exported());
    }

    #[test]
    fn test_pkg_path_per_variant() {
        let key = AnnotationKey::Field(FieldDecl {
            pkg_path: "example.com/store".into(),
            struct_name: "Conn".into(),
            field_name: "buf".into(),
            is_exported: false,
            pos: None,
        });
        assert_eq!(key.pkg_path(), "example.com/store");
        assert_eq!(key.to_string(), "field Conn.buf");
    }
}
