//! Remaining top-level declarations: types, functors, pragmas, directives,
//! and component shells.

use crate::{Attribute, QualifiedName, Span, Symbol};
use std::collections::BTreeMap;
use std::fmt;

/// A type declaration
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: QualifiedName,
    pub kind: TypeDeclKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDeclKind {
    /// `.type T <: Base`
    Subset(QualifiedName),
    /// `.type T = A | B`
    Union(Vec<QualifiedName>),
    /// `.type T = [a : U, b : V]`
    Record(Vec<Attribute>),
    /// `.type T = Base`
    Alias(QualifiedName),
}

impl TypeDecl {
    pub fn new(name: QualifiedName, kind: TypeDeclKind) -> Self {
        TypeDecl {
            name,
            kind,
            span: Span::unknown(),
        }
    }
}

impl PartialEq for TypeDecl {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl Eq for TypeDecl {}

/// An external functor declaration
#[derive(Debug, Clone)]
pub struct FunctorDecl {
    pub name: Symbol,
    pub params: Vec<QualifiedName>,
    pub returns: QualifiedName,
    pub stateful: bool,
    pub span: Span,
}

impl FunctorDecl {
    pub fn new(name: Symbol, params: Vec<QualifiedName>, returns: QualifiedName) -> Self {
        FunctorDecl {
            name,
            params,
            returns,
            stateful: false,
            span: Span::unknown(),
        }
    }
}

impl PartialEq for FunctorDecl {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.params == other.params
            && self.returns == other.returns
            && self.stateful == other.stateful
    }
}

impl Eq for FunctorDecl {}

/// A pragma directive: `.pragma "key" "value"`
#[derive(Debug, Clone)]
pub struct Pragma {
    pub key: String,
    pub value: String,
    pub span: Span,
}

impl Pragma {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Pragma {
            key: key.into(),
            value: value.into(),
            span: Span::unknown(),
        }
    }
}

impl PartialEq for Pragma {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl Eq for Pragma {}

/// The kind of an I/O directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DirectiveKind {
    Input,
    Output,
    Printsize,
    Limitsize,
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DirectiveKind::Input => "input",
            DirectiveKind::Output => "output",
            DirectiveKind::Printsize => "printsize",
            DirectiveKind::Limitsize => "limitsize",
        };
        write!(f, "{}", text)
    }
}

/// An I/O directive for a relation: `.input R(...)`, `.output R`, ...
#[derive(Debug, Clone)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub relation: QualifiedName,
    pub params: BTreeMap<String, String>,
    pub span: Span,
}

impl Directive {
    pub fn new(kind: DirectiveKind, relation: QualifiedName) -> Self {
        Directive {
            kind,
            relation,
            params: BTreeMap::new(),
            span: Span::unknown(),
        }
    }
}

impl PartialEq for Directive {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.relation == other.relation && self.params == other.params
    }
}

impl Eq for Directive {}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{} {}", self.kind, self.relation)?;
        if !self.params.is_empty() {
            write!(f, "(")?;
            for (i, (key, value)) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}=\"{}\"", key, value)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// A component declaration shell. The middle-end only tracks the name; the
/// body is expanded away by the component-instantiation collaborator.
#[derive(Debug, Clone)]
pub struct Component {
    pub name: Symbol,
    pub span: Span,
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Component {}

/// A component instantiation: `.init inst = Comp`
#[derive(Debug, Clone)]
pub struct ComponentInit {
    pub instance: Symbol,
    pub component: Symbol,
    pub span: Span,
}

impl PartialEq for ComponentInit {
    fn eq(&self, other: &Self) -> bool {
        self.instance == other.instance && self.component == other.component
    }
}

impl Eq for ComponentInit {}
