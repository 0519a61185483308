//! Relation declarations: attributes, qualifiers, and representations.

use crate::{QualifiedName, Span, Symbol};
use std::collections::BTreeSet;
use std::fmt;

/// Qualifiers a relation declaration may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelationQualifier {
    Input,
    Output,
    Printsize,
    Overridable,
    Inline,
    Suppressed,
}

impl fmt::Display for RelationQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RelationQualifier::Input => "input",
            RelationQualifier::Output => "output",
            RelationQualifier::Printsize => "printsize",
            RelationQualifier::Overridable => "overridable",
            RelationQualifier::Inline => "inline",
            RelationQualifier::Suppressed => "suppressed",
        };
        write!(f, "{}", text)
    }
}

/// The data structure backing a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RelationRepresentation {
    Btree,
    Brie,
    Eqrel,
    #[default]
    Default,
}

impl fmt::Display for RelationRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RelationRepresentation::Btree => "btree",
            RelationRepresentation::Brie => "brie",
            RelationRepresentation::Eqrel => "eqrel",
            RelationRepresentation::Default => "",
        };
        write!(f, "{}", text)
    }
}

/// A surface tag on a relation declaration, covering both qualifiers and
/// representation choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelationTag {
    Input,
    Output,
    Printsize,
    Overridable,
    Inline,
    Suppressed,
    Btree,
    Brie,
    Eqrel,
}

impl RelationTag {
    pub fn as_qualifier(&self) -> Option<RelationQualifier> {
        match self {
            RelationTag::Input => Some(RelationQualifier::Input),
            RelationTag::Output => Some(RelationQualifier::Output),
            RelationTag::Printsize => Some(RelationQualifier::Printsize),
            RelationTag::Overridable => Some(RelationQualifier::Overridable),
            RelationTag::Inline => Some(RelationQualifier::Inline),
            RelationTag::Suppressed => Some(RelationQualifier::Suppressed),
            _ => None,
        }
    }

    pub fn as_representation(&self) -> Option<RelationRepresentation> {
        match self {
            RelationTag::Btree => Some(RelationRepresentation::Btree),
            RelationTag::Brie => Some(RelationRepresentation::Brie),
            RelationTag::Eqrel => Some(RelationRepresentation::Eqrel),
            _ => None,
        }
    }
}

impl fmt::Display for RelationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RelationTag::Input => "input",
            RelationTag::Output => "output",
            RelationTag::Printsize => "printsize",
            RelationTag::Overridable => "overridable",
            RelationTag::Inline => "inline",
            RelationTag::Suppressed => "suppressed",
            RelationTag::Btree => "btree",
            RelationTag::Brie => "brie",
            RelationTag::Eqrel => "eqrel",
        };
        write!(f, "{}", text)
    }
}

/// A concrete attribute: `name : TypeName`
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: Symbol,
    pub type_name: QualifiedName,
    pub span: Span,
}

impl Attribute {
    pub fn new(name: Symbol, type_name: QualifiedName) -> Self {
        Attribute {
            name,
            type_name,
            span: Span::unknown(),
        }
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.type_name == other.type_name
    }
}

impl Eq for Attribute {}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.type_name)
    }
}

/// A lattice attribute: `name <- LatticeName`
#[derive(Debug, Clone)]
pub struct LatticeAttribute {
    pub name: Symbol,
    pub lattice_name: QualifiedName,
    pub span: Span,
}

impl LatticeAttribute {
    pub fn new(name: Symbol, lattice_name: QualifiedName) -> Self {
        LatticeAttribute {
            name,
            lattice_name,
            span: Span::unknown(),
        }
    }
}

impl PartialEq for LatticeAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.lattice_name == other.lattice_name
    }
}

impl Eq for LatticeAttribute {}

impl fmt::Display for LatticeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<-{}", self.name, self.lattice_name)
    }
}

/// A relation declaration: name, concrete and lattice attributes,
/// qualifiers, and representation
#[derive(Debug, Clone)]
pub struct Relation {
    pub name: QualifiedName,
    pub concrete_attrs: Vec<Attribute>,
    pub lattice_attrs: Vec<LatticeAttribute>,
    pub qualifiers: BTreeSet<RelationQualifier>,
    pub representation: RelationRepresentation,
    pub span: Span,
}

impl Relation {
    pub fn new(name: QualifiedName) -> Self {
        Relation {
            name,
            concrete_attrs: Vec::new(),
            lattice_attrs: Vec::new(),
            qualifiers: BTreeSet::new(),
            representation: RelationRepresentation::Default,
            span: Span::unknown(),
        }
    }

    pub fn concrete_arity(&self) -> usize {
        self.concrete_attrs.len()
    }

    pub fn lattice_arity(&self) -> usize {
        self.lattice_attrs.len()
    }

    pub fn has_qualifier(&self, q: RelationQualifier) -> bool {
        self.qualifiers.contains(&q)
    }

    pub fn add_qualifier(&mut self, q: RelationQualifier) {
        self.qualifiers.insert(q);
    }

    pub fn remove_qualifier(&mut self, q: RelationQualifier) {
        self.qualifiers.remove(&q);
    }
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.concrete_attrs == other.concrete_attrs
            && self.lattice_attrs == other.lattice_attrs
    }
}

impl Eq for Relation {}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".decl {}(", self.name)?;
        for (i, attr) in self.concrete_attrs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", attr)?;
        }
        if !self.lattice_attrs.is_empty() {
            write!(f, "; ")?;
            for (i, attr) in self.lattice_attrs.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", attr)?;
            }
        }
        write!(f, ")")?;
        for q in &self.qualifiers {
            write!(f, " {}", q)?;
        }
        if self.representation != RelationRepresentation::Default {
            write!(f, " {}", self.representation)?;
        }
        Ok(())
    }
}
