//! Lattice declarations: `.lattice Name <base, leq, lub, glb, bot, top>`

use crate::{QualifiedName, Span};
use std::fmt;

/// A lattice declaration. Immutable after construction: the six component
/// names are fixed when the declaration is built.
#[derive(Debug, Clone)]
pub struct Lattice {
    name: QualifiedName,
    base_type: QualifiedName,
    leq: QualifiedName,
    lub: QualifiedName,
    glb: QualifiedName,
    bot: QualifiedName,
    top: QualifiedName,
    pub span: Span,
}

impl Lattice {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: QualifiedName,
        base_type: QualifiedName,
        leq: QualifiedName,
        lub: QualifiedName,
        glb: QualifiedName,
        bot: QualifiedName,
        top: QualifiedName,
    ) -> Self {
        Lattice {
            name,
            base_type,
            leq,
            lub,
            glb,
            bot,
            top,
            span: Span::unknown(),
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn base_type(&self) -> &QualifiedName {
        &self.base_type
    }

    pub fn leq(&self) -> &QualifiedName {
        &self.leq
    }

    pub fn lub(&self) -> &QualifiedName {
        &self.lub
    }

    pub fn glb(&self) -> &QualifiedName {
        &self.glb
    }

    pub fn bot(&self) -> &QualifiedName {
        &self.bot
    }

    pub fn top(&self) -> &QualifiedName {
        &self.top
    }
}

impl PartialEq for Lattice {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.base_type == other.base_type
            && self.leq == other.leq
            && self.lub == other.lub
            && self.glb == other.glb
            && self.bot == other.bot
            && self.top == other.top
    }
}

impl Eq for Lattice {}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ".lattice {} <{}, {}, {}, {}, {}, {}>",
            self.name, self.base_type, self.leq, self.lub, self.glb, self.bot, self.top
        )
    }
}
