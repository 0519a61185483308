//! The surface the parser drives to assemble a [`Program`].
//!
//! Declaration insertion checks for redefinitions and records them as
//! diagnostics carrying both the new and the previous source location;
//! the offending declaration is dropped and building continues.

use crate::{
    Clause, Component, ComponentInit, Diagnostic, DiagnosticMessage, Directive, DirectiveKind,
    ErrorReport, FunctorDecl, Lattice, Pragma, Program, Relation, RelationQualifier, RelationTag,
    Span, TypeDecl,
};
use std::collections::BTreeSet;

pub struct ProgramBuilder {
    program: Program,
    report: ErrorReport,
    legacy: bool,
}

impl ProgramBuilder {
    pub fn new(legacy: bool) -> Self {
        ProgramBuilder {
            program: Program::new(),
            report: ErrorReport::new(),
            legacy,
        }
    }

    pub fn report(&self) -> &ErrorReport {
        &self.report
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Hand over the assembled program and the accumulated diagnostics
    pub fn finish(self) -> (Program, ErrorReport) {
        (self.program, self.report)
    }

    fn redefinition(&mut self, what: &str, name: &str, loc: Span, previous: Span) {
        self.report.add_diagnostic(
            Diagnostic::error(DiagnosticMessage::new(
                format!("Redefinition of {} {}", what, name),
                loc,
            ))
            .with_note(DiagnosticMessage::new("Previous definition", previous)),
        );
    }

    pub fn add_relation(&mut self, relation: Relation) {
        if let Some(prev) = self.program.relation(&relation.name) {
            let previous = prev.span;
            self.redefinition("relation", &relation.name.to_string(), relation.span, previous);
        } else {
            self.program.add_relation(relation);
        }
    }

    pub fn add_type(&mut self, ty: TypeDecl) {
        if let Some(prev) = self.program.types.iter().find(|t| t.name == ty.name) {
            let previous = prev.span;
            self.redefinition("type", &ty.name.to_string(), ty.span, previous);
        } else {
            self.program.types.push(ty);
        }
    }

    pub fn add_lattice(&mut self, lattice: Lattice) {
        if let Some(prev) = self
            .program
            .lattices
            .iter()
            .find(|l| l.name() == lattice.name())
        {
            let previous = prev.span;
            self.redefinition("lattice", &lattice.name().to_string(), lattice.span, previous);
        } else {
            self.program.lattices.push(lattice);
        }
    }

    pub fn add_functor(&mut self, functor: FunctorDecl) {
        if let Some(prev) = self.program.functors.iter().find(|f| f.name == functor.name) {
            let previous = prev.span;
            self.redefinition("functor", functor.name.as_ref(), functor.span, previous);
        } else {
            self.program.functors.push(functor);
        }
    }

    pub fn add_clause(&mut self, clause: Clause) {
        self.program.add_clause(clause);
    }

    pub fn add_pragma(&mut self, pragma: Pragma) {
        self.program.pragmas.push(pragma);
    }

    pub fn add_component(&mut self, component: Component) {
        self.program.components.push(component);
    }

    pub fn add_instantiation(&mut self, init: ComponentInit) {
        self.program.instantiations.push(init);
    }

    /// At most one `printsize` and one `limitsize` directive per relation
    pub fn add_directive(&mut self, directive: Directive) {
        if matches!(
            directive.kind,
            DirectiveKind::Printsize | DirectiveKind::Limitsize
        ) {
            if let Some(prev) = self
                .program
                .directives
                .iter()
                .find(|d| d.relation == directive.relation && d.kind == directive.kind)
            {
                let previous = prev.span;
                self.report.add_diagnostic(
                    Diagnostic::error(DiagnosticMessage::new(
                        format!(
                            "Redefinition of {} directives for relation {}",
                            directive.kind, directive.relation
                        ),
                        directive.span,
                    ))
                    .with_note(DiagnosticMessage::new("Previous definition", previous)),
                );
                return;
            }
        }
        self.program.add_directive(directive);
    }

    /// Rewrite deprecated I/O qualifier tags on a relation to directives
    pub fn add_io_from_deprecated_tag(&mut self, relation: &Relation) {
        if relation.has_qualifier(RelationQualifier::Input) {
            let mut dir = Directive::new(DirectiveKind::Input, relation.name.clone());
            dir.span = relation.span;
            self.add_directive(dir);
        }
        if relation.has_qualifier(RelationQualifier::Output) {
            let mut dir = Directive::new(DirectiveKind::Output, relation.name.clone());
            dir.span = relation.span;
            self.add_directive(dir);
        }
        if relation.has_qualifier(RelationQualifier::Printsize) {
            let mut dir = Directive::new(DirectiveKind::Printsize, relation.name.clone());
            dir.span = relation.span;
            self.add_directive(dir);
        }
    }

    /// A deprecated qualifier tag warns unless `legacy` is set
    pub fn add_deprecated_tag(
        &mut self,
        tag: RelationTag,
        loc: Span,
        tags: BTreeSet<RelationTag>,
    ) -> BTreeSet<RelationTag> {
        if !self.legacy {
            self.report
                .add_warning(format!("Deprecated {} qualifier was used", tag), loc);
        }
        self.add_tag(tag, loc, tags)
    }

    /// Representation tags are mutually exclusive
    pub fn add_repr_tag(
        &mut self,
        tag: RelationTag,
        loc: Span,
        tags: BTreeSet<RelationTag>,
    ) -> BTreeSet<RelationTag> {
        self.add_tag_checked(
            tag,
            &[RelationTag::Btree, RelationTag::Brie, RelationTag::Eqrel],
            loc,
            tags,
        )
    }

    pub fn add_tag(
        &mut self,
        tag: RelationTag,
        loc: Span,
        tags: BTreeSet<RelationTag>,
    ) -> BTreeSet<RelationTag> {
        self.add_tag_checked(tag, &[tag], loc, tags)
    }

    fn add_tag_checked(
        &mut self,
        tag: RelationTag,
        incompatible: &[RelationTag],
        loc: Span,
        mut tags: BTreeSet<RelationTag>,
    ) -> BTreeSet<RelationTag> {
        if incompatible.iter().any(|t| tags.contains(t)) {
            let names: Vec<String> = incompatible.iter().map(|t| t.to_string()).collect();
            self.report
                .add_error(format!("{} qualifier already set", names.join("/")), loc);
        } else {
            tags.insert(tag);
        }
        tags
    }
}
