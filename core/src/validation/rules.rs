use super::{Finding, Findings, ValidationOracle, codes};
use crate::model::{
    FlagField, MemberKind, Model, Node, NodeId, NodeKind, PropertyKind, TextField,
};

/// Structural rules: names, sibling duplicates, type assignments and
/// resource flags. Checks the subject and every live node it owns.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicRules;

impl BasicRules {
    pub fn new() -> Self {
        Self
    }

    fn check_node(&self, model: &Model, node: &Node, out: &mut Findings) {
        if !node.kind().is_library() {
            self.check_name(model, node, out);
        }

        match node.kind() {
            NodeKind::Property(kind) => self.check_property_type(model, node, kind, out),
            NodeKind::Member(MemberKind::Resource) => self.check_resource(model, node, out),
            _ => {}
        }

        if node.kind().is_member() && node.text(TextField::Description).is_empty() {
            out.push(Finding::warning(
                node.id(),
                codes::MISSING_DESCRIPTION,
                format!("'{}' has no description", node.name()),
            ));
        }
    }

    fn check_name(&self, model: &Model, node: &Node, out: &mut Findings) {
        let name = node.name();
        if name.is_empty() {
            out.push(Finding::error(
                node.id(),
                codes::NAME_REQUIRED,
                format!("a {} requires a name", node.kind()),
            ));
            return;
        }
        if !is_valid_name(name) {
            out.push(Finding::error(
                node.id(),
                codes::INVALID_NAME,
                format!("'{name}' is not a valid name"),
            ));
        }

        let Some(owner) = node.owner() else {
            return;
        };
        let own_family = family(node.kind());
        let duplicated = model.children(owner).iter().any(|&sibling| {
            sibling != node.id()
                && model.node(sibling).is_some_and(|other| {
                    other.name() == name && family(other.kind()) == own_family
                })
        });
        if duplicated {
            out.push(Finding::error(
                node.id(),
                codes::DUPLICATE_NAME,
                format!("'{name}' is already used in '{}'", model.name(owner)),
            ));
        }
    }

    fn check_property_type(
        &self,
        model: &Model,
        node: &Node,
        kind: PropertyKind,
        out: &mut Findings,
    ) {
        if kind == PropertyKind::Indicator {
            return;
        }
        match node.assigned_type() {
            None => out.push(Finding::error(
                node.id(),
                codes::MISSING_TYPE,
                format!("'{}' has no assigned type", node.name()),
            )),
            Some(target) => {
                let legal = model.is_live(target)
                    && model
                        .kind(target)
                        .is_some_and(|k| k.is_member() && !k.is_resource());
                if !legal {
                    out.push(Finding::error(
                        node.id(),
                        codes::ILLEGAL_TYPE_ASSIGNMENT,
                        format!("'{}' cannot be typed by {target}", node.name()),
                    ));
                }
            }
        }
    }

    fn check_resource(&self, model: &Model, node: &Node, out: &mut Findings) {
        if let Some(subject) = node.assigned_type() {
            let legal = model.is_live(subject)
                && model.kind(subject) == Some(NodeKind::Member(MemberKind::BusinessObject));
            if !legal {
                out.push(Finding::error(
                    node.id(),
                    codes::ILLEGAL_TYPE_ASSIGNMENT,
                    format!(
                        "resource '{}' must expose a business object, not {subject}",
                        node.name()
                    ),
                ));
            }
        }

        if node.flag(FlagField::Abstract) && node.flag(FlagField::FirstClass) {
            out.push(Finding::error(
                node.id(),
                codes::ABSTRACT_FIRST_CLASS,
                format!("resource '{}' cannot be abstract and first class", node.name()),
            ));
        }
    }
}

impl ValidationOracle for BasicRules {
    fn findings(&self, model: &Model, subject: NodeId) -> Findings {
        let mut out = Findings::new();
        for id in model.descendants(subject) {
            if !model.is_live(id) {
                continue;
            }
            if let Some(node) = model.node(id) {
                self.check_node(model, node, &mut out);
            }
        }
        out
    }
}

/// Siblings only clash with siblings of the same family.
fn family(kind: NodeKind) -> u8 {
    match kind {
        NodeKind::Library => 0,
        NodeKind::Member(_) => 1,
        NodeKind::Property(_) | NodeKind::Alias => 2,
        NodeKind::ResourceChild(_) => 3,
    }
}

/// Letter or underscore first, then letters, digits, `_`, `-` or `.`.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResourceChildKind, Version};

    fn library(model: &mut Model) -> NodeId {
        model.add_library("Lib", "urn:lib", Version::new(1, 0, 0), true)
    }

    fn codes_of(findings: &Findings) -> Vec<&str> {
        findings.iter().map(|f| f.code.as_str()).collect()
    }

    #[test]
    fn name_rules() {
        assert!(is_valid_name("Profile"));
        assert!(is_valid_name("_x-1.a"));
        assert!(!is_valid_name("1abc"));
        assert!(!is_valid_name("has space"));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn empty_and_invalid_names_are_errors() {
        let mut model = Model::new();
        let lib = library(&mut model);
        let bo = model
            .add_member(lib, MemberKind::BusinessObject, "Profile")
            .unwrap();
        model
            .set_text(bo, TextField::Description, "A profile")
            .unwrap();
        assert!(BasicRules.findings(&model, bo).is_empty());

        model.set_text(bo, TextField::Name, "").unwrap();
        assert_eq!(codes_of(&BasicRules.findings(&model, bo)), [codes::NAME_REQUIRED]);

        model.set_text(bo, TextField::Name, "9lives").unwrap();
        assert_eq!(codes_of(&BasicRules.findings(&model, bo)), [codes::INVALID_NAME]);
    }

    #[test]
    fn duplicate_siblings_in_same_family() {
        let mut model = Model::new();
        let lib = library(&mut model);
        let bo = model
            .add_member(lib, MemberKind::CoreObject, "Thing")
            .unwrap();
        let first = model.add_alias(bo, "Alt").unwrap();
        let second = model.add_alias(bo, "Other").unwrap();
        assert!(BasicRules.findings(&model, second).is_empty());

        model.set_text(second, TextField::Name, "Alt").unwrap();
        let findings = BasicRules.findings(&model, second);
        assert!(findings.has_code(codes::DUPLICATE_NAME));

        // A removed sibling no longer clashes.
        model.detach(first).unwrap();
        assert!(BasicRules.findings(&model, second).is_empty());
    }

    #[test]
    fn property_types() {
        let mut model = Model::new();
        let lib = library(&mut model);
        let bo = model
            .add_member(lib, MemberKind::BusinessObject, "Order")
            .unwrap();
        let api = model.add_member(lib, MemberKind::Resource, "OrderApi").unwrap();
        let amount = model
            .add_property(bo, PropertyKind::Attribute, "amount")
            .unwrap();
        let flag = model
            .add_property(bo, PropertyKind::Indicator, "paid")
            .unwrap();

        assert_eq!(codes_of(&BasicRules.findings(&model, amount)), [codes::MISSING_TYPE]);
        assert!(BasicRules.findings(&model, flag).is_empty());

        model.set_assigned_type(amount, Some(api)).unwrap();
        assert_eq!(
            codes_of(&BasicRules.findings(&model, amount)),
            [codes::ILLEGAL_TYPE_ASSIGNMENT]
        );

        model.set_assigned_type(amount, Some(bo)).unwrap();
        assert!(BasicRules.findings(&model, amount).is_empty());
    }

    #[test]
    fn resource_rules() {
        let mut model = Model::new();
        let lib = library(&mut model);
        let simple = model.add_member(lib, MemberKind::SimpleType, "Code").unwrap();
        let api = model.add_member(lib, MemberKind::Resource, "Api").unwrap();
        model.set_text(api, TextField::Description, "api").unwrap();
        model
            .add_resource_child(api, ResourceChildKind::Action, "Get")
            .unwrap();
        assert!(BasicRules.findings(&model, api).is_empty());

        model.set_flag(api, FlagField::FirstClass, true).unwrap();
        model.set_flag(api, FlagField::Abstract, true).unwrap();
        assert!(BasicRules.findings(&model, api).has_code(codes::ABSTRACT_FIRST_CLASS));

        model.set_flag(api, FlagField::Abstract, false).unwrap();
        model.set_assigned_type(api, Some(simple)).unwrap();
        assert!(BasicRules.findings(&model, api).has_code(codes::ILLEGAL_TYPE_ASSIGNMENT));
    }

    #[test]
    fn missing_description_is_a_warning() {
        let mut model = Model::new();
        let lib = library(&mut model);
        let member = model.add_member(lib, MemberKind::ChoiceObject, "Pick").unwrap();
        let findings = BasicRules.findings(&model, member);
        assert_eq!(codes_of(&findings), [codes::MISSING_DESCRIPTION]);
        assert!(crate::validation::VetoPolicy::default().vetoes(&findings).is_empty());
    }
}
