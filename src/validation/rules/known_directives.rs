use crate::ast::{
    Directive, Field, Fragment, FragmentSpread, InlineFragment, Operation, OperationType,
};
use crate::parser::Spanning;
use crate::schema::DirectiveLocation;
use crate::validation::{ValidatorContext, Visitor};

pub struct KnownDirectives {
    location_stack: Vec<DirectiveLocation>,
}

pub fn factory() -> KnownDirectives {
    KnownDirectives {
        location_stack: Vec::new(),
    }
}

impl<'a> Visitor<'a> for KnownDirectives {
    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation>,
    ) {
        self.location_stack.push(match op.item.operation_type {
            OperationType::Query => DirectiveLocation::Query,
            OperationType::Mutation => DirectiveLocation::Mutation,
            OperationType::Subscription => DirectiveLocation::Subscription,
        });
    }

    fn exit_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Operation>,
    ) {
        let top = self.location_stack.pop();
        assert!(matches!(
            top,
            Some(
                DirectiveLocation::Query
                    | DirectiveLocation::Mutation
                    | DirectiveLocation::Subscription
            ),
        ));
    }

    fn enter_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field>) {
        self.location_stack.push(DirectiveLocation::Field);
    }

    fn exit_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field>) {
        let top = self.location_stack.pop();
        assert_eq!(top, Some(DirectiveLocation::Field));
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Fragment>,
    ) {
        self.location_stack
            .push(DirectiveLocation::FragmentDefinition);
    }

    fn exit_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Fragment>,
    ) {
        let top = self.location_stack.pop();
        assert_eq!(top, Some(DirectiveLocation::FragmentDefinition));
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<FragmentSpread>,
    ) {
        self.location_stack.push(DirectiveLocation::FragmentSpread);
    }

    fn exit_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<FragmentSpread>,
    ) {
        let top = self.location_stack.pop();
        assert_eq!(top, Some(DirectiveLocation::FragmentSpread));
    }

    fn enter_inline_fragment(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<InlineFragment>,
    ) {
        self.location_stack.push(DirectiveLocation::InlineFragment);
    }

    fn exit_inline_fragment(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<InlineFragment>,
    ) {
        let top = self.location_stack.pop();
        assert_eq!(top, Some(DirectiveLocation::InlineFragment));
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive>,
    ) {
        let directive_name = &directive.item.name.item;

        let Some(directive_type) = ctx.schema.directive_by_name(directive_name) else {
            ctx.report_error(&unknown_error_message(directive_name), &[directive.start]);
            return;
        };

        if let Some(current_location) = self.location_stack.last() {
            if !directive_type
                .locations
                .iter()
                .any(|l| l == current_location)
            {
                ctx.report_error(
                    &misplaced_error_message(directive_name, current_location),
                    &[directive.start],
                );
            }
        }
    }
}

fn unknown_error_message(directive_name: &str) -> String {
    format!("Unknown directive \"{directive_name}\".")
}

fn misplaced_error_message(directive_name: &str, location: &DirectiveLocation) -> String {
    format!("Directive \"{directive_name}\" may not be used on \"{location}\".")
}
