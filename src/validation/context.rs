use std::fmt;

use fnv::{FnvHashMap, FnvHashSet};

use crate::ast::{Definition, Document, Fragment, Type};
use crate::parser::{SourcePosition, Spanning};
use crate::schema::meta::MetaType;
use crate::schema::SchemaType;

/// Query validation error
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct RuleError {
    locations: Vec<SourcePosition>,
    message: String,
}

impl RuleError {
    #[doc(hidden)]
    pub fn new(message: &str, locations: &[SourcePosition]) -> RuleError {
        RuleError {
            message: message.into(),
            locations: locations.to_vec(),
        }
    }

    /// Access the message of a validation error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Access the positions of the validation error
    ///
    /// All validation errors contain at least one source position, but some
    /// validators supply extra context through multiple positions.
    pub fn locations(&self) -> &[SourcePosition] {
        &self.locations
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let locations = self
            .locations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}. At {locations}", self.message)
    }
}

impl std::error::Error for RuleError {}

/// The state threaded through a validation traversal: the schema, the
/// accumulated errors and the stacks describing where in the type tree the
/// traversal currently is.
pub struct ValidatorContext<'a> {
    /// The schema the document is validated against.
    pub schema: &'a SchemaType,
    errors: Vec<RuleError>,
    type_stack: Vec<Option<&'a MetaType>>,
    type_literal_stack: Vec<Option<Type>>,
    input_type_stack: Vec<Option<&'a MetaType>>,
    input_type_literal_stack: Vec<Option<Type>>,
    parent_type_stack: Vec<Option<&'a MetaType>>,
    fragments: FnvHashMap<&'a str, &'a Spanning<Fragment>>,
    spread_fragments_visited: FnvHashSet<&'a str>,
}

impl<'a> ValidatorContext<'a> {
    #[doc(hidden)]
    pub fn new(schema: &'a SchemaType, document: &'a Document) -> ValidatorContext<'a> {
        ValidatorContext {
            errors: Vec::new(),
            schema,
            type_stack: Vec::new(),
            type_literal_stack: Vec::new(),
            parent_type_stack: Vec::new(),
            input_type_stack: Vec::new(),
            input_type_literal_stack: Vec::new(),
            fragments: document
                .iter()
                .filter_map(|def| match def {
                    Definition::Fragment(frag) => {
                        Some((frag.item.name.item.as_str(), frag))
                    }
                    _ => None,
                })
                .collect(),
            spread_fragments_visited: FnvHashSet::default(),
        }
    }

    #[doc(hidden)]
    pub fn append_errors(&mut self, mut errors: Vec<RuleError>) {
        self.errors.append(&mut errors);
    }

    #[doc(hidden)]
    pub fn report_error(&mut self, message: &str, locations: &[SourcePosition]) {
        self.errors.push(RuleError::new(message, locations))
    }

    pub(crate) fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[doc(hidden)]
    pub fn into_errors(mut self) -> Vec<RuleError> {
        self.errors.sort();
        self.errors
    }

    #[doc(hidden)]
    pub fn with_pushed_type<F, R>(&mut self, t: Option<&Type>, f: F) -> R
    where
        F: FnOnce(&mut ValidatorContext<'a>) -> R,
    {
        if let Some(t) = t {
            self.type_stack
                .push(self.schema.concrete_type_by_name(t.innermost_name()));
        } else {
            self.type_stack.push(None);
        }

        self.type_literal_stack.push(t.cloned());

        let res = f(self);

        self.type_literal_stack.pop();
        self.type_stack.pop();

        res
    }

    #[doc(hidden)]
    pub fn with_pushed_parent_type<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut ValidatorContext<'a>) -> R,
    {
        self.parent_type_stack
            .push(*self.type_stack.last().unwrap_or(&None));
        let res = f(self);
        self.parent_type_stack.pop();

        res
    }

    #[doc(hidden)]
    pub fn with_pushed_input_type<F, R>(&mut self, t: Option<&Type>, f: F) -> R
    where
        F: FnOnce(&mut ValidatorContext<'a>) -> R,
    {
        if let Some(t) = t {
            self.input_type_stack
                .push(self.schema.concrete_type_by_name(t.innermost_name()));
        } else {
            self.input_type_stack.push(None);
        }

        self.input_type_literal_stack.push(t.cloned());

        let res = f(self);

        self.input_type_literal_stack.pop();
        self.input_type_stack.pop();

        res
    }

    /// The type the traversal currently is at, if known.
    pub fn current_type(&self) -> Option<&'a MetaType> {
        *self.type_stack.last().unwrap_or(&None)
    }

    /// The type literal the traversal currently is at, if known.
    pub fn current_type_literal(&self) -> Option<&Type> {
        match self.type_literal_stack.last() {
            Some(Some(t)) => Some(t),
            _ => None,
        }
    }

    /// The type surrounding the current selection set, if known.
    pub fn parent_type(&self) -> Option<&'a MetaType> {
        *self.parent_type_stack.last().unwrap_or(&None)
    }

    /// The input type of the current argument or value position, if known.
    pub fn current_input_type(&self) -> Option<&'a MetaType> {
        *self.input_type_stack.last().unwrap_or(&None)
    }

    /// The input type literal of the current argument or value position, if
    /// known.
    pub fn current_input_type_literal(&self) -> Option<&Type> {
        match self.input_type_literal_stack.last() {
            Some(Some(t)) => Some(t),
            _ => None,
        }
    }

    /// Whether the document contains a fragment definition of this name.
    pub fn is_known_fragment(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }

    /// The fragment definition of this name, if the document contains one.
    pub fn fragment(&self, name: &str) -> Option<&'a Spanning<Fragment>> {
        self.fragments.get(name).copied()
    }

    /// Marks a spread fragment as traversed; returns whether it still needed
    /// traversal. Guards spread-dereferencing visitors against cycles.
    pub(crate) fn mark_spread_visited(&mut self, name: &'a str) -> bool {
        self.spread_fragments_visited.insert(name)
    }
}
