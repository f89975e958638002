//! Document validation and execution planning
//!
//! Validation happens before any resolver runs. The planner walks the chosen
//! operation against the schema, expanding fragments, evaluating `@skip` and
//! `@include`, substituting variables and merging fields that share a
//! response key. The result is a tree of [`PlannedField`]s; if any rule is
//! violated, all collected errors are returned instead.

use super::utils;
use crate::core::GraphQLError;
use crate::schema::{FieldDef, ObjectType, Schema};
use graphql_parser::Pos;
use graphql_parser::query::{
    Definition, Directive, Document, Field, FragmentDefinition, OperationDefinition, Selection,
    SelectionSet, Type, TypeCondition, Value as GqlValue, VariableDefinition,
};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Input scalar types a variable may be declared with
const INPUT_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// Which root type an operation executes against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// A validated field, ready to execute
#[derive(Debug)]
pub struct PlannedField<'s> {
    /// Key under which the value appears in the response (alias or name)
    pub response_key: String,
    pub name: String,
    pub definition: &'s FieldDef,
    /// Argument values with variables substituted; absent variables are omitted
    pub arguments: Map<String, Value>,
    pub position: Pos,
    /// Merged sub-selection; empty for scalar fields
    pub selection: Vec<PlannedField<'s>>,
}

/// A validated operation
#[derive(Debug)]
pub struct OperationPlan<'s> {
    pub kind: OperationKind,
    pub fields: Vec<PlannedField<'s>>,
}

/// Validate `document` and plan the operation to run
pub fn plan<'s, 'd>(
    schema: &'s Schema,
    document: &'d Document<'d, String>,
    operation_name: Option<&str>,
    variables: &Map<String, Value>,
) -> Result<OperationPlan<'s>, Vec<GraphQLError>> {
    let mut planner = Planner::new(schema);

    for definition in &document.definitions {
        if let Definition::Fragment(fragment) = definition {
            planner.register_fragment(fragment);
        }
    }

    let operation = select_operation(document, operation_name).map_err(|e| vec![e])?;

    let (kind, variable_definitions, selection_set) = match operation {
        OperationDefinition::SelectionSet(set) => (OperationKind::Query, &[][..], set),
        OperationDefinition::Query(query) => (
            OperationKind::Query,
            &query.variable_definitions[..],
            &query.selection_set,
        ),
        OperationDefinition::Mutation(mutation) => (
            OperationKind::Mutation,
            &mutation.variable_definitions[..],
            &mutation.selection_set,
        ),
        OperationDefinition::Subscription(subscription) => {
            return Err(vec![GraphQLError::validation(
                "Subscriptions are not supported",
                subscription.position,
            )]);
        }
    };

    planner.bind_variables(variable_definitions, variables);

    let root = match kind {
        OperationKind::Query => schema.query_type(),
        OperationKind::Mutation => schema.mutation_type(),
    };
    let Some(root) = root else {
        return Err(vec![GraphQLError::validation(
            format!("Schema is not configured for {:?} operations", kind),
            selection_set.span.0,
        )]);
    };

    let fields = planner.plan_selection(root, &[selection_set]);

    if planner.errors.is_empty() {
        Ok(OperationPlan { kind, fields })
    } else {
        Err(planner.errors)
    }
}

fn select_operation<'d>(
    document: &'d Document<'d, String>,
    operation_name: Option<&str>,
) -> Result<&'d OperationDefinition<'d, String>, GraphQLError> {
    let operations: Vec<_> = document
        .definitions
        .iter()
        .filter_map(|def| match def {
            Definition::Operation(op) => Some(op),
            Definition::Fragment(_) => None,
        })
        .collect();

    match operation_name {
        Some(name) => operations
            .into_iter()
            .find(|op| operation_name_of(op) == Some(name))
            .ok_or_else(|| {
                GraphQLError::new(format!("Unknown operation named \"{}\".", name))
                    .with_code("GRAPHQL_VALIDATION_FAILED")
            }),
        None => match operations.as_slice() {
            [] => Err(GraphQLError::new("No operation found in query")
                .with_code("GRAPHQL_VALIDATION_FAILED")),
            [single] => Ok(single),
            _ => Err(GraphQLError::new(
                "Must provide operation name if query contains multiple operations.",
            )
            .with_code("GRAPHQL_VALIDATION_FAILED")),
        },
    }
}

fn operation_name_of<'d>(operation: &'d OperationDefinition<'_, String>) -> Option<&'d str> {
    match operation {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(q) => q.name.as_deref(),
        OperationDefinition::Mutation(m) => m.name.as_deref(),
        OperationDefinition::Subscription(s) => s.name.as_deref(),
    }
}

struct Planner<'s, 'd> {
    schema: &'s Schema,
    fragments: HashMap<&'d str, &'d FragmentDefinition<'d, String>>,
    /// Declared variable names
    defined: HashSet<String>,
    /// Variable values in effect (provided or defaulted)
    variables: Map<String, Value>,
    errors: Vec<GraphQLError>,
}

impl<'s, 'd> Planner<'s, 'd> {
    fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            fragments: HashMap::new(),
            defined: HashSet::new(),
            variables: Map::new(),
            errors: Vec::new(),
        }
    }

    fn error(&mut self, message: impl Into<String>, position: Pos) {
        self.errors.push(GraphQLError::validation(message, position));
    }

    fn register_fragment(&mut self, fragment: &'d FragmentDefinition<'d, String>) {
        if self.fragments.insert(fragment.name.as_str(), fragment).is_some() {
            self.error(
                format!("There can be only one fragment named \"{}\".", fragment.name),
                fragment.position,
            );
        }
    }

    fn bind_variables(
        &mut self,
        definitions: &[VariableDefinition<'_, String>],
        provided: &Map<String, Value>,
    ) {
        for definition in definitions {
            let name = &definition.name;
            self.defined.insert(name.clone());

            let base = utils::base_type_name(&definition.var_type);
            if !INPUT_SCALARS.contains(&base) {
                self.error(format!("Unknown type \"{}\".", base), definition.position);
                continue;
            }

            let required = matches!(definition.var_type, Type::NonNullType(_));
            match provided.get(name) {
                Some(Value::Null) if required => self.error(
                    format!(
                        "Variable \"${}\" of non-null type \"{}\" must not be null.",
                        name,
                        utils::type_to_string(&definition.var_type)
                    ),
                    definition.position,
                ),
                Some(value) => {
                    self.variables.insert(name.clone(), value.clone());
                }
                None => match &definition.default_value {
                    Some(default) if utils::has_non_finite_float(default) => self.error(
                        format!(
                            "Variable \"${}\" has an invalid default value: \
                             Float cannot represent a non-finite value.",
                            name
                        ),
                        definition.position,
                    ),
                    Some(default) => {
                        let value = utils::gql_value_to_json(default, &Map::new());
                        self.variables.insert(name.clone(), value);
                    }
                    None if required => self.error(
                        format!(
                            "Variable \"${}\" of required type \"{}\" was not provided.",
                            name,
                            utils::type_to_string(&definition.var_type)
                        ),
                        definition.position,
                    ),
                    None => {}
                },
            }
        }
    }

    /// Report every variable in `value` that the operation does not declare
    fn check_variables(&mut self, value: &GqlValue<String>, position: Pos) {
        let mut names = Vec::new();
        utils::referenced_variables(value, &mut names);
        for name in names {
            if !self.defined.contains(name) {
                self.error(format!("Variable \"${}\" is not defined.", name), position);
            }
        }
    }

    /// Evaluate `@skip` / `@include`; unknown directives are errors
    fn should_include(&mut self, directives: &[Directive<'_, String>]) -> bool {
        let mut include = true;

        for directive in directives {
            let name = directive.name.as_str();
            if name != "skip" && name != "include" {
                self.error(format!("Unknown directive \"@{}\".", name), directive.position);
                include = false;
                continue;
            }

            let condition = directive
                .arguments
                .iter()
                .find(|(arg, _)| arg == "if")
                .map(|(_, value)| value);
            let Some(condition) = condition else {
                self.error(
                    format!(
                        "Directive \"@{}\" argument \"if\" of type \"Boolean!\" is required, but it was not provided.",
                        name
                    ),
                    directive.position,
                );
                include = false;
                continue;
            };

            self.check_variables(condition, directive.position);
            match utils::gql_value_to_json(condition, &self.variables) {
                Value::Bool(flag) => {
                    if (name == "skip") == flag {
                        include = false;
                    }
                }
                other => {
                    self.error(
                        format!(
                            "Argument \"if\" of directive \"@{}\" has invalid value {}. Expected type \"Boolean!\".",
                            name, other
                        ),
                        directive.position,
                    );
                    include = false;
                }
            }
        }

        include
    }

    fn type_condition_matches(
        &mut self,
        object: &ObjectType,
        condition: &TypeCondition<'_, String>,
        fragment_name: Option<&str>,
        position: Pos,
    ) -> bool {
        let TypeCondition::On(type_name) = condition;

        if self.schema.object(type_name).is_none() {
            self.error(format!("Unknown type \"{}\".", type_name), position);
            return false;
        }

        if *type_name != object.name {
            let subject = match fragment_name {
                Some(name) => format!("Fragment \"{}\"", name),
                None => "Fragment".to_string(),
            };
            self.error(
                format!(
                    "{} cannot be spread here as objects of type \"{}\" can never be of type \"{}\".",
                    subject, object.name, type_name
                ),
                position,
            );
            return false;
        }

        true
    }

    /// Gather the fields of a selection set by response key, expanding fragments
    fn collect_fields(
        &mut self,
        object: &ObjectType,
        selection_set: &'d SelectionSet<'d, String>,
        visiting: &mut Vec<&'d str>,
        grouped: &mut IndexMap<String, Vec<&'d Field<'d, String>>>,
    ) {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => {
                    if !self.should_include(&field.directives) {
                        continue;
                    }
                    let key = field.alias.as_ref().unwrap_or(&field.name).clone();
                    grouped.entry(key).or_default().push(field);
                }
                Selection::FragmentSpread(spread) => {
                    if !self.should_include(&spread.directives) {
                        continue;
                    }
                    let name = spread.fragment_name.as_str();
                    let Some(fragment) = self.fragments.get(name).copied() else {
                        self.error(format!("Unknown fragment \"{}\".", name), spread.position);
                        continue;
                    };
                    if visiting.contains(&name) {
                        self.error(
                            format!("Cannot spread fragment \"{}\" within itself.", name),
                            spread.position,
                        );
                        continue;
                    }
                    if !self.type_condition_matches(
                        object,
                        &fragment.type_condition,
                        Some(name),
                        spread.position,
                    ) {
                        continue;
                    }

                    visiting.push(name);
                    self.collect_fields(object, &fragment.selection_set, visiting, grouped);
                    visiting.pop();
                }
                Selection::InlineFragment(inline) => {
                    if !self.should_include(&inline.directives) {
                        continue;
                    }
                    if let Some(condition) = &inline.type_condition
                        && !self.type_condition_matches(object, condition, None, inline.position)
                    {
                        continue;
                    }
                    self.collect_fields(object, &inline.selection_set, visiting, grouped);
                }
            }
        }
    }

    /// Plan the merged selection of one or more selection sets on `object`
    fn plan_selection(
        &mut self,
        object: &'s ObjectType,
        selection_sets: &[&'d SelectionSet<'d, String>],
    ) -> Vec<PlannedField<'s>> {
        let mut grouped = IndexMap::new();
        for selection_set in selection_sets {
            self.collect_fields(object, selection_set, &mut Vec::new(), &mut grouped);
        }

        grouped
            .into_iter()
            .filter_map(|(key, fields)| self.plan_field(object, key, &fields))
            .collect()
    }

    fn plan_field(
        &mut self,
        object: &'s ObjectType,
        response_key: String,
        fields: &[&'d Field<'d, String>],
    ) -> Option<PlannedField<'s>> {
        let [first, rest @ ..] = fields else {
            return None;
        };

        let Some(definition) = object.field(&first.name) else {
            self.error(
                format!(
                    "Cannot query field \"{}\" on type \"{}\".",
                    first.name, object.name
                ),
                first.position,
            );
            return None;
        };

        let arguments = self.plan_arguments(object, definition, first);

        for other in rest {
            if other.name != first.name {
                self.error(
                    format!(
                        "Fields \"{}\" conflict because \"{}\" and \"{}\" are different fields. \
                         Use different aliases on the fields to fetch both if this was intentional.",
                        response_key, first.name, other.name
                    ),
                    other.position,
                );
                return None;
            }
            if self.argument_values(other) != self.argument_values(first) {
                self.error(
                    format!(
                        "Fields \"{}\" conflict because they have differing arguments. \
                         Use different aliases on the fields to fetch both if this was intentional.",
                        response_key
                    ),
                    other.position,
                );
                return None;
            }
        }

        let selection = match definition.ty.object_name() {
            Some(type_name) => {
                let Some(target) = self.schema.object(type_name) else {
                    self.error(format!("Unknown type \"{}\".", type_name), first.position);
                    return None;
                };
                let sets: Vec<_> = fields
                    .iter()
                    .map(|field| &field.selection_set)
                    .filter(|set| !set.items.is_empty())
                    .collect();
                if sets.is_empty() {
                    self.error(
                        format!(
                            "Field \"{}\" of type \"{}\" must have a selection of subfields.",
                            first.name, definition.ty
                        ),
                        first.position,
                    );
                    return None;
                }
                self.plan_selection(target, &sets)
            }
            None => {
                if fields.iter().any(|field| !field.selection_set.items.is_empty()) {
                    self.error(
                        format!(
                            "Field \"{}\" must not have a selection since type \"{}\" has no subfields.",
                            first.name, definition.ty
                        ),
                        first.position,
                    );
                    return None;
                }
                Vec::new()
            }
        };

        Some(PlannedField {
            response_key,
            name: first.name.clone(),
            definition,
            arguments,
            position: first.position,
            selection,
        })
    }

    fn plan_arguments(
        &mut self,
        object: &ObjectType,
        definition: &FieldDef,
        field: &Field<'_, String>,
    ) -> Map<String, Value> {
        for (name, value) in &field.arguments {
            if definition.find_argument(name).is_none() {
                self.error(
                    format!(
                        "Unknown argument \"{}\" on field \"{}.{}\".",
                        name, object.name, field.name
                    ),
                    field.position,
                );
            }
            if utils::has_non_finite_float(value) {
                self.error(
                    format!(
                        "Argument \"{}\" on field \"{}.{}\" has an invalid value: \
                         Float cannot represent a non-finite value.",
                        name, object.name, field.name
                    ),
                    field.position,
                );
            }
            self.check_variables(value, field.position);
        }

        self.argument_values(field)
    }

    /// Argument values after variable substitution
    ///
    /// An argument given as a variable that was neither provided nor
    /// defaulted is left out, so it reads as absent.
    fn argument_values(&self, field: &Field<'_, String>) -> Map<String, Value> {
        field
            .arguments
            .iter()
            .filter(|(_, value)| match value {
                GqlValue::Variable(var) => self.variables.contains_key(var),
                _ => true,
            })
            .map(|(name, value)| {
                (
                    name.clone(),
                    utils::gql_value_to_json(value, &self.variables),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::storefront_schema;
    use graphql_parser::query::parse_query;
    use serde_json::json;

    fn plan_query(
        query: &str,
        operation_name: Option<&str>,
        variables: Value,
    ) -> Result<Vec<(String, Vec<String>)>, Vec<String>> {
        let schema = storefront_schema();
        let document = parse_query::<String>(query).unwrap();
        let variables = variables.as_object().cloned().unwrap_or_default();

        plan(&schema, &document, operation_name, &variables)
            .map(|plan| {
                plan.fields
                    .iter()
                    .map(|f| {
                        (
                            f.response_key.clone(),
                            f.selection.iter().map(|s| s.response_key.clone()).collect(),
                        )
                    })
                    .collect()
            })
            .map_err(|errors| errors.into_iter().map(|e| e.message).collect())
    }

    fn first_error(query: &str) -> String {
        plan_query(query, None, json!({})).unwrap_err().remove(0)
    }

    #[test]
    fn test_plain_query_plans() {
        let planned = plan_query("{ user(id: 1) { id name } }", None, json!({})).unwrap();
        assert_eq!(
            planned,
            vec![("user".to_string(), vec!["id".to_string(), "name".to_string()])]
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert_eq!(
            first_error("{ user(id: 1) { id nickname } }"),
            "Cannot query field \"nickname\" on type \"User\"."
        );
    }

    #[test]
    fn test_password_is_not_selectable() {
        assert!(first_error("{ users { password } }").contains("password"));
    }

    #[test]
    fn test_unknown_argument_is_rejected() {
        assert_eq!(
            first_error("{ user(uid: 1) { id } }"),
            "Unknown argument \"uid\" on field \"Query.user\"."
        );
    }

    #[test]
    fn test_leaf_and_object_selection_rules() {
        assert!(first_error("{ user(id: 1) }").contains("must have a selection"));
        assert!(first_error("{ users { id { x } } }").contains("must not have a selection"));
    }

    #[test]
    fn test_aliases_and_field_merging() {
        let planned = plan_query(
            "{ a: user(id: 1) { id } a: user(id: 1) { name } b: user(id: 2) { id } }",
            None,
            json!({}),
        )
        .unwrap();

        assert_eq!(
            planned,
            vec![
                ("a".to_string(), vec!["id".to_string(), "name".to_string()]),
                ("b".to_string(), vec!["id".to_string()]),
            ]
        );
    }

    #[test]
    fn test_conflicting_fields_are_rejected() {
        assert!(first_error("{ x: users { id } x: products { id } }").contains("different fields"));
        assert!(
            first_error("{ user(id: 1) { id } user(id: 2) { id } }")
                .contains("differing arguments")
        );
    }

    #[test]
    fn test_fragments_expand() {
        let planned = plan_query(
            r#"
            query { user(id: 1) { ...UserParts ... on User { email } } }
            fragment UserParts on User { id name }
            "#,
            None,
            json!({}),
        )
        .unwrap();

        assert_eq!(planned[0].1, vec!["id", "name", "email"]);
    }

    #[test]
    fn test_fragment_errors() {
        assert_eq!(
            first_error("{ users { ...Missing } }"),
            "Unknown fragment \"Missing\"."
        );
        assert!(
            first_error("{ users { ...P } } fragment P on Product { id }")
                .contains("can never be of type \"Product\"")
        );
        assert!(
            first_error(
                "{ users { ...A } } fragment A on User { ...B } fragment B on User { ...A }"
            )
            .contains("within itself")
        );
        assert!(
            first_error("{ users { ... on Ghost { id } } }").contains("Unknown type \"Ghost\"")
        );
    }

    #[test]
    fn test_skip_and_include() {
        let planned = plan_query(
            "query($hide: Boolean!) { users { id name @skip(if: $hide) email @include(if: false) } }",
            None,
            json!({ "hide": true }),
        )
        .unwrap();

        assert_eq!(planned[0].1, vec!["id"]);
    }

    #[test]
    fn test_overflowing_float_literal_is_rejected() {
        assert_eq!(
            first_error(
                "mutation { createProduct(name: \"W\", price: 1e400, inventory: 1) { id } }"
            ),
            "Argument \"price\" on field \"Mutation.createProduct\" has an invalid value: \
             Float cannot represent a non-finite value."
        );
        assert!(
            first_error("query($p: Float = -1e400) { products { id } }")
                .contains("invalid default value")
        );
    }

    #[test]
    fn test_unknown_directive_is_rejected() {
        assert_eq!(
            first_error("{ users { id @deprecated } }"),
            "Unknown directive \"@deprecated\"."
        );
    }

    #[test]
    fn test_variable_rules() {
        assert_eq!(
            first_error("{ user(id: $id) { id } }"),
            "Variable \"$id\" is not defined."
        );
        assert_eq!(
            first_error("query($id: Int!) { user(id: $id) { id } }"),
            "Variable \"$id\" of required type \"Int!\" was not provided."
        );
        assert_eq!(
            first_error("query($id: Money) { user(id: $id) { id } }"),
            "Unknown type \"Money\"."
        );
    }

    #[test]
    fn test_variable_defaults_and_substitution() {
        let schema = storefront_schema();
        let document = parse_query::<String>(
            "query($id: Int = 3, $other: Int) { a: user(id: $id) { id } b: user(id: $other) { id } }",
        )
        .unwrap();

        let plan = plan(&schema, &document, None, &Map::new()).unwrap();

        assert_eq!(plan.fields[0].arguments.get("id"), Some(&json!(3)));
        assert!(plan.fields[1].arguments.is_empty());
    }

    #[test]
    fn test_operation_selection() {
        let query = r#"
            query A { users { id } }
            mutation B { createUser(name: "a", email: "b", password: "c") { id } }
        "#;

        assert!(
            plan_query(query, None, json!({})).unwrap_err()[0]
                .starts_with("Must provide operation name")
        );
        assert_eq!(plan_query(query, Some("A"), json!({})).unwrap()[0].0, "users");
        assert_eq!(
            plan_query(query, Some("C"), json!({})).unwrap_err()[0],
            "Unknown operation named \"C\"."
        );

        let schema = storefront_schema();
        let document = parse_query::<String>(query).unwrap();
        let plan = plan(&schema, &document, Some("B"), &Map::new()).unwrap();
        assert_eq!(plan.kind, OperationKind::Mutation);
    }

    #[test]
    fn test_fragment_only_document_has_no_operation() {
        assert_eq!(
            first_error("fragment P on User { id }"),
            "No operation found in query"
        );
    }

    #[test]
    fn test_subscriptions_are_rejected() {
        assert_eq!(
            first_error("subscription { users { id } }"),
            "Subscriptions are not supported"
        );
    }
}
