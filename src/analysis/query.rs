//! Fluent node selection over an AST subtree.
//!
//! A [`Query`] pairs a root node with a category (references or calls),
//! a recursion mode, and a conjunction of attribute filters. Attribute
//! lookup goes through an explicit accessor table; filtering on an
//! attribute the table does not know is a caller error, never a silent
//! non-match.

use crate::core::{Ast, Category, Expr, NodeId};
use crate::errors::QueryError;

#[derive(Clone, Debug)]
enum Expected {
    /// Single value, matched by equality.
    Equals(String),
    /// Value set, matched by membership.
    Within(Vec<String>),
}

#[derive(Clone, Debug)]
struct Filter {
    attribute: String,
    expected: Expected,
}

/// Immutable fluent selector. Category and recursion are independent
/// and re-settable; the four selector methods each reset both.
#[derive(Clone)]
pub struct Query<'a> {
    ast: &'a Ast,
    root: NodeId,
    category: Option<Category>,
    recursive: bool,
    filters: Vec<Filter>,
}

impl<'a> Query<'a> {
    pub fn new(ast: &'a Ast, root: NodeId) -> Self {
        Query {
            ast,
            root,
            category: None,
            recursive: false,
            filters: Vec::new(),
        }
    }

    /// References among the root's immediate children.
    pub fn references(mut self) -> Self {
        self.category = Some(Category::Reference);
        self.recursive = false;
        self
    }

    /// References anywhere in the root's subtree.
    pub fn all_references(mut self) -> Self {
        self.category = Some(Category::Reference);
        self.recursive = true;
        self
    }

    /// Calls among the root's immediate children.
    pub fn calls(mut self) -> Self {
        self.category = Some(Category::Call);
        self.recursive = false;
        self
    }

    /// Calls anywhere in the root's subtree.
    pub fn all_calls(mut self) -> Self {
        self.category = Some(Category::Call);
        self.recursive = true;
        self
    }

    pub fn where_name(self, name: impl Into<String>) -> Self {
        self.where_attribute("name", name)
    }

    pub fn where_name_in(self, names: Vec<String>) -> Self {
        self.where_attribute_in("name", names)
    }

    pub fn where_result(self, result: impl Into<String>) -> Self {
        self.where_attribute("result", result)
    }

    pub fn where_result_in(self, results: Vec<String>) -> Self {
        self.where_attribute_in("result", results)
    }

    /// Require `attribute` to equal `value`. Filters combine with AND.
    pub fn where_attribute(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter {
            attribute: attribute.into(),
            expected: Expected::Equals(value.into()),
        });
        self
    }

    /// Require `attribute` to be one of `values`.
    pub fn where_attribute_in(mut self, attribute: impl Into<String>, values: Vec<String>) -> Self {
        self.filters.push(Filter {
            attribute: attribute.into(),
            expected: Expected::Within(values),
        });
        self
    }

    /// Execute the query, yielding matches in document order.
    ///
    /// With no category selected there is nothing to match and the
    /// result is an empty sequence.
    pub fn get(&self) -> Result<Vec<NodeId>, QueryError> {
        let Some(category) = self.category else {
            return Ok(Vec::new());
        };
        let mut matches = Vec::new();
        'candidates: for id in self.ast.filter(self.root, category, self.recursive) {
            // Both categories select expression nodes.
            let Some(expr) = self.ast.expr(id) else {
                continue;
            };
            for filter in &self.filters {
                let actual = attribute_of(expr, &filter.attribute)?;
                let passes = match &filter.expected {
                    Expected::Equals(value) => actual == value,
                    Expected::Within(values) => values.iter().any(|v| v == actual),
                };
                if !passes {
                    continue 'candidates;
                }
            }
            matches.push(id);
        }
        Ok(matches)
    }
}

/// Accessor table for filterable expression attributes.
fn attribute_of<'e>(expr: &'e Expr, attribute: &str) -> Result<&'e str, QueryError> {
    match attribute {
        "name" => Ok(&expr.name),
        "result" => Ok(&expr.result),
        _ => Err(QueryError::UnknownAttribute(attribute.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AstBuilder, RefTarget};

    fn sample() -> (Ast, NodeId, [NodeId; 3]) {
        let mut b = AstBuilder::new();
        let f = b.function(b.root(), "f");
        let body = b.block(f);
        let s = b.statement(body);
        let foo = b.call(s, "foo", None);
        let bar = b.call(s, "bar", None);
        let nested = b.call(bar, "foo", None);
        (b.build(), f, [foo, bar, nested])
    }

    #[test]
    fn get_without_category_is_empty() {
        let (ast, f, _) = sample();
        assert_eq!(Query::new(&ast, f).get().unwrap(), vec![]);
    }

    #[test]
    fn name_filter_selects_in_document_order() {
        let (ast, f, [foo, _, nested]) = sample();
        let hits = Query::new(&ast, f)
            .all_calls()
            .where_name("foo")
            .get()
            .unwrap();
        assert_eq!(hits, vec![foo, nested]);
    }

    #[test]
    fn membership_filter_uses_value_set() {
        let (ast, f, [foo, bar, nested]) = sample();
        let hits = Query::new(&ast, f)
            .all_calls()
            .where_name_in(vec!["foo".into(), "bar".into()])
            .get()
            .unwrap();
        assert_eq!(hits, vec![foo, bar, nested]);
    }

    #[test]
    fn selector_methods_reset_category_and_recursion() {
        let (ast, f, [foo, bar, _]) = sample();
        let q = Query::new(&ast, f).all_calls().references();
        // Non-recursive from the function root finds nothing: the
        // calls sit below the body block.
        assert_eq!(q.clone().get().unwrap(), vec![]);
        let s = ast.children(ast.children(f)[0])[0];
        let hits = Query::new(&ast, s).calls().get().unwrap();
        assert_eq!(hits, vec![foo, bar]);
    }

    #[test]
    fn unknown_attribute_is_an_error() {
        let (ast, f, _) = sample();
        let err = Query::new(&ast, f)
            .all_calls()
            .where_attribute("arity", "2")
            .get()
            .unwrap_err();
        assert_eq!(err, QueryError::UnknownAttribute("arity".into()));
    }

    #[test]
    fn filters_are_conjunctive() {
        let mut b = AstBuilder::new();
        let s = b.statement(b.root());
        let r1 = b.reference(s, "x", RefTarget::Unresolved);
        b.set_result(r1, "int");
        let r2 = b.reference(s, "x", RefTarget::Unresolved);
        b.set_result(r2, "float");
        let ast = b.build();

        let hits = Query::new(&ast, s)
            .references()
            .where_name("x")
            .where_result("int")
            .get()
            .unwrap();
        assert_eq!(hits, vec![r1]);
    }
}
