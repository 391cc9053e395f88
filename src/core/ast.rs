//! Arena-backed AST model consumed by the analysis engines.
//!
//! Nodes live in a flat arena indexed by [`NodeId`], each carrying a
//! parent back-link and a document-ordered child list. The model is
//! read-only during analysis; [`AstBuilder`] is the only way to grow it.
//! Statement indices are assigned per enclosing function and are only
//! comparable within that function.
//!
//! Function calls are a subtype of references: filtering for the
//! [`Category::Reference`] category also yields calls, while
//! [`Category::Call`] yields calls only.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::value::Value;

/// Handle to a node in the [`Ast`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node categories selectable by queries and the subtree filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    /// Any expression that names a symbol, including calls.
    Reference,
    /// Function call expressions only.
    Call,
}

impl Category {
    /// Whether a node of the given kind belongs to this category.
    pub fn matches(self, kind: &NodeKind) -> bool {
        match kind {
            NodeKind::Expr(expr) => match self {
                Category::Reference => {
                    matches!(expr.kind, ExprKind::Reference(_) | ExprKind::Call { .. })
                }
                Category::Call => matches!(expr.kind, ExprKind::Call { .. }),
            },
            _ => false,
        }
    }
}

/// Kind of control-flow construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKind {
    If,
    While,
    For,
    Switch,
}

/// A function definition.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    /// Parameter variables, in declaration order.
    pub parameters: Vec<NodeId>,
    /// References and calls pointing to this function (its use sites).
    pub references: Vec<NodeId>,
}

/// A variable definition.
#[derive(Clone, Debug)]
pub struct Variable {
    pub name: String,
    /// Initializer expression, if the declaration has one.
    pub value: Option<NodeId>,
    pub is_parameter: bool,
    /// Assignment operators whose target is this variable.
    pub writes: Vec<NodeId>,
}

/// A statement in a function's linear body.
#[derive(Clone, Copy, Debug)]
pub struct Statement {
    /// Position within the enclosing function, strictly increasing.
    pub index: usize,
}

/// What a reference resolves to.
#[derive(Clone, Debug)]
pub enum RefTarget {
    /// A variable entity in the model.
    Variable(NodeId),
    /// A bare textual symbol the model could not resolve further.
    Symbol(String),
    /// No target recorded.
    Unresolved,
}

/// An expression node.
#[derive(Clone, Debug)]
pub struct Expr {
    /// Symbol name, operator symbol, or rendered literal.
    pub name: String,
    /// Result type name, as matched by query filters.
    pub result: String,
    pub kind: ExprKind,
}

/// Expression variants. Arguments of operators and calls are the
/// expression node's children, in order.
#[derive(Clone, Debug)]
pub enum ExprKind {
    Literal(Value),
    Reference(RefTarget),
    Operator,
    Call {
        /// The called function, when the model resolved it.
        callee: Option<NodeId>,
    },
    DefaultArgument,
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Function(Function),
    Variable(Variable),
    Statement(Statement),
    Block,
    ControlFlow(ControlKind),
    Expr(Expr),
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// The AST arena. Root is a global-scope block.
#[derive(Clone, Debug)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn expr(&self, id: NodeId) -> Option<&Expr> {
        match self.kind(id) {
            NodeKind::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn function(&self, id: NodeId) -> Option<&Function> {
        match self.kind(id) {
            NodeKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn variable(&self, id: NodeId) -> Option<&Variable> {
        match self.kind(id) {
            NodeKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// Index of a statement node within its function's linear body.
    pub fn statement_index(&self, id: NodeId) -> Option<usize> {
        match self.kind(id) {
            NodeKind::Statement(s) => Some(s.index),
            _ => None,
        }
    }

    /// An operator is binary when it has exactly two arguments.
    pub fn is_binary_operator(&self, id: NodeId) -> bool {
        matches!(
            self.kind(id),
            NodeKind::Expr(Expr {
                kind: ExprKind::Operator,
                ..
            })
        ) && self.children(id).len() == 2
    }

    /// Nearest enclosing statement, starting from `id` itself.
    pub fn enclosing_statement(&self, id: NodeId) -> Option<NodeId> {
        self.walk_up(id, |kind| matches!(kind, NodeKind::Statement(_)))
    }

    /// Nearest enclosing function, starting from `id` itself.
    pub fn enclosing_function(&self, id: NodeId) -> Option<NodeId> {
        self.walk_up(id, |kind| matches!(kind, NodeKind::Function(_)))
    }

    fn walk_up(&self, id: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if pred(self.kind(node)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Subtree filter: nodes under `root` matching `category`, in
    /// document order. Non-recursive mode inspects only the root's
    /// immediate children; recursive mode walks the full descendant
    /// subtree. The root itself is never yielded.
    pub fn filter(&self, root: NodeId, category: Category, recursive: bool) -> Vec<NodeId> {
        let mut matches = Vec::new();
        if recursive {
            self.collect(root, category, &mut matches);
        } else {
            for &child in self.children(root) {
                if category.matches(self.kind(child)) {
                    matches.push(child);
                }
            }
        }
        matches
    }

    fn collect(&self, node: NodeId, category: Category, out: &mut Vec<NodeId>) {
        for &child in self.children(node) {
            if category.matches(self.kind(child)) {
                out.push(child);
            }
            self.collect(child, category, out);
        }
    }
}

/// Incremental construction of an [`Ast`].
///
/// The builder owns the bookkeeping the analysis relies on: statement
/// indices per function, write-site registration on variables, and
/// use-site registration on called functions.
pub struct AstBuilder {
    ast: Ast,
    next_statement_index: HashMap<Option<NodeId>, usize>,
}

impl AstBuilder {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Block,
        };
        AstBuilder {
            ast: Ast { nodes: vec![root] },
            next_statement_index: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn build(self) -> Ast {
        self.ast
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.ast.nodes.len() as u32);
        self.ast.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.ast.nodes[parent.index()].children.push(id);
        id
    }

    pub fn function(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        self.push(
            parent,
            NodeKind::Function(Function {
                name: name.into(),
                parameters: Vec::new(),
                references: Vec::new(),
            }),
        )
    }

    /// Declare a parameter of `function`, appended in declaration order.
    pub fn parameter(&mut self, function: NodeId, name: impl Into<String>) -> NodeId {
        let id = self.push(
            function,
            NodeKind::Variable(Variable {
                name: name.into(),
                value: None,
                is_parameter: true,
                writes: Vec::new(),
            }),
        );
        match &mut self.ast.nodes[function.index()].kind {
            NodeKind::Function(f) => f.parameters.push(id),
            _ => panic!("parameter declared on a non-function node"),
        }
        id
    }

    pub fn variable(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        self.push(
            parent,
            NodeKind::Variable(Variable {
                name: name.into(),
                value: None,
                is_parameter: false,
                writes: Vec::new(),
            }),
        )
    }

    /// Record `value` as the variable's declaration initializer.
    pub fn set_initial_value(&mut self, variable: NodeId, value: NodeId) {
        match &mut self.ast.nodes[variable.index()].kind {
            NodeKind::Variable(v) => v.value = Some(value),
            _ => panic!("initial value set on a non-variable node"),
        }
    }

    pub fn block(&mut self, parent: NodeId) -> NodeId {
        self.push(parent, NodeKind::Block)
    }

    pub fn control_flow(&mut self, parent: NodeId, kind: ControlKind) -> NodeId {
        self.push(parent, NodeKind::ControlFlow(kind))
    }

    /// Append a statement; its index is the next slot in the enclosing
    /// function's linear body (or the global scope when there is none).
    pub fn statement(&mut self, parent: NodeId) -> NodeId {
        let scope = self.ast.enclosing_function(parent);
        let counter = self.next_statement_index.entry(scope).or_insert(0);
        let index = *counter;
        *counter += 1;
        self.push(parent, NodeKind::Statement(Statement { index }))
    }

    pub fn literal(&mut self, parent: NodeId, value: Value) -> NodeId {
        let expr = Expr {
            name: value.to_string(),
            result: value.result_type().to_string(),
            kind: ExprKind::Literal(value),
        };
        self.push(parent, NodeKind::Expr(expr))
    }

    pub fn reference(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        target: RefTarget,
    ) -> NodeId {
        self.push(
            parent,
            NodeKind::Expr(Expr {
                name: name.into(),
                result: String::new(),
                kind: ExprKind::Reference(target),
            }),
        )
    }

    /// Build a call expression; arguments are added as its children.
    /// A resolved callee gets this call registered as a use site.
    pub fn call(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        callee: Option<NodeId>,
    ) -> NodeId {
        let id = self.push(
            parent,
            NodeKind::Expr(Expr {
                name: name.into(),
                result: String::new(),
                kind: ExprKind::Call { callee },
            }),
        );
        if let Some(function) = callee {
            self.register_reference(function, id);
        }
        id
    }

    pub fn operator(&mut self, parent: NodeId, symbol: impl Into<String>) -> NodeId {
        self.push(
            parent,
            NodeKind::Expr(Expr {
                name: symbol.into(),
                result: String::new(),
                kind: ExprKind::Operator,
            }),
        )
    }

    pub fn default_argument(&mut self, parent: NodeId) -> NodeId {
        self.push(
            parent,
            NodeKind::Expr(Expr {
                name: String::new(),
                result: String::new(),
                kind: ExprKind::DefaultArgument,
            }),
        )
    }

    /// Override the result type recorded on an expression node.
    pub fn set_result(&mut self, expr: NodeId, result: impl Into<String>) {
        match &mut self.ast.nodes[expr.index()].kind {
            NodeKind::Expr(e) => e.result = result.into(),
            _ => panic!("result type set on a non-expression node"),
        }
    }

    /// Register an assignment operator as a write-site of `variable`.
    /// The operator's first child is the target reference, its second
    /// the assigned expression.
    pub fn mark_write(&mut self, variable: NodeId, operator: NodeId) {
        debug_assert!(matches!(
            self.ast.kind(operator),
            NodeKind::Expr(Expr {
                kind: ExprKind::Operator,
                ..
            })
        ));
        match &mut self.ast.nodes[variable.index()].kind {
            NodeKind::Variable(v) => v.writes.push(operator),
            _ => panic!("write-site registered on a non-variable node"),
        }
    }

    /// Register a reference or call as a use site of `function`.
    pub fn register_reference(&mut self, function: NodeId, reference: NodeId) {
        match &mut self.ast.nodes[function.index()].kind {
            NodeKind::Function(f) => f.references.push(reference),
            _ => panic!("use site registered on a non-function node"),
        }
    }
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}
