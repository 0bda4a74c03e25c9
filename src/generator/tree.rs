use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use super::{Form, Generator, GeneratorConfig, derive};
use crate::cfg::{Cfg, Expression, NonTerminal, Symbol, Terminal};
use crate::index::SymbolIndex;
use crate::utils::{GrammarError, Result};

/// Index of a node inside its [`DerivationTree`]
pub type NodeId = usize;

#[derive(Debug, Serialize)]
struct Node<T> {
    symbol: Symbol<T>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Node {
            symbol: self.symbol.clone(),
            parent: self.parent,
            children: self.children.clone(),
        }
    }
}

/// The record of a derivation: the root holds the start symbol and every
/// expanded non-terminal holds the symbols of the chosen alternative as its
/// ordered children.
#[derive(Debug)]
pub struct DerivationTree<T = String> {
    nodes: Vec<Node<T>>,
}

impl<T> Clone for DerivationTree<T> {
    fn clone(&self) -> Self {
        DerivationTree {
            nodes: self.nodes.clone(),
        }
    }
}

impl<T> DerivationTree<T> {
    fn new(root: Symbol<T>) -> Self {
        DerivationTree {
            nodes: vec![Node {
                symbol: root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Append `symbols` as the children of `parent`, returning their ids
    fn attach(&mut self, parent: NodeId, symbols: &[Symbol<T>]) -> Vec<NodeId> {
        let first = self.nodes.len();
        for symbol in symbols {
            self.nodes.push(Node {
                symbol: symbol.clone(),
                parent: Some(parent),
                children: Vec::new(),
            });
        }
        let ids: Vec<NodeId> = (first..self.nodes.len()).collect();
        self.nodes[parent].children.extend(&ids);
        ids
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn symbol(&self, id: NodeId) -> &Symbol<T> {
        &self.nodes[id].symbol
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].children.is_empty()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of levels; a lone root has depth 1
    pub fn depth(&self) -> usize {
        self.preorder().into_iter().map(|(_, level)| level + 1).max().unwrap_or(0)
    }

    /// Node ids in depth-first order with their level below the root
    fn preorder(&self) -> Vec<(NodeId, usize)> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root(), 0)];
        while let Some((id, level)) = stack.pop() {
            order.push((id, level));
            for &child in self.nodes[id].children.iter().rev() {
                stack.push((child, level + 1));
            }
        }
        order
    }

    /// Leaf node ids from left to right
    pub fn leaves(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .map(|(id, _)| id)
            .filter(|&id| self.is_leaf(id))
            .collect()
    }

    /// The derived sentence: the terminals at the leaves, left to right
    pub fn terminals(&self) -> Vec<Arc<Terminal<T>>> {
        self.leaves()
            .into_iter()
            .filter_map(|id| self.symbol(id).as_terminal().cloned())
            .collect()
    }
}

impl<T> fmt::Display for DerivationTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (id, level)) in self.preorder().into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:indent$}{}", "", self.symbol(id), indent = level * 2)?;
        }
        Ok(())
    }
}

/// Serialized flat, as `{ "root": 0, "nodes": [...] }`: every node holds its
/// `symbol`, its `parent` id and its ordered `children` ids, and a node's id is
/// its position in `nodes`.
impl<T: Serialize> Serialize for DerivationTree<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DerivationTree", 2)?;
        state.serialize_field("root", &self.root())?;
        state.serialize_field("nodes", &self.nodes)?;
        state.end()
    }
}

/// Generates derivation trees from a grammar.
///
/// The limit is the maximum number of nodes of the produced tree, root
/// included.
#[derive(Debug, Clone)]
pub struct DerivationTreeGenerator<I> {
    index: I,
    config: GeneratorConfig,
}

impl<I: SymbolIndex> DerivationTreeGenerator<I> {
    /// Create a generator with leftmost expansion
    pub fn new(index: I, limit: usize) -> Self {
        DerivationTreeGenerator::with_config(index, GeneratorConfig::new(limit))
    }

    pub fn with_config(index: I, config: GeneratorConfig) -> Self {
        DerivationTreeGenerator { index, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Give back the decision source
    pub fn into_index(self) -> I {
        self.index
    }
}

/// The tree under construction and its frontier of leaf ids
struct Frontier<T> {
    tree: DerivationTree<T>,
    leaves: Vec<NodeId>,
    limit: usize,
}

impl<T> Form<T> for Frontier<T> {
    fn len(&self) -> usize {
        self.leaves.len()
    }

    fn pending(&self, pos: usize) -> Option<Arc<NonTerminal>> {
        self.tree.symbol(self.leaves[pos]).as_non_terminal().cloned()
    }

    fn substitute(&mut self, pos: usize, expression: &Expression<T>) -> Result<()> {
        if self.tree.len() + expression.len() > self.limit {
            return Err(GrammarError::RecursionLimit { limit: self.limit });
        }
        let children = self.tree.attach(self.leaves[pos], expression.symbols());
        self.leaves.splice(pos..pos + 1, children);
        Ok(())
    }
}

impl<T, I: SymbolIndex> Generator<T> for DerivationTreeGenerator<I> {
    type Output = DerivationTree<T>;

    fn generate(&mut self, cfg: &Cfg<T>) -> Result<Self::Output> {
        let limit = self.config.limit;
        if limit == 0 {
            return Err(GrammarError::RecursionLimit { limit });
        }
        let mut frontier = Frontier {
            tree: DerivationTree::new(Symbol::NonTerminal(Arc::clone(cfg.start()))),
            leaves: vec![0],
            limit,
        };
        derive(cfg, &mut self.index, self.config.expansion, &mut frontier)?;
        Ok(frontier.tree)
    }
}
