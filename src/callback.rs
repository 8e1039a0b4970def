use crate::error::{Error, Result};
use crate::node::Node;
use crate::node_set::NodeSet;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// What an `each` callback asks for after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Break,
}

impl From<()> for Flow {
    fn from(_: ()) -> Flow {
        Flow::Continue
    }
}

impl From<bool> for Flow {
    fn from(keep_going: bool) -> Flow {
        if keep_going {
            Flow::Continue
        } else {
            Flow::Break
        }
    }
}

/// The result of a `map` callback for one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapped {
    Nothing,
    One(Node),
    Many(Vec<Node>),
}

impl Mapped {
    pub(crate) fn extend_into(self, nodes: &mut Vec<Node>) {
        match self {
            Mapped::Nothing => {}
            Mapped::One(node) => nodes.push(node),
            Mapped::Many(many) => nodes.extend(many),
        }
    }
}

impl From<()> for Mapped {
    fn from(_: ()) -> Mapped {
        Mapped::Nothing
    }
}

impl From<Node> for Mapped {
    fn from(node: Node) -> Mapped {
        Mapped::One(node)
    }
}

impl From<Option<Node>> for Mapped {
    fn from(node: Option<Node>) -> Mapped {
        node.map_or(Mapped::Nothing, Mapped::One)
    }
}

impl From<Vec<Node>> for Mapped {
    fn from(nodes: Vec<Node>) -> Mapped {
        Mapped::Many(nodes)
    }
}

impl From<NodeSet> for Mapped {
    fn from(nodes: NodeSet) -> Mapped {
        Mapped::Many(nodes.into_vec())
    }
}

/// Something `filter_callback`, `map` and `each` can call with the position
/// and the node of every member of a selection.
///
/// Closures taking `(usize, &Node)` are invocable; so are `Named` callbacks
/// looked up in the process-wide registry.
pub trait Invocable<R> {
    /// Called once, before the first node is visited.
    fn resolve(&mut self) -> Result<()> {
        Ok(())
    }

    fn invoke(&mut self, index: usize, node: &Node) -> Result<R>;
}

impl<F, T, R> Invocable<R> for F
where
    F: FnMut(usize, &Node) -> T,
    T: Into<R>,
{
    fn invoke(&mut self, index: usize, node: &Node) -> Result<R> {
        Ok(self(index, node).into())
    }
}

/// A plain function usable as a named callback.
pub type Callback<R> = fn(usize, &Node) -> R;

lazy_static! {
    static ref FILTERS: RwLock<HashMap<String, Callback<bool>>> = RwLock::new(HashMap::new());
    static ref MAPPERS: RwLock<HashMap<String, Callback<Mapped>>> = RwLock::new(HashMap::new());
    static ref VISITORS: RwLock<HashMap<String, Callback<Flow>>> = RwLock::new(HashMap::new());
}

/// Callback results that have a registry of named callbacks.
pub trait Registered: Sized + 'static {
    fn registry() -> &'static RwLock<HashMap<String, Callback<Self>>>;
}

impl Registered for bool {
    fn registry() -> &'static RwLock<HashMap<String, Callback<bool>>> {
        &FILTERS
    }
}

impl Registered for Mapped {
    fn registry() -> &'static RwLock<HashMap<String, Callback<Mapped>>> {
        &MAPPERS
    }
}

impl Registered for Flow {
    fn registry() -> &'static RwLock<HashMap<String, Callback<Flow>>> {
        &VISITORS
    }
}

/// Registers a callback under `name`, replacing any previous one of the
/// same result type.
///
/// ```
/// use qpath::{register, Named, Node};
///
/// fn is_item(_: usize, node: &Node) -> bool {
///     node.tag_name().as_deref() == Some("li")
/// }
///
/// register("is-item", is_item);
/// let mut sel = qpath::qp("<ul><li>a</li><li>b</li></ul>").unwrap();
/// sel.find("*").unwrap().filter_callback(Named::new("is-item")).unwrap();
/// assert_eq!(sel.size(), 2);
/// ```
pub fn register<R: Registered>(name: &str, callback: Callback<R>) {
    R::registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name.to_string(), callback);
}

/// A callback referred to by the name it was registered under.
pub struct Named<'a, R> {
    name: &'a str,
    callback: Option<Callback<R>>,
}

impl<'a, R> Named<'a, R> {
    pub fn new(name: &'a str) -> Self {
        Named {
            name,
            callback: None,
        }
    }
}

impl<'a, R: Registered> Invocable<R> for Named<'a, R> {
    fn resolve(&mut self) -> Result<()> {
        let registry = R::registry()
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        match registry.get(self.name) {
            Some(callback) => {
                self.callback = Some(*callback);
                Ok(())
            }
            None => Err(Error::Invocation(format!(
                "no callback registered as `{}`",
                self.name
            ))),
        }
    }

    fn invoke(&mut self, index: usize, node: &Node) -> Result<R> {
        match self.callback {
            Some(callback) => Ok(callback(index, node)),
            None => Err(Error::Invocation(format!(
                "callback `{}` was not resolved",
                self.name
            ))),
        }
    }
}
