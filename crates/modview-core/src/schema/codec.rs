//! Reference [`Codec`] implementation driven by a [`SchemaNode`] tree.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use super::cache::CodecCache;
use super::{locate, locate_augmentation, locate_in_case, Located, SchemaNode};
use crate::codec::{Addressability, ChildCodec, Codec, Step, StepTarget};
use crate::config::ProjectionConfig;
use crate::errors::{ExError, ExErrorKind, ProjectionError, Result};
use crate::tree::{NodeKey, Payload, PayloadBody};

/// Application value produced by [`SchemaCodec::deserialize`].
///
/// `content` is a JSON object holding the node's members; choice and
/// augmentation members are flattened into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataObject {
    step: Step,
    content: Value,
}

impl DataObject {
    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn get(&self, member: &str) -> Option<&Value> {
        self.content.get(member)
    }
}

/// Codec for one schema node.
///
/// Child codecs are created on demand and interned in the shared
/// [`CodecCache`]; the root codec owns the cache.
pub struct SchemaCodec {
    path: String,
    node: Arc<SchemaNode>,
    case: Option<String>,
    addressability: Addressability,
    declared: Vec<NodeKey>,
    cache: Weak<CodecCache>,
    owned_cache: Option<Arc<CodecCache>>,
}

impl fmt::Debug for SchemaCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCodec")
            .field("path", &self.path)
            .field("kind", &self.node.kind_name())
            .field("case", &self.case)
            .field("addressability", &self.addressability)
            .finish()
    }
}

impl SchemaCodec {
    /// Build the root codec for a top-level container
    ///
    /// # Errors
    ///
    /// `ERR_INVALID_INPUT` when the schema is not a container or declares a
    /// child name twice.
    pub fn root(schema: SchemaNode, cache: Arc<CodecCache>) -> Result<Arc<Self>> {
        if !matches!(schema, SchemaNode::Container { .. }) {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("build_schema")
                .with_message(format!(
                    "Root schema node {} must be a container, found {}",
                    schema.name(),
                    schema.kind_name()
                )));
        }
        schema.validate()?;

        let path = format!("/{}", schema.name());
        tracing::debug!(path = %path, capacity = cache.capacity(), "schema codec root created");
        Ok(Arc::new(Self::new(
            path,
            Arc::new(schema),
            None,
            Arc::downgrade(&cache),
            Some(cache),
        )))
    }

    /// Build the root codec with a fresh cache sized by `config`
    ///
    /// # Errors
    ///
    /// As [`SchemaCodec::root`], or `ERR_INVALID_CONFIG` for an invalid config.
    pub fn with_config(schema: SchemaNode, config: &ProjectionConfig) -> Result<Arc<Self>> {
        config.validate()?;
        Self::root(schema, Arc::new(CodecCache::from_config(config)))
    }

    fn new(
        path: String,
        node: Arc<SchemaNode>,
        case: Option<String>,
        cache: Weak<CodecCache>,
        owned_cache: Option<Arc<CodecCache>>,
    ) -> Self {
        let declared = match &*node {
            SchemaNode::Augmentation { children, .. } => children
                .iter()
                .map(|c| NodeKey::node(c.name()))
                .collect(),
            _ => Vec::new(),
        };
        Self {
            addressability: node.addressability(),
            path,
            node,
            case,
            declared,
            cache,
            owned_cache,
        }
    }

    /// Unique schema path, also the cache key
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn schema(&self) -> &SchemaNode {
        &self.node
    }

    /// Choice case this node was declared in, if any
    pub fn case(&self) -> Option<&str> {
        self.case.as_deref()
    }

    /// Shared cache, if it is still alive
    pub fn cache(&self) -> Option<Arc<CodecCache>> {
        match &self.owned_cache {
            Some(cache) => Some(Arc::clone(cache)),
            None => self.cache.upgrade(),
        }
    }

    fn child_codec(&self, path: String, node: &SchemaNode, case: Option<&str>) -> Arc<SchemaCodec> {
        let build = || {
            SchemaCodec::new(
                path.clone(),
                Arc::new(node.clone()),
                case.map(str::to_string),
                self.cache.clone(),
                None,
            )
        };
        match self.cache.upgrade() {
            Some(cache) => cache.get_or_insert_with(&path, build),
            None => Arc::new(build()),
        }
    }

    fn child_path(&self, case: Option<&str>, name: &str) -> String {
        match case {
            Some(case) => format!("{}/{}/{}", self.path, case, name),
            None => format!("{}/{}", self.path, name),
        }
    }

    fn wrap(&self, located: Located<'_>, case: Option<&str>, key: &NodeKey) -> Result<ChildCodec<Self>> {
        match located {
            Located::Augmented { augmentation, .. } => {
                let path = self.child_path(case, &format!("+{}", augmentation.name()));
                Ok(ChildCodec::Aggregate(self.child_codec(path, augmentation, None)))
            }
            Located::Direct(node) => {
                let path = self.child_path(case, node.name());
                match node {
                    SchemaNode::Container { .. } | SchemaNode::List { .. } => {
                        Ok(ChildCodec::Object(self.child_codec(path, node, case)))
                    }
                    SchemaNode::Choice { .. } => {
                        Ok(ChildCodec::Transparent(self.child_codec(path, node, case)))
                    }
                    _ => Err(self.unknown_child(key)),
                }
            }
        }
    }

    fn unknown_child(&self, key: &NodeKey) -> ExError {
        ProjectionError::UnknownChild {
            codec: self.path.clone(),
            key: key.to_string(),
        }
        .into()
    }

    fn unknown_step(&self, step: &Step) -> ExError {
        ProjectionError::UnknownStep {
            codec: self.path.clone(),
            step: step.to_string(),
        }
        .into()
    }

    fn mismatch(&self, expected: &str, found: &PayloadBody) -> ExError {
        ProjectionError::PayloadMismatch {
            codec: self.path.clone(),
            expected: expected.to_string(),
            found: found.shape().to_string(),
        }
        .into()
    }

    fn invalid_key(&self, key: Option<&NodeKey>) -> ExError {
        let found = key.map_or_else(|| "no key".to_string(), ToString::to_string);
        ExError::new(ExErrorKind::InvalidInput)
            .with_op("step_of")
            .with_key(found)
            .with_message(format!(
                "Codec {} needs an entry key matching its key leaves",
                self.path
            ))
    }

    fn members(&self, defs: &[SchemaNode], items: &[Payload]) -> Result<Value> {
        let mut out = Map::new();
        for item in items {
            let def = locate(defs, item.key().name())
                .map(|l| l.node())
                .ok_or_else(|| self.undeclared(item.key()))?;
            self.convert_member(def, item, &mut out)?;
        }
        Ok(Value::Object(out))
    }

    fn undeclared(&self, key: &NodeKey) -> ExError {
        ProjectionError::UndeclaredPayloadChild {
            codec: self.path.clone(),
            key: key.to_string(),
        }
        .into()
    }

    fn convert_member(&self, def: &SchemaNode, item: &Payload, out: &mut Map<String, Value>) -> Result<()> {
        let name = def.name().to_string();
        match (def, item.body()) {
            (SchemaNode::Leaf { .. }, PayloadBody::Leaf(v))
            | (SchemaNode::AnyData { .. }, PayloadBody::AnyData(v)) => {
                out.insert(name, v.clone());
            }
            (SchemaNode::LeafList { .. }, PayloadBody::LeafSet(entries)) => {
                let values = entries
                    .iter()
                    .map(|e| match e.body() {
                        PayloadBody::LeafSetEntry(v) => Ok(v.clone()),
                        other => Err(self.mismatch("leaf-list entry", other)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                out.insert(name, Value::Array(values));
            }
            (SchemaNode::Container { children, .. }, PayloadBody::Container(items)) => {
                out.insert(name, self.members(children, items)?);
            }
            (SchemaNode::List { children, .. }, PayloadBody::Map(entries)) => {
                let values = entries
                    .iter()
                    .map(|e| match e.body() {
                        PayloadBody::MapEntry(items) => self.members(children, items),
                        other => Err(self.mismatch("keyed list entry", other)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                out.insert(name, Value::Array(values));
            }
            (SchemaNode::UnkeyedList { children, .. }, PayloadBody::UnkeyedList(entries)) => {
                let values = entries
                    .iter()
                    .map(|e| match e.body() {
                        PayloadBody::UnkeyedListEntry(items) => self.members(children, items),
                        other => Err(self.mismatch("unkeyed list entry", other)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                out.insert(name, Value::Array(values));
            }
            (SchemaNode::Choice { cases, .. }, PayloadBody::Choice(items)) => {
                // case members land in the enclosing object
                for member in items {
                    let member_def = cases
                        .iter()
                        .find_map(|c| locate(&c.children, member.key().name()))
                        .map(|l| l.node())
                        .ok_or_else(|| self.undeclared(member.key()))?;
                    self.convert_member(member_def, member, out)?;
                }
            }
            (def, body) => return Err(self.mismatch(def.kind_name(), body)),
        }
        Ok(())
    }
}

fn keys_match(keys: &BTreeMap<String, String>, leaves: &[String]) -> bool {
    keys.len() == leaves.len() && leaves.iter().all(|leaf| keys.contains_key(leaf))
}

impl Codec for SchemaCodec {
    type Value = DataObject;

    fn name(&self) -> &str {
        self.node.name()
    }

    fn addressability(&self) -> Addressability {
        self.addressability
    }

    fn resolve_child(&self, key: &NodeKey) -> Result<ChildCodec<Self>> {
        let name = key.name();
        let found = match &*self.node {
            SchemaNode::Choice { cases, .. } => cases
                .iter()
                .find_map(|c| locate(&c.children, name).map(|l| (l, Some(c.name.as_str())))),
            node => locate(node.data_children(), name).map(|l| (l, None)),
        };
        let (located, case) = found.ok_or_else(|| self.unknown_child(key))?;
        self.wrap(located, case, key)
    }

    fn child_for_step(&self, step: &Step) -> Result<StepTarget<Self>> {
        let children = self.node.data_children();
        if let Step::Aggregate { name } = step {
            let (chain, augmentation) =
                locate_augmentation(children, name).ok_or_else(|| self.unknown_step(step))?;
            let mut path = self.path.clone();
            for (choice, case) in &chain {
                path.push_str(&format!("/{}/{}", choice, case));
            }
            path.push_str(&format!("/+{}", name));
            // hops lead to the node whose children carry the members
            let hops = chain.iter().map(|(choice, _)| NodeKey::node(*choice)).collect();
            return Ok(StepTarget {
                codec: ChildCodec::Aggregate(self.child_codec(path, augmentation, None)),
                hops,
            });
        }

        let (chain, node) = match step.case() {
            None => {
                let node = children
                    .iter()
                    .find(|c| {
                        !matches!(c, SchemaNode::Augmentation { .. } | SchemaNode::Choice { .. })
                            && c.name() == step.name()
                    })
                    .ok_or_else(|| self.unknown_step(step))?;
                (Vec::new(), node)
            }
            Some(case) => locate_in_case(children, case, step.name())
                .ok_or_else(|| self.unknown_step(step))?,
        };

        let mut path = self.path.clone();
        let mut hops = Vec::with_capacity(chain.len() + 2);
        for (choice, case) in &chain {
            path.push_str(&format!("/{}/{}", choice, case));
            hops.push(NodeKey::node(*choice));
        }
        path.push('/');
        path.push_str(node.name());

        match (step, node) {
            (Step::Node { .. }, SchemaNode::Container { .. }) => {
                hops.push(NodeKey::node(node.name()));
            }
            (Step::Entry { keys, .. }, SchemaNode::List { .. }) => {
                hops.push(NodeKey::node(node.name()));
                hops.push(NodeKey::Entry {
                    name: node.name().to_string(),
                    keys: keys.clone(),
                });
            }
            _ => return Err(self.unknown_step(step)),
        }

        Ok(StepTarget {
            codec: ChildCodec::Object(self.child_codec(path, node, step.case())),
            hops,
        })
    }

    fn step_of(&self, key: Option<&NodeKey>) -> Result<Step> {
        match &*self.node {
            SchemaNode::Container { name, .. } => Ok(Step::Node {
                name: name.clone(),
                case: self.case.clone(),
            }),
            SchemaNode::List {
                name,
                keys: key_leaves,
                ..
            } => match key {
                Some(NodeKey::Entry { name: entry, keys })
                    if entry == name && keys_match(keys, key_leaves) =>
                {
                    Ok(Step::Entry {
                        name: name.clone(),
                        case: self.case.clone(),
                        keys: keys.clone(),
                    })
                }
                other => Err(self.invalid_key(other)),
            },
            SchemaNode::Augmentation { name, .. } => Ok(Step::Aggregate { name: name.clone() }),
            node => Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("step_of")
                .with_message(format!(
                    "Codec {} describes a {}, which has no output step",
                    self.path,
                    node.kind_name()
                ))),
        }
    }

    fn deserialize(&self, payload: &Payload) -> Result<DataObject> {
        match (&*self.node, payload.body()) {
            (SchemaNode::Container { children, .. }, PayloadBody::Container(items)) => {
                Ok(DataObject {
                    step: self.step_of(None)?,
                    content: self.members(children, items)?,
                })
            }
            (SchemaNode::List { children, .. }, PayloadBody::MapEntry(items)) => Ok(DataObject {
                step: self.step_of(Some(payload.key()))?,
                content: self.members(children, items)?,
            }),
            (SchemaNode::Augmentation { .. }, body) => self
                .filter_from(payload)?
                .ok_or_else(|| self.mismatch("payload carrying augmentation members", body)),
            (node, body) => {
                let expected = match node {
                    SchemaNode::List { .. } => "keyed list entry",
                    other => other.kind_name(),
                };
                Err(self.mismatch(expected, body))
            }
        }
    }

    fn declared_keys(&self) -> &[NodeKey] {
        &self.declared
    }

    fn filter_from(&self, parent: &Payload) -> Result<Option<DataObject>> {
        let SchemaNode::Augmentation { name, children } = &*self.node else {
            return Err(ProjectionError::NotAnAggregate {
                codec: self.path.clone(),
            }
            .into());
        };
        let members: Vec<Payload> = parent
            .children()
            .iter()
            .filter(|c| self.declared.contains(c.key()))
            .cloned()
            .collect();
        if members.is_empty() {
            return Ok(None);
        }
        Ok(Some(DataObject {
            step: Step::Aggregate { name: name.clone() },
            content: self.members(children, &members)?,
        }))
    }
}
