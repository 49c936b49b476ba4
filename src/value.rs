//! Intrinsic property values
//!
//! Every property of a declared resource is a [`Value`]: either a literal
//! scalar, or a call to one of the provisioning service's intrinsic
//! functions (`Ref`, `Fn::GetAtt`, `Fn::Join`, ...) whose arguments are
//! themselves values, nested to any depth. On the wire a literal is a bare
//! scalar node and a function call is a single-key object:
//!
//! ```json
//! "MyBucket"
//! {"Ref": "MyBucket"}
//! {"Fn::Join": ["-", [{"Ref": "A"}, "literal"]]}
//! ```
//!
//! The function set is closed: an object whose single key is not a known
//! function name fails decoding, as does a known function with the wrong
//! argument shape. Values are immutable once constructed; a field that may
//! be absent is an `Option<Value>` at the owning record, never a state
//! inside `Value` itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as Node};

use crate::error::Error;
use crate::path::Path;
use crate::Result;

// =============================================================================
// Wire names
// =============================================================================

const FN_REF: &str = "Ref";
const FN_GET_ATT: &str = "Fn::GetAtt";
const FN_JOIN: &str = "Fn::Join";
const FN_SUB: &str = "Fn::Sub";
const FN_SELECT: &str = "Fn::Select";
const FN_SPLIT: &str = "Fn::Split";
const FN_FIND_IN_MAP: &str = "Fn::FindInMap";
const FN_IMPORT_VALUE: &str = "Fn::ImportValue";
const FN_BASE64: &str = "Fn::Base64";
const FN_GET_AZS: &str = "Fn::GetAZs";
const FN_CIDR: &str = "Fn::Cidr";
const FN_IF: &str = "Fn::If";
const FN_EQUALS: &str = "Fn::Equals";
const FN_AND: &str = "Fn::And";
const FN_OR: &str = "Fn::Or";
const FN_NOT: &str = "Fn::Not";
const FN_CONDITION: &str = "Condition";

// =============================================================================
// Value
// =============================================================================

/// A property value: a literal scalar or an intrinsic function call.
///
/// Exactly one shape is populated; the enum makes a "both" or "neither"
/// state unrepresentable.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Literal text
    String(String),
    /// Literal number. Held as a JSON number: integers are exact, floats
    /// are IEEE doubles. The textual spelling may renormalize on re-encode
    /// (`1.50` becomes `1.5`) but the numeric value never changes.
    Number(Number),
    /// Literal boolean
    Bool(bool),

    /// `Ref` - reference a sibling resource or parameter by logical id
    Ref(String),
    /// `Fn::GetAtt` - look up an attribute of a sibling resource
    GetAtt {
        /// Logical id of the resource being queried
        logical_id: String,
        /// Attribute name, possibly dotted (`Outputs.Endpoint`)
        attribute: String,
    },
    /// `Fn::Join` - concatenate values with a delimiter
    Join {
        /// Text placed between consecutive values
        delimiter: String,
        /// The values being joined
        values: ValueList,
    },
    /// `Fn::Sub` - substitute `${...}` variables in a template string
    Sub {
        /// The template text
        template: String,
        /// Explicit variable bindings; `None` re-encodes as the bare
        /// string form, `Some` as the two-argument form
        variables: Option<BTreeMap<String, Value>>,
    },
    /// `Fn::Select` - pick one element of a list by index
    Select {
        /// Zero-based index, itself possibly an intrinsic
        index: Box<Value>,
        /// The list being indexed
        values: ValueList,
    },
    /// `Fn::Split` - split a string into a list
    Split {
        /// Separator text
        delimiter: String,
        /// The string being split
        source: Box<Value>,
    },
    /// `Fn::FindInMap` - two-level lookup in a template mapping
    FindInMap {
        /// Name of the mapping
        map_name: Box<Value>,
        /// First-level key
        top_level_key: Box<Value>,
        /// Second-level key
        second_level_key: Box<Value>,
    },
    /// `Fn::ImportValue` - import an exported value from another document
    ImportValue(Box<Value>),
    /// `Fn::Base64` - base64-encode a string at provisioning time
    Base64(Box<Value>),
    /// `Fn::GetAZs` - list the availability zones of a region
    GetAzs(Box<Value>),
    /// `Fn::Cidr` - derive CIDR blocks from a parent block
    Cidr {
        /// Parent CIDR block
        ip_block: Box<Value>,
        /// Number of subnets to generate
        count: Box<Value>,
        /// Size of each subnet as host bits
        cidr_bits: Box<Value>,
    },
    /// `Fn::If` - select between two values by named condition
    If {
        /// Name of the condition being tested
        condition: String,
        /// Value when the condition holds
        when_true: Box<Value>,
        /// Value when the condition does not hold
        when_false: Box<Value>,
    },
    /// `Fn::Equals` - compare two values
    Equals(Box<Value>, Box<Value>),
    /// `Fn::And` - all conditions hold (2 to 10 operands)
    And(Vec<Value>),
    /// `Fn::Or` - any condition holds (2 to 10 operands)
    Or(Vec<Value>),
    /// `Fn::Not` - negate a condition
    Not(Box<Value>),
    /// `Condition` - reference a named template condition
    Condition(String),
}

/// The list argument of a sequence-taking function (`Fn::Join`, `Fn::Select`).
///
/// Either an explicit list of values, or a single nested intrinsic that
/// evaluates to a list at provisioning time (`Fn::GetAZs`, `Fn::Split`, a
/// `Ref` to a list parameter). The nested form must hold an intrinsic;
/// decoding only ever produces one there.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueList {
    /// An explicit, ordered list of values
    Values(Vec<Value>),
    /// A nested intrinsic evaluating to a list
    Fn(Box<Value>),
}

// =============================================================================
// Constructors
// =============================================================================

impl Value {
    /// Literal text value
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Literal integer value
    pub fn int(value: i64) -> Self {
        Self::Number(value.into())
    }

    /// Literal float value, or `None` when the float is NaN or infinite
    /// (the wire format has no spelling for those)
    pub fn float(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self::Number)
    }

    /// `Ref` to a sibling resource or parameter
    pub fn reference(logical_id: impl Into<String>) -> Self {
        Self::Ref(logical_id.into())
    }

    /// `Fn::GetAtt` attribute lookup
    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::GetAtt {
            logical_id: logical_id.into(),
            attribute: attribute.into(),
        }
    }

    /// `Fn::Join` over a delimiter and a list
    pub fn join(delimiter: impl Into<String>, values: impl Into<ValueList>) -> Self {
        Self::Join {
            delimiter: delimiter.into(),
            values: values.into(),
        }
    }

    /// `Fn::Sub` with implicit variables only
    pub fn sub(template: impl Into<String>) -> Self {
        Self::Sub {
            template: template.into(),
            variables: None,
        }
    }

    /// `Fn::Sub` with an explicit variable map
    pub fn sub_with(template: impl Into<String>, variables: BTreeMap<String, Value>) -> Self {
        Self::Sub {
            template: template.into(),
            variables: Some(variables),
        }
    }

    /// `Fn::Select` by index
    pub fn select(index: impl Into<Value>, values: impl Into<ValueList>) -> Self {
        Self::Select {
            index: Box::new(index.into()),
            values: values.into(),
        }
    }

    /// `Fn::Split` a string into a list
    pub fn split(delimiter: impl Into<String>, source: Value) -> Self {
        Self::Split {
            delimiter: delimiter.into(),
            source: Box::new(source),
        }
    }

    /// `Fn::FindInMap` two-level mapping lookup
    pub fn find_in_map(map_name: Value, top_level_key: Value, second_level_key: Value) -> Self {
        Self::FindInMap {
            map_name: Box::new(map_name),
            top_level_key: Box::new(top_level_key),
            second_level_key: Box::new(second_level_key),
        }
    }

    /// `Fn::ImportValue` from another document
    pub fn import_value(name: Value) -> Self {
        Self::ImportValue(Box::new(name))
    }

    /// `Fn::Base64` encoding
    pub fn base64(source: Value) -> Self {
        Self::Base64(Box::new(source))
    }

    /// `Fn::GetAZs` for a region
    pub fn get_azs(region: Value) -> Self {
        Self::GetAzs(Box::new(region))
    }

    /// `Fn::Cidr` subnet derivation
    pub fn cidr(ip_block: Value, count: Value, cidr_bits: Value) -> Self {
        Self::Cidr {
            ip_block: Box::new(ip_block),
            count: Box::new(count),
            cidr_bits: Box::new(cidr_bits),
        }
    }

    /// `Fn::If` conditional selection
    pub fn if_then_else(condition: impl Into<String>, when_true: Value, when_false: Value) -> Self {
        Self::If {
            condition: condition.into(),
            when_true: Box::new(when_true),
            when_false: Box::new(when_false),
        }
    }

    /// `Fn::Equals` comparison
    pub fn equals(left: Value, right: Value) -> Self {
        Self::Equals(Box::new(left), Box::new(right))
    }

    /// `Fn::And` over 2 to 10 conditions
    pub fn and(conditions: Vec<Value>) -> Self {
        Self::And(conditions)
    }

    /// `Fn::Or` over 2 to 10 conditions
    pub fn or(conditions: Vec<Value>) -> Self {
        Self::Or(conditions)
    }

    /// `Fn::Not` negation
    pub fn not(condition: Value) -> Self {
        Self::Not(Box::new(condition))
    }

    /// Reference to a named template condition
    pub fn condition(name: impl Into<String>) -> Self {
        Self::Condition(name.into())
    }

    /// Returns true if this value is a literal scalar
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::String(_) | Self::Number(_) | Self::Bool(_))
    }

    /// Returns true if this value is an intrinsic function call
    pub fn is_intrinsic(&self) -> bool {
        !self.is_literal()
    }

    /// The literal text, if this value is a string literal
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The wire name of the intrinsic function, if this value is one
    pub fn function_name(&self) -> Option<&'static str> {
        match self {
            Self::String(_) | Self::Number(_) | Self::Bool(_) => None,
            Self::Ref(_) => Some(FN_REF),
            Self::GetAtt { .. } => Some(FN_GET_ATT),
            Self::Join { .. } => Some(FN_JOIN),
            Self::Sub { .. } => Some(FN_SUB),
            Self::Select { .. } => Some(FN_SELECT),
            Self::Split { .. } => Some(FN_SPLIT),
            Self::FindInMap { .. } => Some(FN_FIND_IN_MAP),
            Self::ImportValue(_) => Some(FN_IMPORT_VALUE),
            Self::Base64(_) => Some(FN_BASE64),
            Self::GetAzs(_) => Some(FN_GET_AZS),
            Self::Cidr { .. } => Some(FN_CIDR),
            Self::If { .. } => Some(FN_IF),
            Self::Equals(_, _) => Some(FN_EQUALS),
            Self::And(_) => Some(FN_AND),
            Self::Or(_) => Some(FN_OR),
            Self::Not(_) => Some(FN_NOT),
            Self::Condition(_) => Some(FN_CONDITION),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<Value>> for ValueList {
    fn from(values: Vec<Value>) -> Self {
        Self::Values(values)
    }
}

impl ValueList {
    /// An explicit list of values
    pub fn values(values: Vec<Value>) -> Self {
        Self::Values(values)
    }

    /// A nested list-producing intrinsic (`Fn::GetAZs`, `Fn::Split`, a
    /// `Ref` to a list parameter)
    pub fn nested(source: Value) -> Self {
        Self::Fn(Box::new(source))
    }
}

// =============================================================================
// Encode
// =============================================================================

impl Value {
    /// Encode this value into its document node.
    ///
    /// Literals become bare scalar nodes. Functions become single-key
    /// objects; a single argument is emitted as a bare node, fixed-arity
    /// functions emit their argument list.
    pub fn to_node(&self) -> Node {
        match self {
            Self::String(s) => Node::String(s.clone()),
            Self::Number(n) => Node::Number(n.clone()),
            Self::Bool(b) => Node::Bool(*b),
            Self::Ref(logical_id) => single(FN_REF, Node::String(logical_id.clone())),
            Self::GetAtt {
                logical_id,
                attribute,
            } => single(
                FN_GET_ATT,
                Node::Array(vec![
                    Node::String(logical_id.clone()),
                    Node::String(attribute.clone()),
                ]),
            ),
            Self::Join { delimiter, values } => single(
                FN_JOIN,
                Node::Array(vec![Node::String(delimiter.clone()), values.to_node()]),
            ),
            Self::Sub {
                template,
                variables,
            } => match variables {
                None => single(FN_SUB, Node::String(template.clone())),
                Some(vars) => {
                    let map: Map<String, Node> = vars
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_node()))
                        .collect();
                    single(
                        FN_SUB,
                        Node::Array(vec![Node::String(template.clone()), Node::Object(map)]),
                    )
                }
            },
            Self::Select { index, values } => single(
                FN_SELECT,
                Node::Array(vec![index.to_node(), values.to_node()]),
            ),
            Self::Split { delimiter, source } => single(
                FN_SPLIT,
                Node::Array(vec![Node::String(delimiter.clone()), source.to_node()]),
            ),
            Self::FindInMap {
                map_name,
                top_level_key,
                second_level_key,
            } => single(
                FN_FIND_IN_MAP,
                Node::Array(vec![
                    map_name.to_node(),
                    top_level_key.to_node(),
                    second_level_key.to_node(),
                ]),
            ),
            Self::ImportValue(name) => single(FN_IMPORT_VALUE, name.to_node()),
            Self::Base64(source) => single(FN_BASE64, source.to_node()),
            Self::GetAzs(region) => single(FN_GET_AZS, region.to_node()),
            Self::Cidr {
                ip_block,
                count,
                cidr_bits,
            } => single(
                FN_CIDR,
                Node::Array(vec![
                    ip_block.to_node(),
                    count.to_node(),
                    cidr_bits.to_node(),
                ]),
            ),
            Self::If {
                condition,
                when_true,
                when_false,
            } => single(
                FN_IF,
                Node::Array(vec![
                    Node::String(condition.clone()),
                    when_true.to_node(),
                    when_false.to_node(),
                ]),
            ),
            Self::Equals(left, right) => {
                single(FN_EQUALS, Node::Array(vec![left.to_node(), right.to_node()]))
            }
            Self::And(conditions) => single(
                FN_AND,
                Node::Array(conditions.iter().map(Value::to_node).collect()),
            ),
            Self::Or(conditions) => single(
                FN_OR,
                Node::Array(conditions.iter().map(Value::to_node).collect()),
            ),
            Self::Not(condition) => single(FN_NOT, Node::Array(vec![condition.to_node()])),
            Self::Condition(name) => single(FN_CONDITION, Node::String(name.clone())),
        }
    }
}

impl ValueList {
    fn to_node(&self) -> Node {
        match self {
            Self::Values(values) => Node::Array(values.iter().map(Value::to_node).collect()),
            Self::Fn(source) => source.to_node(),
        }
    }
}

fn single(name: &str, args: Node) -> Node {
    let mut map = Map::new();
    map.insert(name.to_string(), args);
    Node::Object(map)
}

// =============================================================================
// Decode
// =============================================================================

impl Value {
    /// Decode a value from its document node.
    ///
    /// Scalars become literals. A single-key object whose key is a known
    /// function name becomes the matching intrinsic after shape checking.
    /// Anything else fails with a decode error naming the node's document
    /// path and, where applicable, the offending function name.
    pub fn from_node(node: &Node) -> Result<Self> {
        Self::from_node_at(node, &Path::root())
    }

    pub(crate) fn from_node_at(node: &Node, path: &Path<'_>) -> Result<Self> {
        match node {
            Node::String(s) => Ok(Self::String(s.clone())),
            Node::Number(n) => Ok(Self::Number(n.clone())),
            Node::Bool(b) => Ok(Self::Bool(*b)),
            Node::Null => Err(Error::decode(
                path,
                "null is not a valid property value; omit the field instead",
            )),
            Node::Array(_) => Err(Error::decode(
                path,
                "unrecognized value shape: expected a scalar or an intrinsic \
                 function object, found an array",
            )),
            Node::Object(map) => {
                let mut entries = map.iter();
                match (entries.next(), entries.next()) {
                    (Some((name, args)), None) => Self::function_from_node(name, args, path),
                    _ => Err(Error::decode(
                        path,
                        format!(
                            "expected a single-key intrinsic function object, \
                             found an object with {} keys",
                            map.len()
                        ),
                    )),
                }
            }
        }
    }

    fn function_from_node(name: &str, args: &Node, path: &Path<'_>) -> Result<Self> {
        let path = path.key(name);
        match name {
            FN_REF => Ok(Self::Ref(
                expect_string(args, &path, "a logical id")?.to_string(),
            )),
            FN_GET_ATT => Self::get_att_from_node(args, &path),
            FN_JOIN => {
                let parts = expect_arity(args, &path, 2, "[delimiter, values]")?;
                Ok(Self::Join {
                    delimiter: expect_string(&parts[0], &path.index(0), "a delimiter")?
                        .to_string(),
                    values: ValueList::from_node_at(&parts[1], &path.index(1))?,
                })
            }
            FN_SUB => Self::sub_from_node(args, &path),
            FN_SELECT => {
                let parts = expect_arity(args, &path, 2, "[index, values]")?;
                Ok(Self::Select {
                    index: Box::new(Self::from_node_at(&parts[0], &path.index(0))?),
                    values: ValueList::from_node_at(&parts[1], &path.index(1))?,
                })
            }
            FN_SPLIT => {
                let parts = expect_arity(args, &path, 2, "[delimiter, source]")?;
                Ok(Self::Split {
                    delimiter: expect_string(&parts[0], &path.index(0), "a delimiter")?
                        .to_string(),
                    source: Box::new(Self::from_node_at(&parts[1], &path.index(1))?),
                })
            }
            FN_FIND_IN_MAP => {
                let parts =
                    expect_arity(args, &path, 3, "[map name, top-level key, second-level key]")?;
                Ok(Self::FindInMap {
                    map_name: Box::new(Self::from_node_at(&parts[0], &path.index(0))?),
                    top_level_key: Box::new(Self::from_node_at(&parts[1], &path.index(1))?),
                    second_level_key: Box::new(Self::from_node_at(&parts[2], &path.index(2))?),
                })
            }
            FN_IMPORT_VALUE => Ok(Self::ImportValue(Box::new(Self::from_node_at(
                args, &path,
            )?))),
            FN_BASE64 => Ok(Self::Base64(Box::new(Self::from_node_at(args, &path)?))),
            FN_GET_AZS => Ok(Self::GetAzs(Box::new(Self::from_node_at(args, &path)?))),
            FN_CIDR => {
                let parts = expect_arity(args, &path, 3, "[ip block, count, cidr bits]")?;
                Ok(Self::Cidr {
                    ip_block: Box::new(Self::from_node_at(&parts[0], &path.index(0))?),
                    count: Box::new(Self::from_node_at(&parts[1], &path.index(1))?),
                    cidr_bits: Box::new(Self::from_node_at(&parts[2], &path.index(2))?),
                })
            }
            FN_IF => {
                let parts = expect_arity(args, &path, 3, "[condition name, true, false]")?;
                Ok(Self::If {
                    condition: expect_string(&parts[0], &path.index(0), "a condition name")?
                        .to_string(),
                    when_true: Box::new(Self::from_node_at(&parts[1], &path.index(1))?),
                    when_false: Box::new(Self::from_node_at(&parts[2], &path.index(2))?),
                })
            }
            FN_EQUALS => {
                let parts = expect_arity(args, &path, 2, "[left, right]")?;
                Ok(Self::Equals(
                    Box::new(Self::from_node_at(&parts[0], &path.index(0))?),
                    Box::new(Self::from_node_at(&parts[1], &path.index(1))?),
                ))
            }
            FN_AND => Ok(Self::And(Self::combinator_from_node(args, &path)?)),
            FN_OR => Ok(Self::Or(Self::combinator_from_node(args, &path)?)),
            FN_NOT => {
                let parts = expect_arity(args, &path, 1, "[condition]")?;
                Ok(Self::Not(Box::new(Self::from_node_at(
                    &parts[0],
                    &path.index(0),
                )?)))
            }
            FN_CONDITION => Ok(Self::Condition(
                expect_string(args, &path, "a condition name")?.to_string(),
            )),
            _ => Err(Error::decode(
                &path,
                format!("`{name}` is not a known intrinsic function"),
            )),
        }
    }

    /// `Fn::GetAtt` accepts both `["Logical", "Attribute"]` and the dotted
    /// string `"Logical.Attribute"`; it always re-encodes as the list form.
    fn get_att_from_node(args: &Node, path: &Path<'_>) -> Result<Self> {
        match args {
            Node::String(s) => match s.split_once('.') {
                Some((logical_id, attribute)) if !logical_id.is_empty() && !attribute.is_empty() => {
                    Ok(Self::GetAtt {
                        logical_id: logical_id.to_string(),
                        attribute: attribute.to_string(),
                    })
                }
                _ => Err(Error::decode(
                    path,
                    format!("Fn::GetAtt string form must be `LogicalId.Attribute`, got `{s}`"),
                )),
            },
            _ => {
                let parts = expect_arity(args, path, 2, "[logical id, attribute name]")?;
                Ok(Self::GetAtt {
                    logical_id: expect_string(&parts[0], &path.index(0), "a logical id")?
                        .to_string(),
                    attribute: expect_string(&parts[1], &path.index(1), "an attribute name")?
                        .to_string(),
                })
            }
        }
    }

    /// `Fn::Sub` accepts both the bare template string and the
    /// `[template, {variables}]` form, and remembers which one it was.
    fn sub_from_node(args: &Node, path: &Path<'_>) -> Result<Self> {
        match args {
            Node::String(template) => Ok(Self::Sub {
                template: template.clone(),
                variables: None,
            }),
            _ => {
                let parts = expect_arity(args, path, 2, "[template, variable map]")?;
                let template =
                    expect_string(&parts[0], &path.index(0), "a template string")?.to_string();
                let vars_path = path.index(1);
                let map = parts[1].as_object().ok_or_else(|| {
                    Error::decode(&vars_path, "Fn::Sub variables must be an object")
                })?;
                let mut variables = BTreeMap::new();
                for (key, node) in map {
                    let value = Self::from_node_at(node, &vars_path.key(key))?;
                    variables.insert(key.clone(), value);
                }
                Ok(Self::Sub {
                    template,
                    variables: Some(variables),
                })
            }
        }
    }

    /// Shared shape for `Fn::And` / `Fn::Or`: 2 to 10 conditions.
    fn combinator_from_node(args: &Node, path: &Path<'_>) -> Result<Vec<Self>> {
        let parts = args.as_array().ok_or_else(|| {
            Error::decode(path, "expected a list of 2 to 10 conditions")
        })?;
        if parts.len() < 2 || parts.len() > 10 {
            return Err(Error::decode(
                path,
                format!("expected 2 to 10 conditions, got {}", parts.len()),
            ));
        }
        parts
            .iter()
            .enumerate()
            .map(|(i, node)| Self::from_node_at(node, &path.index(i)))
            .collect()
    }
}

impl ValueList {
    fn from_node_at(node: &Node, path: &Path<'_>) -> Result<Self> {
        match node {
            Node::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| Value::from_node_at(item, &path.index(i)))
                .collect::<Result<Vec<_>>>()
                .map(Self::Values),
            Node::Object(_) => Ok(Self::Fn(Box::new(Value::from_node_at(node, path)?))),
            _ => Err(Error::decode(
                path,
                "expected a list of values or a list-producing intrinsic function",
            )),
        }
    }
}

fn expect_string<'n>(node: &'n Node, path: &Path<'_>, what: &str) -> Result<&'n str> {
    node.as_str()
        .ok_or_else(|| Error::decode(path, format!("expected {what} (a string)")))
}

fn expect_arity<'n>(
    node: &'n Node,
    path: &Path<'_>,
    arity: usize,
    shape: &str,
) -> Result<&'n Vec<Node>> {
    let items = node
        .as_array()
        .ok_or_else(|| Error::decode(path, format!("expected the argument list {shape}")))?;
    if items.len() != arity {
        return Err(Error::decode(
            path,
            format!(
                "expected the argument list {shape} ({arity} elements), got {}",
                items.len()
            ),
        ));
    }
    Ok(items)
}

// =============================================================================
// Serde integration
// =============================================================================
// Catalog property records hold `Value` fields and decode with derived
// serde; these impls delegate to the node codec so the wire shape is
// defined in exactly one place.

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_node().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let node = Node::deserialize(deserializer)?;
        Value::from_node(&node).map_err(serde::de::Error::custom)
    }
}
