use smallvec::SmallVec;

/// An attribute attached to an evaluated node, e.g. `[[property("Header", "Magic")]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Arguments in declaration order, already converted to strings by the engine.
    pub args: SmallVec<[String; 2]>,
}

impl Attribute {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { name: name.into(), args: args.into_iter().map(Into::into).collect() }
    }
}

/// One entry of an enum type. An entry may cover a range of underlying values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub name: String,
    pub min: u128,
    pub max: u128,
}

impl EnumEntry {
    pub fn value(name: impl Into<String>, value: u128) -> Self {
        Self { name: name.into(), min: value, max: value }
    }

    pub fn range(name: impl Into<String>, min: u128, max: u128) -> Self {
        Self { name: name.into(), min, max }
    }
}

/// What kind of value a node evaluated to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Unsigned,
    Signed,
    Float,
    String,
    Enum { entries: Vec<EnumEntry> },
    /// Structs, arrays, bitfields, pointers... anything without an editor representation.
    Other { type_name: String },
}

/// One evaluated data element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Variable name as declared in the script; only used for diagnostics.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    pub kind: NodeKind,
    pub attributes: Vec<Attribute>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind, size: u64) -> Self {
        Self { name: name.into(), size, kind, attributes: Vec::new() }
    }

    pub fn unsigned(name: impl Into<String>, size: u64) -> Self {
        Self::new(name, NodeKind::Unsigned, size)
    }

    pub fn signed(name: impl Into<String>, size: u64) -> Self {
        Self::new(name, NodeKind::Signed, size)
    }

    pub fn float(name: impl Into<String>, size: u64) -> Self {
        Self::new(name, NodeKind::Float, size)
    }

    pub fn string(name: impl Into<String>, size: u64) -> Self {
        Self::new(name, NodeKind::String, size)
    }

    pub fn enumeration(name: impl Into<String>, size: u64, entries: Vec<EnumEntry>) -> Self {
        Self::new(name, NodeKind::Enum { entries }, size)
    }

    pub fn with_attribute<I, S>(mut self, name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.push(Attribute::new(name, args));
        self
    }

    /// Arguments of the first attribute called `name`.
    pub fn attribute_args(&self, name: &str) -> Option<&[String]> {
        self.attributes.iter().find(|a| a.name == name).map(|a| a.args.as_slice())
    }

    #[inline]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute_args(name).is_some()
    }
}
