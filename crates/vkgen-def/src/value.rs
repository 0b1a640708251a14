//! Enumerant and flag-bit value definitions.
//!
//! Both kinds can be built from an `<enum>` node, either inside an
//! `<enums>` block (the type's own values) or inside a `<require>` block
//! with an `extends` attribute (a value added by a later feature level).

use vkgen_spec::Node;

use crate::definition::{IncludeSet, TypeRef, TypeRegistry, ValueDefinition, ValueRegistry};
use crate::error::{DefError, Result};

/// First value reserved for extension enumerants.
pub const EXTENSION_BASE: i64 = 1_000_000_000;

/// Number of enumerant values reserved per extension.
pub const EXTENSION_BLOCK_SIZE: i64 = 1000;

/// Highest valid bit position for a flag bit.
pub const MAX_BITPOS: u32 = 63;

/// How an enumerant's value is spelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumLiteral {
    /// A plain integer.
    Number(i64),
    /// A C expression the emitter copies verbatim, e.g. `(~0U)`.
    Expression(String),
    /// Same value as another enumerant.
    Alias(String),
}

/// An enumerant belonging to an enum type (or a constant of a static block).
#[derive(Debug, Clone)]
pub struct EnumValue {
    name: String,
    type_name: String,
    resolved_type: Option<TypeRef>,
    core: bool,
    literal: EnumLiteral,
}

impl EnumValue {
    /// Create a non-core enumerant with value zero.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            resolved_type: None,
            core: false,
            literal: EnumLiteral::Number(0),
        }
    }

    /// Set a numeric value.
    pub fn with_number(mut self, value: i64) -> Self {
        self.literal = EnumLiteral::Number(value);
        self
    }

    /// Make this an alias of another enumerant.
    pub fn with_alias(mut self, target: impl Into<String>) -> Self {
        self.literal = EnumLiteral::Alias(target.into());
        self
    }

    /// Attach the owning type's definition.
    pub fn with_type(mut self, ty: TypeRef) -> Self {
        self.resolved_type = Some(ty);
        self
    }

    /// Set the core flag.
    pub fn with_core(mut self, core: bool) -> Self {
        self.core = core;
        self
    }

    /// How the value is spelled.
    pub fn literal(&self) -> &EnumLiteral {
        &self.literal
    }

    /// Build an enumerant from an `<enum>` node.
    ///
    /// The owning type comes from `extends`, or from the enclosing
    /// `<enums name=..>` block. `extended` is that type's definition if the
    /// caller has one. The result is not core; callers loading a type's own
    /// values set the flag.
    pub fn from_spec_node(extended: Option<TypeRef>, node: Node<'_>) -> Result<Self> {
        let name = required_attr(node, "name")?;
        let type_name = owning_type_name(node)?;

        let literal = if let Some(alias) = node.attr("alias") {
            EnumLiteral::Alias(alias.to_string())
        } else if let Some(offset) = node.attr("offset") {
            EnumLiteral::Number(extension_value(node, name, offset)?)
        } else if let Some(value) = node.attr("value") {
            match parse_integer(value) {
                Some(n) => EnumLiteral::Number(n),
                None => EnumLiteral::Expression(value.to_string()),
            }
        } else {
            return Err(DefError::MissingAttribute {
                element: node.tag().to_string(),
                attribute: "value".to_string(),
            });
        };

        Ok(Self {
            name: name.to_string(),
            type_name,
            resolved_type: extended,
            core: false,
            literal,
        })
    }
}

impl ValueDefinition for EnumValue {
    fn registry_name(&self) -> &str {
        &self.name
    }

    fn underlying_type_name(&self) -> &str {
        &self.type_name
    }

    fn resolved_type(&self) -> Option<&TypeRef> {
        self.resolved_type.as_ref()
    }

    fn is_core(&self) -> bool {
        self.core
    }

    fn resolve(&self, types: &TypeRegistry, values: &ValueRegistry) -> IncludeSet {
        let mut set = IncludeSet::new();
        set.include_type(&self.type_name, types);
        if let EnumLiteral::Alias(target) = &self.literal {
            set.include_value(target, values);
        }
        set
    }
}

/// A single flag bit of a bitmask type.
#[derive(Debug, Clone)]
pub struct BitmaskValue {
    name: String,
    type_name: String,
    resolved_type: Option<TypeRef>,
    core: bool,
    bitpos: u32,
}

impl BitmaskValue {
    /// Create a non-core flag bit.
    ///
    /// Returns `None` if `bitpos` exceeds [`MAX_BITPOS`].
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, bitpos: u32) -> Option<Self> {
        (bitpos <= MAX_BITPOS).then(|| Self {
            name: name.into(),
            type_name: type_name.into(),
            resolved_type: None,
            core: false,
            bitpos,
        })
    }

    /// Attach the owning type's definition.
    pub fn with_type(mut self, ty: TypeRef) -> Self {
        self.resolved_type = Some(ty);
        self
    }

    /// Set the core flag.
    pub fn with_core(mut self, core: bool) -> Self {
        self.core = core;
        self
    }

    /// Bit position.
    pub fn bitpos(&self) -> u32 {
        self.bitpos
    }

    /// The flag's numeric value, `1 << bitpos`.
    pub fn value(&self) -> u64 {
        1u64 << self.bitpos
    }

    /// Build a flag bit from an `<enum>` node carrying `bitpos`.
    pub fn from_spec_node(extended: Option<TypeRef>, node: Node<'_>) -> Result<Self> {
        let name = required_attr(node, "name")?;
        let type_name = owning_type_name(node)?;
        let raw = required_attr(node, "bitpos")?;

        let bitpos = raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|b| *b <= MAX_BITPOS)
            .ok_or_else(|| DefError::InvalidAttribute {
                name: name.to_string(),
                attribute: "bitpos".to_string(),
                value: raw.to_string(),
                detail: format!("expected an integer in 0..={MAX_BITPOS}"),
            })?;

        Ok(Self {
            name: name.to_string(),
            type_name,
            resolved_type: extended,
            core: false,
            bitpos,
        })
    }
}

impl ValueDefinition for BitmaskValue {
    fn registry_name(&self) -> &str {
        &self.name
    }

    fn underlying_type_name(&self) -> &str {
        &self.type_name
    }

    fn resolved_type(&self) -> Option<&TypeRef> {
        self.resolved_type.as_ref()
    }

    fn is_core(&self) -> bool {
        self.core
    }

    fn resolve(&self, types: &TypeRegistry, _values: &ValueRegistry) -> IncludeSet {
        let mut set = IncludeSet::new();
        set.include_type(&self.type_name, types);
        set
    }
}

fn required_attr<'a>(node: Node<'a>, attribute: &str) -> Result<&'a str> {
    node.attr(attribute).ok_or_else(|| DefError::MissingAttribute {
        element: node.tag().to_string(),
        attribute: attribute.to_string(),
    })
}

fn owning_type_name(node: Node<'_>) -> Result<String> {
    if let Some(extends) = node.attr("extends") {
        return Ok(extends.to_string());
    }
    node.ancestor("enums")
        .and_then(|block| block.attr("name"))
        .map(str::to_string)
        .ok_or_else(|| DefError::MissingAttribute {
            element: node.tag().to_string(),
            attribute: "extends".to_string(),
        })
}

/// `EXTENSION_BASE + (extnumber - 1) * EXTENSION_BLOCK_SIZE + offset`,
/// negated when `dir="-"`.
fn extension_value(node: Node<'_>, name: &str, offset: &str) -> Result<i64> {
    let invalid = |attribute: &str, value: &str, detail: &str| DefError::InvalidAttribute {
        name: name.to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
        detail: detail.to_string(),
    };

    let offset_value = parse_integer(offset)
        .filter(|o| *o >= 0)
        .ok_or_else(|| invalid("offset", offset, "expected a non-negative integer"))?;

    let extnumber = node
        .attr("extnumber")
        .or_else(|| node.ancestor("extension").and_then(|ext| ext.attr("number")))
        .ok_or_else(|| DefError::MissingAttribute {
            element: node.tag().to_string(),
            attribute: "extnumber".to_string(),
        })?;
    let extnumber_value = parse_integer(extnumber)
        .filter(|n| *n >= 1)
        .ok_or_else(|| invalid("extnumber", extnumber, "expected a positive integer"))?;

    let value = (extnumber_value - 1)
        .checked_mul(EXTENSION_BLOCK_SIZE)
        .and_then(|v| v.checked_add(EXTENSION_BASE))
        .and_then(|v| v.checked_add(offset_value))
        .ok_or_else(|| invalid("offset", offset, "extension value out of range"))?;
    Ok(if node.attr("dir") == Some("-") {
        -value
    } else {
        value
    })
}

/// Parse a decimal or `0x`-prefixed hexadecimal integer, optionally negative.
fn parse_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };
    Some(if negative { -magnitude } else { magnitude })
}
