//! Counter-examples for non-exhaustive matches.
//!
//! A [`Witness`] describes values no case matches. It is structural so the
//! frontend can inspect it, and [`ExhaustivenessCache::format_witness`] turns
//! it into pattern syntax for diagnostics:
//!
//! ```text
//! (false, _)        record with an unconstrained second field
//! Triangle()        a missing sealed subtype
//! [_, _, ...]       lists of two or more elements
//! {'a': Color.red}  a map with a given entry
//! ```

use std::collections::BTreeMap;

use crate::ops::ExhaustivenessHost;
use crate::static_type::{ListTypeIdentity, MapTypeIdentity, StaticTypeKind, TypeFamily};
use crate::{ExhaustivenessCache, Key, StaticTypeId};

/// A description of unmatched values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Witness {
    /// Any value of the type. Rendered `_`.
    Any(StaticTypeId),
    /// Values of `ty` whose listed fields are further described.
    ///
    /// Fields not listed are unconstrained. Keys are in ascending order.
    Value {
        ty: StaticTypeId,
        fields: Vec<(Key, Witness)>,
    },
}

impl Witness {
    /// A value of `ty` with no field constraints.
    pub fn of(ty: StaticTypeId) -> Self {
        Witness::Value {
            ty,
            fields: Vec::new(),
        }
    }

    pub fn ty(&self) -> StaticTypeId {
        match self {
            Witness::Any(ty) | Witness::Value { ty, .. } => *ty,
        }
    }

    #[inline]
    pub fn is_any(&self) -> bool {
        matches!(self, Witness::Any(_))
    }

    /// The witness for one field, if constrained.
    pub fn field(&self, key: &Key) -> Option<&Witness> {
        match self {
            Witness::Any(_) => None,
            Witness::Value { fields, .. } => fields
                .iter()
                .find_map(|(field_key, witness)| (field_key == key).then_some(witness)),
        }
    }
}

impl<H: ExhaustivenessHost> ExhaustivenessCache<'_, H> {
    /// Render a witness as pattern source text.
    pub fn format_witness(&self, witness: &Witness) -> String {
        let mut out = String::new();
        self.write_witness(witness, &mut out);
        out
    }

    fn write_witness(&self, witness: &Witness, out: &mut String) {
        let (ty, fields) = match witness {
            Witness::Any(_) => {
                out.push('_');
                return;
            }
            Witness::Value { ty, fields } => (*ty, fields.as_slice()),
        };
        match self.kind(ty) {
            StaticTypeKind::Null => out.push_str("null"),
            StaticTypeKind::Unknown => out.push('_'),
            StaticTypeKind::Value { text, .. } => out.push_str(text),
            StaticTypeKind::Typed {
                ty: record,
                family: TypeFamily::Record,
            } => self.write_record(record, fields, out),
            StaticTypeKind::ListShape { identity, .. } => self.write_list(identity, fields, out),
            StaticTypeKind::MapShape { identity, .. } => self.write_map(identity, fields, out),
            _ => self.write_object(ty, fields, out),
        }
    }

    fn write_field(&self, fields: &[(Key, Witness)], key: &Key, out: &mut String) {
        match fields.iter().find(|(field_key, _)| field_key == key) {
            Some((_, witness)) => self.write_witness(witness, out),
            None => out.push('_'),
        }
    }

    fn write_record(&self, record: &H::Type, fields: &[(Key, Witness)], out: &mut String) {
        let names: Vec<String> = self
            .host
            .field_types(record)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        let positional = names.iter().filter(|name| name.starts_with('$')).count();

        out.push('(');
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if !name.starts_with('$') {
                out.push_str(name);
                out.push_str(": ");
            }
            self.write_field(fields, &Key::Field(name.clone()), out);
        }
        if positional == 1 && names.len() == 1 {
            out.push(',');
        }
        out.push(')');
    }

    fn write_list(&self, identity: &ListTypeIdentity, fields: &[(Key, Witness)], out: &mut String) {
        let mut heads: BTreeMap<u32, &Witness> = BTreeMap::new();
        let mut tails: BTreeMap<u32, &Witness> = BTreeMap::new();
        for (key, witness) in fields {
            match key {
                Key::ListHead(index) => {
                    heads.insert(*index, witness);
                }
                Key::ListTail(index) => {
                    tails.insert(*index, witness);
                }
                _ => {}
            }
        }

        let mut elements: Vec<String> = Vec::new();
        let render = |witness: Option<&&Witness>| {
            witness.map_or_else(|| "_".to_string(), |witness| self.format_witness(witness))
        };
        if identity.has_rest {
            let tail_count = tails.keys().next_back().map_or(0, |last| last + 1);
            let head_count = heads
                .keys()
                .next_back()
                .map_or(0, |last| last + 1)
                .max(identity.size.saturating_sub(tail_count));
            elements.extend((0..head_count).map(|i| render(heads.get(&i))));
            elements.push("...".to_string());
            elements.extend((0..tail_count).rev().map(|i| render(tails.get(&i))));
        } else {
            // An exact shape can still carry tail keys from its own pattern.
            for i in 0..identity.size {
                let from_end = identity.size - 1 - i;
                let witness = heads.get(&i).or_else(|| tails.get(&from_end));
                elements.push(render(witness));
            }
        }

        out.push('[');
        out.push_str(&elements.join(", "));
        out.push(']');
    }

    fn write_map(&self, identity: &MapTypeIdentity, fields: &[(Key, Witness)], out: &mut String) {
        out.push('{');
        for (i, key) in identity.keys.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(key);
            out.push_str(": ");
            self.write_field(fields, &Key::MapKey(key.clone()), out);
        }
        if identity.has_rest {
            out.push_str(if identity.keys.is_empty() { "..." } else { ", ..." });
        }
        out.push('}');
    }

    fn write_object(&self, ty: StaticTypeId, fields: &[(Key, Witness)], out: &mut String) {
        out.push_str(self.name(ty));
        out.push('(');
        let mut first = true;
        for (key, witness) in fields {
            let Key::Field(name) = key else {
                continue;
            };
            if !first {
                out.push_str(", ");
            }
            first = false;
            out.push_str(name);
            out.push_str(": ");
            self.write_witness(witness, out);
        }
        out.push(')');
    }
}
