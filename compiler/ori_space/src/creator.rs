//! Lowering patterns to spaces.
//!
//! [`SpaceCreator`] turns one [`Pattern`] into the [`Space`] of values it
//! matches. Every rule receives the static type of the matched position
//! (the context) and whether an enclosing `?` or `!` already excludes
//! `null` there.
//!
//! Patterns the engine cannot describe (relational patterns, guarded
//! cases, malformed list and map patterns) become the unknown space, which
//! never contributes coverage.

use std::collections::BTreeMap;

use crate::ops::ExhaustivenessHost;
use crate::pattern::{ConstantValue, HostPattern, ListElement, Pattern};
use crate::stack::ensure_sufficient_stack;
use crate::static_type::{ListTypeIdentity, MapTypeIdentity};
use crate::{ExhaustivenessCache, Key, Path, SingleSpace, Space, StaticTypeId};

/// Builds spaces for the patterns of one session.
pub struct SpaceCreator<'c, 'h, H: ExhaustivenessHost> {
    cache: &'c mut ExhaustivenessCache<'h, H>,
}

impl<'c, 'h, H: ExhaustivenessHost> SpaceCreator<'c, 'h, H> {
    pub fn new(cache: &'c mut ExhaustivenessCache<'h, H>) -> Self {
        SpaceCreator { cache }
    }

    /// The cache spaces are built in.
    pub fn cache(&mut self) -> &mut ExhaustivenessCache<'h, H> {
        self.cache
    }

    /// The space of one case clause.
    ///
    /// A guard can reject any subset of the values the pattern matches, so a
    /// guarded case yields the unknown space.
    #[tracing::instrument(level = "debug", skip_all, fields(context = ?context, has_guard))]
    pub fn create_root_space(
        &mut self,
        context: StaticTypeId,
        pattern: &HostPattern<H>,
        has_guard: bool,
    ) -> Space {
        if has_guard {
            return Space::unknown(Path::root());
        }
        self.dispatch_pattern(&Path::root(), context, pattern, false)
    }

    /// The space of `pattern` matched at `path` against a value of `context`.
    pub fn dispatch_pattern(
        &mut self,
        path: &Path,
        context: StaticTypeId,
        pattern: &HostPattern<H>,
        non_null: bool,
    ) -> Space {
        ensure_sufficient_stack(|| self.dispatch(path, context, pattern, non_null))
    }

    fn dispatch(
        &mut self,
        path: &Path,
        context: StaticTypeId,
        pattern: &HostPattern<H>,
        non_null: bool,
    ) -> Space {
        match pattern {
            Pattern::Variable { declared } => {
                let ty = match declared {
                    Some(declared) => self.narrow(context, declared),
                    None => context,
                };
                Space::single(path.clone(), self.strip_null(ty, non_null))
            }
            Pattern::Literal(constant) => self.create_constant_space(path, constant, non_null),
            Pattern::Object { ty, fields } => {
                let ty = self.narrow(context, ty);
                let ty = self.strip_null(ty, non_null);
                self.create_object_space(path, ty, fields)
            }
            Pattern::List {
                type_argument,
                elements,
            } => self.create_list_space(path, context, type_argument.as_ref(), elements),
            Pattern::Map {
                type_arguments,
                entries,
                has_rest,
            } => self.create_map_space(path, context, type_arguments.as_ref(), entries, *has_rest),
            Pattern::NullCheck(inner) => {
                let context = self.cache.underlying(context);
                self.dispatch_pattern(path, context, inner, true)
            }
            Pattern::NullAssert(inner) => {
                let context = self.cache.underlying(context);
                let space = self.dispatch_pattern(path, context, inner, true);
                // `!` throws on null instead of failing to match, so null
                // counts as handled.
                space.union(&Space::single(path.clone(), StaticTypeId::NULL))
            }
            Pattern::LogicalOr(left, right) => {
                let left = self.dispatch_pattern(path, context, left, non_null);
                let right = self.dispatch_pattern(path, context, right, non_null);
                left.union_with(&right, self.cache)
            }
            Pattern::LogicalAnd(left, right) => {
                let left = self.dispatch_pattern(path, context, left, non_null);
                let right = self.dispatch_pattern(path, context, right, non_null);
                left.intersect(&right, self.cache)
            }
            // The narrowing a cast performs is not modeled.
            Pattern::Cast { pattern, .. } => self.dispatch_pattern(path, context, pattern, non_null),
            Pattern::Relational => Space::unknown(path.clone()),
        }
    }

    /// The type a pattern declaring `declared` matches against `context`.
    ///
    /// Coverage cannot exceed the matched type, so a context that is already
    /// narrower wins.
    fn narrow(&mut self, context: StaticTypeId, declared: &H::Type) -> StaticTypeId {
        let declared = self.cache.create_static_type(declared);
        if self.cache.is_subtype_of(context, declared) {
            context
        } else {
            declared
        }
    }

    fn strip_null(&self, ty: StaticTypeId, non_null: bool) -> StaticTypeId {
        if non_null {
            self.cache.underlying(ty)
        } else {
            ty
        }
    }

    fn create_constant_space(
        &mut self,
        path: &Path,
        constant: &ConstantValue<H::Type, H::EnumElement>,
        non_null: bool,
    ) -> Space {
        let ty = match constant {
            ConstantValue::Null if non_null => return Space::empty(path.clone()),
            ConstantValue::Null => StaticTypeId::NULL,
            ConstantValue::Bool(value) => StaticTypeId::of_bool(*value),
            ConstantValue::Enum(element) => self.cache.create_enum_value_type(element),
            ConstantValue::Other { ty, identity, text } => {
                let base = self.cache.create_static_type(ty);
                self.cache.create_value_type(base, identity, text)
            }
        };
        Space::single(path.clone(), ty)
    }

    fn create_object_space(
        &mut self,
        path: &Path,
        ty: StaticTypeId,
        fields: &[(String, HostPattern<H>)],
    ) -> Space {
        let mut nested: BTreeMap<Key, Space> = BTreeMap::new();
        for (name, pattern) in fields {
            let key = Key::field(name.as_str());
            let field_ty = self.cache.get_field(ty, &key);
            let space = self.dispatch_pattern(&path.add(key.clone()), field_ty, pattern, false);
            self.add_field(&mut nested, key, field_ty, space);
        }
        Space::from_single(path.clone(), SingleSpace::with_fields(ty, nested))
    }

    /// Record a nested space, skipping ones that constrain nothing and
    /// intersecting repeated keys.
    fn add_field(
        &mut self,
        nested: &mut BTreeMap<Key, Space>,
        key: Key,
        field_ty: StaticTypeId,
        space: Space,
    ) {
        if space.is_unconstrained_for(field_ty, self.cache) {
            return;
        }
        let space = match nested.remove(&key) {
            Some(existing) => existing.intersect(&space, self.cache),
            None => space,
        };
        nested.insert(key, space);
    }

    fn create_list_space(
        &mut self,
        path: &Path,
        context: StaticTypeId,
        type_argument: Option<&H::Type>,
        elements: &[ListElement<H::Type, H::EnumElement>],
    ) -> Space {
        let rests = elements
            .iter()
            .filter(|element| matches!(element, ListElement::Rest(_)))
            .count();
        if rests > 1 {
            tracing::debug!(%path, rests, "list pattern with several rest elements");
            return Space::unknown(path.clone());
        }

        let host = self.cache.host();
        let (base, element) = match type_argument {
            Some(argument) => {
                let base = self.cache.create_static_type(&host.list_type(argument));
                (base, self.cache.create_static_type(argument))
            }
            None => {
                if let Some(parts) = self.cache.list_parts(context) {
                    parts
                } else {
                    let object = host.nullable_object_type();
                    let base = self.cache.create_static_type(&host.list_type(&object));
                    (base, StaticTypeId::NULLABLE_OBJECT)
                }
            }
        };

        let has_rest = rests == 1;
        let size = u32::try_from(elements.len() - rests).unwrap_or(u32::MAX);
        let shape = self.cache.create_list_type(
            base,
            ListTypeIdentity {
                element,
                type_argument_text: type_argument.map(|argument| host.type_to_string(argument)),
                size,
                has_rest,
            },
        );

        let rest_at = elements
            .iter()
            .position(|element| matches!(element, ListElement::Rest(_)));
        let head_count = u32::try_from(rest_at.unwrap_or(elements.len())).unwrap_or(u32::MAX);
        let tail_count = size.saturating_sub(head_count);

        let mut nested: BTreeMap<Key, Space> = BTreeMap::new();
        let mut head = 0;
        let mut tail = tail_count;
        for list_element in elements {
            let (key, pattern) = match list_element {
                ListElement::Pattern(pattern) if head < head_count => {
                    head += 1;
                    (Key::ListHead(head - 1), pattern)
                }
                ListElement::Pattern(pattern) => {
                    tail = tail.saturating_sub(1);
                    (Key::ListTail(tail), pattern)
                }
                ListElement::Rest(None) => continue,
                ListElement::Rest(Some(pattern)) => (
                    Key::ListRest {
                        head: head_count,
                        tail: tail_count,
                    },
                    pattern.as_ref(),
                ),
            };
            let field_ty = self.cache.get_field(shape, &key);
            let space = self.dispatch_pattern(&path.add(key.clone()), field_ty, pattern, false);
            self.add_field(&mut nested, key, field_ty, space);
        }
        Space::from_single(path.clone(), SingleSpace::with_fields(shape, nested))
    }

    fn create_map_space(
        &mut self,
        path: &Path,
        context: StaticTypeId,
        type_arguments: Option<&(H::Type, H::Type)>,
        entries: &[(String, HostPattern<H>)],
        has_rest: bool,
    ) -> Space {
        let mut keys: Vec<String> = entries.iter().map(|(key, _)| key.clone()).collect();
        keys.sort();
        if keys.windows(2).any(|pair| pair[0] == pair[1]) {
            tracing::debug!(%path, "map pattern with a repeated key");
            return Space::unknown(path.clone());
        }

        let host = self.cache.host();
        let (base, key_ty, value_ty) = match type_arguments {
            Some((key, value)) => (
                self.cache.create_static_type(&host.map_type(key, value)),
                self.cache.create_static_type(key),
                self.cache.create_static_type(value),
            ),
            None => {
                if let Some(parts) = self.cache.map_parts(context) {
                    parts
                } else {
                    let object = host.nullable_object_type();
                    let base = self.cache.create_static_type(&host.map_type(&object, &object));
                    (base, StaticTypeId::NULLABLE_OBJECT, StaticTypeId::NULLABLE_OBJECT)
                }
            }
        };

        let shape = self.cache.create_map_type(
            base,
            MapTypeIdentity {
                key: key_ty,
                value: value_ty,
                type_argument_text: type_arguments.map(|(key, value)| {
                    format!("<{}, {}>", host.type_to_string(key), host.type_to_string(value))
                }),
                keys,
                has_rest,
            },
        );

        let mut nested: BTreeMap<Key, Space> = BTreeMap::new();
        for (key_text, pattern) in entries {
            let key = Key::MapKey(key_text.clone());
            let space = self.dispatch_pattern(&path.add(key.clone()), value_ty, pattern, false);
            self.add_field(&mut nested, key, value_ty, space);
        }
        Space::from_single(path.clone(), SingleSpace::with_fields(shape, nested))
    }
}
