//! Binding Descriptor Classifier
//!
//! Turns a scanned [`Candidate`] into exactly one [`BindingDescriptor`].
//! Classification is pure: it reads the candidate's declared tags and its
//! construction source and either produces a descriptor or an
//! [`Error::Classification`] naming the type and the reason.
//!
//! ## Rules
//!
//! | Marker | Attributes | Requires |
//! |--------|------------|----------|
//! | `singleton` | `alias`, `expose_impl` | constructor |
//! | `map_entry` | `alias`, `key`, `key_type`, `enum_type` | constructor, non-empty key |
//! | `set_member` | `alias` | constructor |
//! | `provider` | `produces`, `scope` | constructor producing `produces` |
//! | `factory` | `produces`, `factory_type` | constructor building `factory_type` |
//! | `module` | `phase` | module |
//!
//! `named` (attribute `value`) and `eager` are modifiers and may accompany
//! a variant marker; `eager` only makes sense on `singleton`. Markers the
//! classifier does not know are foreign metadata and are ignored.

use keel_domain::constants::{
    ATTR_ALIAS, ATTR_ENUM_TYPE, ATTR_EXPOSE_IMPL, ATTR_FACTORY_TYPE, ATTR_KEY, ATTR_KEY_TYPE,
    ATTR_PHASE, ATTR_PRODUCES, ATTR_SCOPE, ATTR_VALUE, KEY_TYPE_ENUM, KEY_TYPE_STRING,
    MARKER_EAGER, MARKER_FACTORY, MARKER_MAP_ENTRY, MARKER_MODULE, MARKER_NAMED,
    MARKER_PROVIDER, MARKER_SET_MEMBER, MARKER_SINGLETON,
};
use keel_domain::error::{Error, Result};
use keel_domain::{
    AliasCast, AttributeValue, BindingDescriptor, BindingVariant, Candidate, CandidateSource,
    Construction, DeclaredTag, MapKey, ModulePhase, ProviderScope, Qualifier, TypeTag,
};
use tracing::debug;

/// Markers that select a binding strategy
pub const VARIANT_MARKERS: &[&str] = &[
    MARKER_SINGLETON,
    MARKER_MAP_ENTRY,
    MARKER_SET_MEMBER,
    MARKER_PROVIDER,
    MARKER_FACTORY,
    MARKER_MODULE,
];

/// Markers that adjust a binding without selecting one
pub const MODIFIER_MARKERS: &[&str] = &[MARKER_NAMED, MARKER_EAGER];

/// Attributes each known marker accepts
fn allowed_attributes(marker: &str) -> &'static [&'static str] {
    match marker {
        MARKER_SINGLETON => &[ATTR_ALIAS, ATTR_EXPOSE_IMPL],
        MARKER_MAP_ENTRY => &[ATTR_ALIAS, ATTR_KEY, ATTR_KEY_TYPE, ATTR_ENUM_TYPE],
        MARKER_SET_MEMBER => &[ATTR_ALIAS],
        MARKER_PROVIDER => &[ATTR_PRODUCES, ATTR_SCOPE],
        MARKER_FACTORY => &[ATTR_PRODUCES, ATTR_FACTORY_TYPE],
        MARKER_MODULE => &[ATTR_PHASE],
        MARKER_NAMED => &[ATTR_VALUE],
        _ => &[],
    }
}

/// Stateless classifier over scanned candidates
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingClassifier;

impl BindingClassifier {
    /// Create a classifier
    pub fn new() -> Self {
        Self
    }

    /// Classify one candidate
    pub fn classify(&self, candidate: &Candidate) -> Result<BindingDescriptor> {
        Classification::new(candidate).run()
    }

    /// Classify every candidate, stopping at the first failure
    pub fn classify_all<'a, I>(&self, candidates: I) -> Result<Vec<BindingDescriptor>>
    where
        I: IntoIterator<Item = &'a Candidate>,
    {
        candidates
            .into_iter()
            .map(|candidate| self.classify(candidate))
            .collect()
    }
}

/// Classify one candidate with a default classifier
pub fn classify(candidate: &Candidate) -> Result<BindingDescriptor> {
    BindingClassifier::new().classify(candidate)
}

/// Working state for a single classification
struct Classification<'a> {
    candidate: &'a Candidate,
}

impl<'a> Classification<'a> {
    fn new(candidate: &'a Candidate) -> Self {
        Self { candidate }
    }

    fn fail(&self, reason: impl Into<String>) -> Error {
        Error::classification(self.candidate.type_tag().to_string(), reason)
    }

    fn run(&self) -> Result<BindingDescriptor> {
        let variant_tag = self.variant_tag()?;
        let named = self.modifier(MARKER_NAMED)?;
        let eager = self.modifier(MARKER_EAGER)?;

        for tag in self.known_tags() {
            self.check_attributes(tag)?;
        }

        let marker = variant_tag.marker();
        if eager.is_some() && marker != MARKER_SINGLETON {
            return Err(self.fail(format!(
                "#{MARKER_EAGER} is only valid on #{MARKER_SINGLETON}, not #{marker}"
            )));
        }

        let qualifier = named.map(|tag| self.qualifier(tag)).transpose()?;
        let variant = match marker {
            MARKER_SINGLETON => self.singleton(variant_tag, eager.is_some())?,
            MARKER_MAP_ENTRY => self.map_entry(variant_tag)?,
            MARKER_SET_MEMBER => self.set_member(variant_tag)?,
            MARKER_PROVIDER => self.provider(variant_tag)?,
            MARKER_FACTORY => self.factory(variant_tag)?,
            _ => self.module(variant_tag)?,
        };

        let descriptor = BindingDescriptor {
            origin: self.candidate.type_tag(),
            qualifier,
            variant,
        };
        debug!(
            candidate = %self.candidate.type_tag(),
            kind = ?descriptor.kind(),
            "Classified candidate"
        );
        Ok(descriptor)
    }

    fn known_tags(&self) -> impl Iterator<Item = &'a DeclaredTag> + 'a {
        let candidate = self.candidate;
        candidate.tags().iter().filter(|tag| {
            VARIANT_MARKERS.contains(&tag.marker()) || MODIFIER_MARKERS.contains(&tag.marker())
        })
    }

    fn variant_tag(&self) -> Result<&'a DeclaredTag> {
        let mut found = self
            .candidate
            .tags()
            .iter()
            .filter(|tag| VARIANT_MARKERS.contains(&tag.marker()));
        let first = found.next().ok_or_else(|| {
            self.fail(format!(
                "no binding marker (expected one of {})",
                VARIANT_MARKERS.join(", ")
            ))
        })?;
        if let Some(second) = found.next() {
            return Err(self.fail(format!(
                "conflicting binding markers {first} and {second}"
            )));
        }
        Ok(first)
    }

    fn modifier(&self, marker: &str) -> Result<Option<&'a DeclaredTag>> {
        let mut found = self.candidate.tags().iter().filter(|tag| tag.marker() == marker);
        let first = found.next();
        if found.next().is_some() {
            return Err(self.fail(format!("#{marker} declared more than once")));
        }
        Ok(first)
    }

    fn check_attributes(&self, tag: &DeclaredTag) -> Result<()> {
        let allowed = allowed_attributes(tag.marker());
        match tag.attributes().keys().find(|name| !allowed.contains(&name.as_str())) {
            Some(unknown) => Err(self.fail(format!("unknown attribute '{unknown}' on {tag}"))),
            None => Ok(()),
        }
    }

    fn str_attr<'t>(&self, tag: &'t DeclaredTag, name: &str) -> Result<Option<&'t str>> {
        match tag.attribute(name) {
            None => Ok(None),
            Some(AttributeValue::Str(value)) => Ok(Some(value)),
            Some(other) => Err(self.wrong_kind(tag, name, "string", other)),
        }
    }

    fn bool_attr(&self, tag: &DeclaredTag, name: &str) -> Result<bool> {
        match tag.attribute(name) {
            None => Ok(false),
            Some(AttributeValue::Bool(value)) => Ok(*value),
            Some(other) => Err(self.wrong_kind(tag, name, "bool", other)),
        }
    }

    fn type_attr(&self, tag: &DeclaredTag, name: &str) -> Result<Option<TypeTag>> {
        match tag.attribute(name) {
            None => Ok(None),
            Some(AttributeValue::Type(value)) => Ok(Some(*value)),
            Some(other) => Err(self.wrong_kind(tag, name, "type", other)),
        }
    }

    fn wrong_kind(
        &self,
        tag: &DeclaredTag,
        name: &str,
        expected: &str,
        actual: &AttributeValue,
    ) -> Error {
        self.fail(format!(
            "attribute '{name}' on {tag} must be a {expected}, found {}",
            actual.kind()
        ))
    }

    fn qualifier(&self, tag: &DeclaredTag) -> Result<Qualifier> {
        match self.str_attr(tag, ATTR_VALUE)? {
            Some(value) if !value.trim().is_empty() => Ok(Qualifier::named(value)),
            _ => Err(self.fail(format!("{tag} requires a non-empty '{ATTR_VALUE}'"))),
        }
    }

    fn construction(&self, tag: &DeclaredTag) -> Result<Construction> {
        match self.candidate.source() {
            CandidateSource::Constructor {
                produces,
                constructor,
            } => Ok(Construction {
                produces: *produces,
                constructor: constructor.clone(),
            }),
            CandidateSource::Module(_) => {
                Err(self.fail(format!("{tag} cannot be declared on a module")))
            }
            CandidateSource::Missing => Err(self.fail(format!("{tag} requires a constructor"))),
        }
    }

    /// Resolve the `alias` attribute into a conversion from the constructed type
    ///
    /// An alias equal to the constructed type is no alias at all.
    fn alias(&self, tag: &DeclaredTag, construction: &Construction) -> Result<Option<AliasCast>> {
        let Some(alias) = self.type_attr(tag, ATTR_ALIAS)? else {
            return Ok(None);
        };
        if alias == construction.produces {
            return Ok(None);
        }
        match self.candidate.conversion_to(alias) {
            Some(cast) if cast.source() == construction.produces => Ok(Some(cast.clone())),
            _ => Err(self.fail(format!(
                "alias {alias} has no declared conversion from {}",
                construction.produces
            ))),
        }
    }

    fn produces(&self, tag: &DeclaredTag, construction: &Construction) -> Result<()> {
        match self.type_attr(tag, ATTR_PRODUCES)? {
            None => Err(self.fail(format!("{tag} requires '{ATTR_PRODUCES}'"))),
            Some(produced) if produced != construction.produces => Err(self.fail(format!(
                "{tag} declares it produces {produced} but its constructor builds {}",
                construction.produces
            ))),
            Some(_) => Ok(()),
        }
    }

    fn singleton(&self, tag: &DeclaredTag, eager: bool) -> Result<BindingVariant> {
        let construction = self.construction(tag)?;
        let expose_impl = self.bool_attr(tag, ATTR_EXPOSE_IMPL)?;
        if expose_impl && tag.attribute(ATTR_ALIAS).is_none() {
            return Err(self.fail(format!(
                "'{ATTR_EXPOSE_IMPL}' on {tag} requires '{ATTR_ALIAS}'"
            )));
        }
        let alias = self.alias(tag, &construction)?;
        Ok(BindingVariant::Singleton {
            construction,
            alias,
            expose_impl,
            eager,
        })
    }

    fn map_entry(&self, tag: &DeclaredTag) -> Result<BindingVariant> {
        let construction = self.construction(tag)?;
        let alias = self.alias(tag, &construction)?;
        let key = match self.str_attr(tag, ATTR_KEY)? {
            Some(key) if !key.is_empty() => key,
            _ => return Err(self.fail(format!("{tag} requires a non-empty '{ATTR_KEY}'"))),
        };
        let key = match self.str_attr(tag, ATTR_KEY_TYPE)?.unwrap_or(KEY_TYPE_STRING) {
            KEY_TYPE_STRING => {
                if tag.attribute(ATTR_ENUM_TYPE).is_some() {
                    return Err(self.fail(format!(
                        "'{ATTR_ENUM_TYPE}' on {tag} requires {ATTR_KEY_TYPE} = \"{KEY_TYPE_ENUM}\""
                    )));
                }
                MapKey::Str(key.to_string())
            }
            KEY_TYPE_ENUM => {
                let enum_type = match self.str_attr(tag, ATTR_ENUM_TYPE)? {
                    Some(name) if !name.is_empty() => name,
                    _ => {
                        return Err(self.fail(format!(
                            "enum-keyed {tag} requires '{ATTR_ENUM_TYPE}'"
                        )));
                    }
                };
                if !is_identifier(key) {
                    return Err(self.fail(format!(
                        "'{key}' is not a valid variant of enum {enum_type}"
                    )));
                }
                MapKey::Enum {
                    enum_type: enum_type.to_string(),
                    variant: key.to_string(),
                }
            }
            other => {
                return Err(self.fail(format!(
                    "{ATTR_KEY_TYPE} '{other}' on {tag} is neither \"{KEY_TYPE_STRING}\" \
                     nor \"{KEY_TYPE_ENUM}\""
                )));
            }
        };
        Ok(BindingVariant::MapEntry {
            construction,
            alias,
            key,
        })
    }

    fn set_member(&self, tag: &DeclaredTag) -> Result<BindingVariant> {
        let construction = self.construction(tag)?;
        let alias = self.alias(tag, &construction)?;
        Ok(BindingVariant::SetMember {
            construction,
            alias,
        })
    }

    fn provider(&self, tag: &DeclaredTag) -> Result<BindingVariant> {
        let construction = self.construction(tag)?;
        self.produces(tag, &construction)?;
        let scope = match self.str_attr(tag, ATTR_SCOPE)? {
            None => ProviderScope::default(),
            Some(scope) => scope
                .parse::<ProviderScope>()
                .map_err(|reason: String| self.fail(reason))?,
        };
        Ok(BindingVariant::Provider {
            construction,
            scope,
        })
    }

    fn factory(&self, tag: &DeclaredTag) -> Result<BindingVariant> {
        let construction = self.construction(tag)?;
        let Some(product) = self.type_attr(tag, ATTR_PRODUCES)? else {
            return Err(self.fail(format!("{tag} requires '{ATTR_PRODUCES}'")));
        };
        let Some(factory_type) = self.type_attr(tag, ATTR_FACTORY_TYPE)? else {
            return Err(self.fail(format!("{tag} requires '{ATTR_FACTORY_TYPE}'")));
        };
        if product == construction.produces {
            return Err(self.fail(format!(
                "{tag} constructor builds the product {product} itself; \
                 it must build the factory {factory_type}"
            )));
        }
        if factory_type != construction.produces {
            return Err(self.fail(format!(
                "{tag} expects a constructor building {factory_type}, found {}",
                construction.produces
            )));
        }
        Ok(BindingVariant::Factory {
            construction,
            product,
        })
    }

    fn module(&self, tag: &DeclaredTag) -> Result<BindingVariant> {
        let CandidateSource::Module(module) = self.candidate.source() else {
            return Err(self.fail(format!("{tag} requires a module")));
        };
        let phase = match self.str_attr(tag, ATTR_PHASE)? {
            None => ModulePhase::default(),
            Some(phase) => phase
                .parse::<ModulePhase>()
                .map_err(|reason: String| self.fail(reason))?,
        };
        Ok(BindingVariant::ModuleContribution {
            module: module.clone(),
            phase,
        })
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_alphanumeric() || ch == '_')
}
