use proguard::{ProguardMapper, ProguardMapping, ProguardRecord};
use self_cell::self_cell;
use serde::Serialize;
use std::sync::Arc;

/// Original holder class and method name of an obfuscated method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodName {
    pub class: String,
    pub method: String,
}

/// Narrow view of a mapping-resolution engine scoped to one mapping document.
pub trait MappingResolver: Send + Sync {
    /// Rewrites raw stack-trace lines. One input frame may become several
    /// output frames when the original call was inlined.
    fn resolve_lines(&self, lines: &[String]) -> Vec<String>;

    fn resolve_class(&self, obfuscated: &str) -> Option<String>;

    fn resolve_method(&self, class: &str, method: &str) -> Option<MethodName>;

    fn resolve_field(&self, class: &str, field: &str) -> Option<String>;
}

/// Creates resolvers over a given mapping document.
pub trait ResolverFactory: Send + Sync {
    fn scoped(&self, document: Arc<str>) -> Box<dyn MappingResolver>;
}

self_cell!(
    /// Mapping text together with the mapper that borrows from it.
    struct MappingCell {
        owner: Arc<str>,

        #[not_covariant]
        dependent: ProguardMapper,
    }
);

/// Resolver backed by the `proguard` crate.
pub struct ProguardResolver {
    cell: MappingCell,
}

impl ProguardResolver {
    pub fn new(source: Arc<str>) -> Self {
        let cell = MappingCell::new(source, |text| ProguardMapper::from(&**text));
        Self { cell }
    }

    pub fn source_len(&self) -> usize {
        self.cell.borrow_owner().len()
    }
}

impl MappingResolver for ProguardResolver {
    fn resolve_lines(&self, lines: &[String]) -> Vec<String> {
        if lines.is_empty() {
            return Vec::new();
        }
        let input = lines.join("\n");
        self.cell.with_dependent(|_, mapper| match mapper.remap_stacktrace(&input) {
            Ok(output) => output.lines().map(str::to_string).collect(),
            Err(_) => lines.to_vec(),
        })
    }

    fn resolve_class(&self, obfuscated: &str) -> Option<String> {
        self.cell
            .with_dependent(|_, mapper| mapper.remap_class(obfuscated).map(str::to_string))
    }

    fn resolve_method(&self, class: &str, method: &str) -> Option<MethodName> {
        self.cell.with_dependent(|_, mapper| {
            mapper
                .remap_method(class, method)
                .map(|(class, method)| MethodName {
                    class: class.to_string(),
                    method: method.to_string(),
                })
        })
    }

    fn resolve_field(&self, class: &str, field: &str) -> Option<String> {
        let mapping = ProguardMapping::new(self.cell.borrow_owner().as_bytes());
        let mut in_class = false;
        for record in mapping.iter().flatten() {
            match record {
                ProguardRecord::Class { obfuscated, .. } => {
                    in_class = obfuscated == class;
                }
                ProguardRecord::Field {
                    original,
                    obfuscated,
                    ..
                } if in_class && obfuscated == field => {
                    return Some(original.to_string());
                }
                _ => {}
            }
        }
        None
    }
}

/// Default factory producing [`ProguardResolver`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProguardResolverFactory;

impl ResolverFactory for ProguardResolverFactory {
    fn scoped(&self, document: Arc<str>) -> Box<dyn MappingResolver> {
        Box::new(ProguardResolver::new(document))
    }
}

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Splits `a.b.C[][]` into `("a.b.C", "[][]")`.
pub(crate) fn split_array_suffix(ty: &str) -> (&str, &str) {
    let mut base = ty.trim();
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped;
    }
    let trimmed = ty.trim();
    (base, &trimmed[base.len()..])
}

/// Remaps a Java type name, keeping primitives and array dimensions.
pub(crate) fn remap_type(resolver: &dyn MappingResolver, ty: &str) -> String {
    let (base, suffix) = split_array_suffix(ty);
    if PRIMITIVES.contains(&base) {
        return ty.trim().to_string();
    }
    match resolver.resolve_class(base) {
        Some(original) => format!("{}{}", original, suffix),
        None => ty.trim().to_string(),
    }
}
