use indexmap::IndexSet;

/// A resolved type reference.
#[derive(Debug, Clone, PartialEq)]
pub enum IrType {
    String,
    StringLiteral(String),
    Number,
    Integer,
    Boolean,
    Null,
    Array(Box<IrType>),
    Object(Vec<(String, IrType, bool)>), // inline object: (name, type, required)
    Map(Box<IrType>),                    // string-keyed map of T
    Ref(String),                         // reference to a named schema (PascalCase)
    Union(Vec<IrType>),
    Intersection(Vec<IrType>),
    Any,
    Void,
    DateTime,
    Binary,
}

impl IrType {
    /// Named schemas this type references, distinct, in first-seen order.
    pub fn dependencies(&self) -> Vec<String> {
        let mut names = IndexSet::new();
        self.collect_refs(&mut names);
        names.into_iter().collect()
    }

    fn collect_refs(&self, names: &mut IndexSet<String>) {
        match self {
            IrType::Ref(name) => {
                names.insert(name.clone());
            }
            IrType::Array(inner) | IrType::Map(inner) => inner.collect_refs(names),
            IrType::Object(fields) => {
                for (_, field_type, _) in fields {
                    field_type.collect_refs(names);
                }
            }
            IrType::Union(variants) | IrType::Intersection(variants) => {
                for variant in variants {
                    variant.collect_refs(names);
                }
            }
            _ => {}
        }
    }

    /// Short label used by summaries, e.g. `Pet[]` or `string`.
    pub fn label(&self) -> String {
        match self {
            IrType::String => "string".to_string(),
            IrType::StringLiteral(s) => format!("{s:?}"),
            IrType::Number => "number".to_string(),
            IrType::Integer => "integer".to_string(),
            IrType::Boolean => "boolean".to_string(),
            IrType::Null => "null".to_string(),
            IrType::Array(inner) => format!("{}[]", inner.label()),
            IrType::Object(_) => "object".to_string(),
            IrType::Map(inner) => format!("map<{}>", inner.label()),
            IrType::Ref(name) => name.clone(),
            IrType::Union(variants) => join_labels(variants, " | "),
            IrType::Intersection(parts) => join_labels(parts, " & "),
            IrType::Any => "any".to_string(),
            IrType::Void => "void".to_string(),
            IrType::DateTime => "datetime".to_string(),
            IrType::Binary => "binary".to_string(),
        }
    }
}

fn join_labels(types: &[IrType], sep: &str) -> String {
    types.iter().map(IrType::label).collect::<Vec<_>>().join(sep)
}
